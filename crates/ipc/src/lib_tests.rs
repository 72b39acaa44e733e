// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use tokio::io::AsyncWriteExt;
use vital_sync::DrainStatus;
use yare::parameterized;

fn meal_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 10, 12, 30, 0).unwrap()
}

#[parameterized(
    ping = { Request::Ping },
    status = { Request::Status },
    sync = { Request::Sync },
    meal = { Request::Meal { at: meal_time() } },
    login = {
        Request::Login {
            access_token: "a".into(),
            refresh_token: "r".into(),
            user_id: "u".into(),
        }
    },
    shutdown = { Request::Shutdown },
)]
fn requests_survive_framing(request: Request) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    runtime.block_on(async {
        let (mut a, mut b) = tokio::io::duplex(4096);
        framing::write_message(&mut a, &request).await.unwrap();
        let back: Request = framing::read_message(&mut b).await.unwrap();
        assert_eq!(back, request);
    });
}

#[tokio::test]
async fn responses_survive_framing() {
    let response = Response::Drain {
        report: DrainReport {
            status: DrainStatus::Halted,
            delivered: 1,
            dead_lettered: 0,
            remaining: 2,
        },
    };
    let (mut a, mut b) = tokio::io::duplex(4096);
    framing::write_message(&mut a, &response).await.unwrap();
    let back: Response = framing::read_message(&mut b).await.unwrap();
    assert_eq!(back, response);
}

#[test]
fn request_wire_format_is_tagged() {
    let json = serde_json::to_value(Request::Meal { at: meal_time() }).unwrap();
    assert_eq!(json["type"], "Meal");
    assert_eq!(json["at"], "2026-06-10T12:30:00Z");
}

#[test]
fn request_debug_hides_tokens() {
    let request = Request::Login {
        access_token: "secret-access".into(),
        refresh_token: "secret-refresh".into(),
        user_id: "user-9".into(),
    };
    let text = format!("{request:?}");
    assert!(!text.contains("secret"));
    assert!(text.contains("user-9"));
}

#[test]
fn request_names() {
    assert_eq!(Request::Drain.name(), "drain");
    assert_eq!(Request::Meal { at: meal_time() }.name(), "meal");
}

#[tokio::test]
async fn oversized_frame_is_rejected() {
    let (mut a, mut b) = tokio::io::duplex(64);
    let len = u32::try_from(framing::MAX_MESSAGE_SIZE + 1).unwrap();
    a.write_all(&len.to_be_bytes()).await.unwrap();

    let err = framing::read_message::<_, Request>(&mut b).await.unwrap_err();
    assert!(err.to_string().contains("message too large"));
}

#[tokio::test]
async fn garbage_frame_is_an_error() {
    let (mut a, mut b) = tokio::io::duplex(64);
    a.write_all(&4u32.to_be_bytes()).await.unwrap();
    a.write_all(b"nope").await.unwrap();

    let err = framing::read_message::<_, Request>(&mut b).await.unwrap_err();
    assert!(err.to_string().contains("deserialize error"));
}
