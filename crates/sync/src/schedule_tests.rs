// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::config::SyncConfig;
use crate::engine::{EngineDeps, SyncEngine};
use crate::health::HealthStore;
use crate::orchestrator::Orchestrator;
use crate::test_helpers::{at, ok, signer, MockHealth, MockHttp, ShiftingZone};
use chrono::FixedOffset;
use tempfile::TempDir;
use vital_core::{ManualClock, Session};
use yare::parameterized;

fn offset(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * 3600).unwrap()
}

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

#[parameterized(
    afternoon_utc = { 0, utc(2026, 6, 10, 15, 0, 0), utc(2026, 6, 11, 0, 0, 5) },
    just_after_midnight = { 0, utc(2026, 6, 10, 0, 0, 1), utc(2026, 6, 10, 0, 0, 5) },
    exactly_at_fire_time = { 0, utc(2026, 6, 10, 0, 0, 5), utc(2026, 6, 11, 0, 0, 5) },
    east_of_utc = { 2, utc(2026, 6, 10, 15, 0, 0), utc(2026, 6, 10, 22, 0, 5) },
    west_of_utc = { -5, utc(2026, 6, 10, 3, 0, 0), utc(2026, 6, 10, 5, 0, 5) },
    west_after_local_midnight = { -5, utc(2026, 6, 10, 6, 0, 0), utc(2026, 6, 11, 5, 0, 5) },
    year_end = { 0, utc(2026, 12, 31, 23, 59, 0), utc(2027, 1, 1, 0, 0, 5) },
)]
fn next_midnight_cases(hours: i32, now: DateTime<Utc>, expected: DateTime<Utc>) {
    assert_eq!(next_midnight(now, &offset(hours)), expected);
}

#[test]
fn midnight_tracks_daylight_saving() {
    let zone = ShiftingZone::spring_2026();

    // Before the switch local midnight is 23:00 UTC.
    let first = next_midnight(utc(2026, 3, 28, 12, 0, 0), &zone);
    assert_eq!(first, utc(2026, 3, 28, 23, 0, 5));

    // After it, an hour earlier. A start-up offset would still say 23:00.
    let second = next_midnight(utc(2026, 3, 29, 12, 0, 0), &zone);
    assert_eq!(second, utc(2026, 3, 29, 22, 0, 5));
    assert_ne!(second, next_midnight(utc(2026, 3, 29, 12, 0, 0), &offset(1)));
}

#[test]
fn system_zone_midnight_is_within_a_day() {
    let now = Utc::now();
    let midnight = next_midnight_in(LocalZone::System, now);
    assert!(midnight > now);
    assert!(midnight - now <= chrono::Duration::hours(25) + chrono::Duration::seconds(5));
    assert_eq!(next_midnight_in(LocalZone::utc(), now), next_midnight(now, &Utc));
}

async fn handle_with(config: SyncConfig) -> (TempDir, OrchestratorHandle) {
    let dir = TempDir::new().unwrap();
    let http = MockHttp::new(|_| ok());
    let engine = SyncEngine::open(
        config,
        dir.path(),
        EngineDeps {
            http: Arc::new(http),
            health: Arc::new(MockHealth::new()) as Arc<dyn HealthStore>,
            signer: signer(),
            clock: Arc::new(ManualClock::new(at(15, 0))),
        },
    )
    .await
    .unwrap();
    engine
        .sessions()
        .login(Session::new("access-1", "refresh-1", "user-1"))
        .await
        .unwrap();
    let (handle, _task) = Orchestrator::spawn(Arc::new(engine), CancellationToken::new());
    (dir, handle)
}

async fn wait_for_trigger(handle: &OrchestratorHandle, trigger: Trigger) {
    for _ in 0..2000 {
        if handle.last_report().is_some_and(|r| r.trigger == trigger) {
            return;
        }
        tokio::time::sleep(Duration::from_secs(60)).await;
    }
    panic!("no {trigger} cycle ran");
}

#[tokio::test(start_paused = true)]
async fn periodic_interval_triggers_cycles() {
    let config = SyncConfig {
        base_url: "https://api.test".into(),
        sync_interval: Some(Duration::from_secs(30 * 60)),
        ..SyncConfig::default()
    };
    let (_dir, handle) = handle_with(config).await;
    let cancel = CancellationToken::new();
    let task = Scheduler::new(handle.clone(), cancel.clone()).spawn();

    let started = Instant::now();
    wait_for_trigger(&handle, Trigger::Periodic).await;
    assert!(started.elapsed() >= Duration::from_secs(30 * 60));

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn midnight_triggers_cycle() {
    let config = SyncConfig {
        base_url: "https://api.test".into(),
        sync_interval: None,
        ..SyncConfig::default()
    };
    let (_dir, handle) = handle_with(config).await;
    let cancel = CancellationToken::new();
    let task = Scheduler::new(handle.clone(), cancel.clone()).spawn();

    // Clock reads 15:00 UTC, so midnight is 9 hours and 5 seconds away.
    let started = Instant::now();
    wait_for_trigger(&handle, Trigger::Midnight).await;
    assert!(started.elapsed() >= Duration::from_secs(9 * 3600 + 5));

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn scheduler_stops_when_orchestrator_is_gone() {
    let config = SyncConfig {
        base_url: "https://api.test".into(),
        sync_interval: Some(Duration::from_millis(10)),
        ..SyncConfig::default()
    };
    let (_dir, handle) = handle_with(config).await;
    handle.shutdown().await;

    let task = Scheduler::new(handle, CancellationToken::new()).spawn();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
}
