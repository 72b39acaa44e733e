// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn refresh_replaces_access_token_only() {
    let session = Session::new("access-1", "refresh-1", "user-7");
    let next = session.refreshed("access-2", None);

    assert_eq!(next.access_token(), "access-2");
    assert_eq!(next.refresh_token(), "refresh-1");
    assert_eq!(next.user_id(), "user-7");
    // The original snapshot is untouched.
    assert_eq!(session.access_token(), "access-1");
}

#[test]
fn refresh_adopts_rotated_refresh_token() {
    let session = Session::new("access-1", "refresh-1", "user-7");
    let next = session.refreshed("access-2", Some("refresh-2".into()));
    assert_eq!(next.refresh_token(), "refresh-2");
}

#[test]
fn debug_redacts_tokens() {
    let session = Session::new("secret-access", "secret-refresh", "user-7");
    let text = format!("{session:?}");
    assert!(!text.contains("secret-access"));
    assert!(!text.contains("secret-refresh"));
    assert!(text.contains("user-7"));
}

#[test]
fn session_json_roundtrip() {
    let session = Session::new("a", "r", "u");
    let json = serde_json::to_string(&session).unwrap();
    let back: Session = serde_json::from_str(&json).unwrap();
    assert_eq!(back, session);
}
