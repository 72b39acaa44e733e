// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;

#[test]
fn manual_clock_is_frozen_until_moved() {
    let start = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
    let clock = ManualClock::new(start);
    assert_eq!(clock.now(), start);
    assert_eq!(clock.now(), start);

    clock.advance(Duration::minutes(90));
    assert_eq!(clock.now(), start + Duration::minutes(90));

    clock.set(start);
    assert_eq!(clock.now(), start);
}

#[test]
fn clock_source_through_arc_and_ref() {
    let start = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let by_ref = &*clock;
    assert_eq!(ClockSource::now(&clock), start);
    assert_eq!(ClockSource::now(&by_ref), start);
}

#[test]
fn system_clock_moves_forward() {
    let a = SystemClock.now();
    let b = SystemClock.now();
    assert!(b >= a);
}
