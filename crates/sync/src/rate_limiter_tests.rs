// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::at;
use chrono::Duration as Span;

fn hourly() -> RateLimiter {
    RateLimiter::new(10, Duration::from_secs(3600))
}

#[test]
fn fifteen_triggers_admit_ten() {
    let limiter = hourly();
    let start = at(9, 0);

    let admitted = (0..15)
        .filter(|i| limiter.try_acquire(start + Span::minutes(*i)))
        .count();

    assert_eq!(admitted, 10);
    assert_eq!(limiter.remaining(start + Span::minutes(14)), 0);
}

#[test]
fn window_slides() {
    let limiter = hourly();
    let start = at(9, 0);
    for i in 0..10 {
        limiter.mark_run(start + Span::minutes(i));
    }
    assert!(!limiter.can_run_now(start + Span::minutes(30)));

    // The first run ages out exactly one hour later.
    assert!(limiter.can_run_now(start + Span::minutes(60)));
    assert_eq!(limiter.remaining(start + Span::minutes(60)), 1);
    assert_eq!(limiter.remaining(start + Span::minutes(75)), 10);
}

#[test]
fn can_run_now_does_not_record() {
    let limiter = RateLimiter::new(1, Duration::from_secs(60));
    let now = at(9, 0);

    assert!(limiter.can_run_now(now));
    assert!(limiter.can_run_now(now));
    limiter.mark_run(now);
    assert!(!limiter.can_run_now(now));
}

#[test]
fn concurrent_acquires_never_exceed_limit() {
    let limiter = std::sync::Arc::new(hourly());
    let now = at(12, 0);

    let handles: Vec<_> = (0..40)
        .map(|_| {
            let limiter = std::sync::Arc::clone(&limiter);
            std::thread::spawn(move || limiter.try_acquire(now))
        })
        .collect();
    let admitted = handles
        .into_iter()
        .map(|h| h.join().unwrap_or(false))
        .filter(|ok| *ok)
        .count();

    assert_eq!(admitted, 10);
}
