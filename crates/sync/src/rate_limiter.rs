// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sliding-window limit on sync cycles.
//!
//! All trigger sources share one limiter. A cycle is admitted when fewer
//! than `max` cycles started within the trailing window.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};

#[derive(Debug)]
pub struct RateLimiter {
    max: usize,
    window: chrono::Duration,
    runs: Mutex<VecDeque<DateTime<Utc>>>,
}

impl RateLimiter {
    pub fn new(max: usize, window: Duration) -> Self {
        RateLimiter {
            max,
            window: chrono::Duration::from_std(window).unwrap_or(chrono::Duration::MAX),
            runs: Mutex::new(VecDeque::with_capacity(max)),
        }
    }

    /// Returns true if a cycle may start at `now`.
    pub fn can_run_now(&self, now: DateTime<Utc>) -> bool {
        let mut runs = self.lock();
        self.prune(&mut runs, now);
        runs.len() < self.max
    }

    /// Records a cycle started at `now`.
    pub fn mark_run(&self, now: DateTime<Utc>) {
        let mut runs = self.lock();
        self.prune(&mut runs, now);
        runs.push_back(now);
    }

    /// Checks and records in one step. Returns false if the cycle is denied.
    pub fn try_acquire(&self, now: DateTime<Utc>) -> bool {
        let mut runs = self.lock();
        self.prune(&mut runs, now);
        if runs.len() >= self.max {
            return false;
        }
        runs.push_back(now);
        true
    }

    /// Cycles still admissible at `now`.
    pub fn remaining(&self, now: DateTime<Utc>) -> usize {
        let mut runs = self.lock();
        self.prune(&mut runs, now);
        self.max.saturating_sub(runs.len())
    }

    fn prune(&self, runs: &mut VecDeque<DateTime<Utc>>, now: DateTime<Utc>) {
        while let Some(oldest) = runs.front() {
            if now.signed_duration_since(*oldest) >= self.window {
                runs.pop_front();
            } else {
                break;
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<DateTime<Utc>>> {
        self.runs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "rate_limiter_tests.rs"]
mod tests;
