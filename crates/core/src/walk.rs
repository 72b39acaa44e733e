// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Post-meal walk heuristic.
//!
//! A meal opens a 60 minute observation window. The user "walked after the
//! meal" if a walking workout starts inside the window, or if the steps taken
//! inside the window reach `max(350, 1.5 × baseline)`, where the baseline is
//! the step count of the 60 minutes before the meal.
//!
//! The verdict is three-valued: while the window is still open and no walk
//! has been observed yet, the answer is [`PostMealWalk::Pending`], never
//! [`PostMealWalk::NotDetected`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the observation window (and of the baseline window).
pub const WINDOW_MINUTES: i64 = 60;

/// Absolute step floor a window has to reach.
pub const MIN_WINDOW_STEPS: f64 = 350.0;

/// Window steps must also exceed the baseline by this factor.
pub const BASELINE_MULTIPLIER: f64 = 1.5;

/// Outcome of the post-meal walk heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostMealWalk {
    /// Window still open, nothing observed yet.
    Pending,
    /// Window elapsed (or no meal logged) without a walk.
    NotDetected,
    Detected,
}

impl PostMealWalk {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostMealWalk::Pending => "pending",
            PostMealWalk::NotDetected => "not_detected",
            PostMealWalk::Detected => "detected",
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, PostMealWalk::Detected)
    }
}

impl fmt::Display for PostMealWalk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Measurements gathered around one meal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WalkEvidence {
    /// A walking workout started inside the window.
    pub walk_started_in_window: bool,
    /// Steps in the hour before the meal.
    pub baseline_steps: f64,
    /// Steps since the meal, up to the window end or now.
    pub window_steps: f64,
}

impl WalkEvidence {
    /// Step count the window must reach.
    pub fn step_threshold(&self) -> f64 {
        MIN_WINDOW_STEPS.max(BASELINE_MULTIPLIER * self.baseline_steps)
    }

    pub fn steps_met(&self) -> bool {
        self.window_steps >= self.step_threshold()
    }

    /// Turns evidence into a verdict.
    ///
    /// A positive observation is final even before the window closes; a
    /// negative one is only final once `window_complete` is true.
    pub fn verdict(&self, window_complete: bool) -> PostMealWalk {
        if self.walk_started_in_window || self.steps_met() {
            PostMealWalk::Detected
        } else if window_complete {
            PostMealWalk::NotDetected
        } else {
            PostMealWalk::Pending
        }
    }
}

/// End of the observation window for a meal.
pub fn window_end(meal_time: DateTime<Utc>) -> DateTime<Utc> {
    meal_time + Duration::minutes(WINDOW_MINUTES)
}

/// Start of the baseline window for a meal.
pub fn baseline_start(meal_time: DateTime<Utc>) -> DateTime<Utc> {
    meal_time - Duration::minutes(WINDOW_MINUTES)
}

/// Returns true once the whole window lies in the past.
pub fn window_complete(meal_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now >= window_end(meal_time)
}

/// Returns true if `start` falls inside the window, bounds included.
pub fn in_window(meal_time: DateTime<Utc>, start: DateTime<Utc>) -> bool {
    start >= meal_time && start <= window_end(meal_time)
}

#[cfg(test)]
#[path = "walk_tests.rs"]
mod tests;
