// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Normalized health records.
//!
//! Records are immutable facts: fields are private and only readable through
//! getters once a constructor has validated them. Serialization produces the
//! JSON shape the remote API expects (camelCase keys, RFC 3339 timestamps).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Classification of a workout sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutKind {
    Walking,
    Running,
    /// Traditional strength training.
    Strength,
    /// Anything the platform reports that is not one of the above.
    Other,
}

impl WorkoutKind {
    /// Returns the string representation used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutKind::Walking => "walking",
            WorkoutKind::Running => "running",
            WorkoutKind::Strength => "strength",
            WorkoutKind::Other => "other",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkoutKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "walking" => Ok(WorkoutKind::Walking),
            "running" => Ok(WorkoutKind::Running),
            "strength" => Ok(WorkoutKind::Strength),
            "other" => Ok(WorkoutKind::Other),
            _ => Err(Error::InvalidWorkoutKind(s.to_string())),
        }
    }
}

/// A point-in-time snapshot of the day's vitals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsRecord {
    resting_heart_rate: Option<f64>,
    hrv: Option<f64>,
    sleep_hours: f64,
    steps: u32,
    captured_at: DateTime<Utc>,
}

impl VitalsRecord {
    /// Creates a vitals record acquired at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] for negative or non-finite measurements
    /// and [`Error::FutureTimestamp`] if `captured_at` is later than `now`.
    pub fn new(
        steps: u32,
        resting_heart_rate: Option<f64>,
        hrv: Option<f64>,
        sleep_hours: f64,
        captured_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        check_measurement("sleep hours", sleep_hours)?;
        if let Some(bpm) = resting_heart_rate {
            check_measurement("resting heart rate", bpm)?;
        }
        if let Some(ms) = hrv {
            check_measurement("heart-rate variability", ms)?;
        }
        check_not_future(captured_at, now)?;

        Ok(VitalsRecord {
            resting_heart_rate,
            hrv,
            sleep_hours,
            steps,
            captured_at,
        })
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Resting heart rate in beats per minute, if the platform had samples.
    pub fn resting_heart_rate(&self) -> Option<f64> {
        self.resting_heart_rate
    }

    /// Heart-rate variability (SDNN) in milliseconds.
    pub fn hrv(&self) -> Option<f64> {
        self.hrv
    }

    pub fn sleep_hours(&self) -> f64 {
        self.sleep_hours
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }
}

/// A single workout, optionally flagged as a post-meal walk.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    #[serde(rename = "workoutType")]
    kind: WorkoutKind,
    duration_minutes: u32,
    calories_burned: Option<f64>,
    started_at: DateTime<Utc>,
    is_post_meal_walk: bool,
}

impl ExerciseRecord {
    /// Creates an exercise record acquired at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] for negative or non-finite calories
    /// and [`Error::FutureTimestamp`] if `started_at` is later than `now`.
    pub fn new(
        kind: WorkoutKind,
        duration_minutes: u32,
        calories_burned: Option<f64>,
        started_at: DateTime<Utc>,
        is_post_meal_walk: bool,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if let Some(kcal) = calories_burned {
            check_measurement("calories burned", kcal)?;
        }
        check_not_future(started_at, now)?;

        Ok(ExerciseRecord {
            kind,
            duration_minutes,
            calories_burned,
            started_at,
            is_post_meal_walk,
        })
    }

    pub fn kind(&self) -> WorkoutKind {
        self.kind
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn calories_burned(&self) -> Option<f64> {
        self.calories_burned
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_post_meal_walk(&self) -> bool {
        self.is_post_meal_walk
    }
}

fn check_measurement(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidRecord(format!(
            "{name} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

pub(crate) fn check_not_future(at: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if at > now {
        return Err(Error::FutureTimestamp { captured: at.to_rfc3339(), now: now.to_rfc3339() });
    }
    Ok(())
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
