// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daily health summary.
//!
//! The summary is derived from one day's vitals and workouts. It is never
//! stored remotely on its own; it only travels as the signed sync-summary
//! payload.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};

use crate::record::{ExerciseRecord, VitalsRecord};

/// Everything known about one local calendar day at generation time.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyHealthSummary {
    date: NaiveDate,
    steps: u32,
    resting_heart_rate: Option<f64>,
    sleep_hours: f64,
    hrv: Option<f64>,
    exercises: Vec<ExerciseRecord>,
    generated_at: DateTime<Utc>,
}

impl DailyHealthSummary {
    /// Builds the summary for `date` from the day's vitals and workouts.
    ///
    /// `generated_at` is the vitals capture time, so the summary inherits the
    /// no-future-timestamp guarantee of [`VitalsRecord`].
    pub fn new(date: NaiveDate, vitals: &VitalsRecord, exercises: Vec<ExerciseRecord>) -> Self {
        DailyHealthSummary {
            date,
            steps: vitals.steps(),
            resting_heart_rate: vitals.resting_heart_rate(),
            sleep_hours: vitals.sleep_hours(),
            hrv: vitals.hrv(),
            exercises,
            generated_at: vitals.captured_at(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn resting_heart_rate(&self) -> Option<f64> {
        self.resting_heart_rate
    }

    pub fn sleep_hours(&self) -> f64 {
        self.sleep_hours
    }

    pub fn hrv(&self) -> Option<f64> {
        self.hrv
    }

    pub fn exercises(&self) -> &[ExerciseRecord] {
        &self.exercises
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryWire<'a> {
    date: String,
    steps: u32,
    #[serde(rename = "restingHR")]
    resting_hr: Option<f64>,
    sleep_hours: f64,
    hrv: Option<f64>,
    workouts: Vec<WorkoutWire<'a>>,
    generated_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkoutWire<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    duration: u32,
    calories: Option<f64>,
    start_time: DateTime<Utc>,
}

impl Serialize for DailyHealthSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        SummaryWire {
            date: self.date.format("%Y-%m-%d").to_string(),
            steps: self.steps,
            resting_hr: self.resting_heart_rate,
            sleep_hours: self.sleep_hours,
            hrv: self.hrv,
            workouts: self
                .exercises
                .iter()
                .map(|e| WorkoutWire {
                    kind: e.kind().as_str(),
                    duration: e.duration_minutes(),
                    calories: e.calories_burned(),
                    start_time: e.started_at(),
                })
                .collect(),
            generated_at: self.generated_at,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
