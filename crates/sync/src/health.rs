// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Interface to the platform health-data store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use vital_core::WorkoutKind;

use crate::BoxFuture;

/// Error type for health-store queries.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HealthStoreError {
    #[error("health data is not available on this device")]
    NotAvailable,

    #[error("read access to health data was not granted")]
    NotAuthorized,

    #[error("health query failed: {0}")]
    Query(String),
}

impl HealthStoreError {
    /// Returns true if the same query may succeed when repeated.
    pub fn is_transient(&self) -> bool {
        matches!(self, HealthStoreError::Query(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    Authorized,
    Denied,
    /// The user has not been asked yet.
    NotDetermined,
}

/// Quantity sample types read by the acquirer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    /// Count, summed.
    StepCount,
    /// Beats per minute, averaged.
    RestingHeartRate,
    /// SDNN in milliseconds, averaged.
    HeartRateVariability,
}

/// Value of a sleep-analysis category sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepStage {
    InBed,
    Awake,
    Core,
    Deep,
    Rem,
    /// Asleep, stage not reported.
    Unspecified,
}

impl SleepStage {
    /// Stages that count as time asleep.
    pub const ASLEEP: [SleepStage; 4] = [
        SleepStage::Core,
        SleepStage::Deep,
        SleepStage::Rem,
        SleepStage::Unspecified,
    ];

    pub fn is_asleep(&self) -> bool {
        Self::ASLEEP.contains(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepSample {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub stage: SleepStage,
}

impl SleepSample {
    /// Length in hours; zero for inverted intervals.
    pub fn hours(&self) -> f64 {
        let seconds = (self.end - self.start).num_seconds().max(0);
        seconds as f64 / 3600.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSample {
    pub kind: WorkoutKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Active energy in kilocalories.
    #[serde(default)]
    pub calories: Option<f64>,
}

impl WorkoutSample {
    pub fn duration_minutes(&self) -> u32 {
        let minutes = (self.end - self.start).num_minutes().max(0);
        u32::try_from(minutes).unwrap_or(u32::MAX)
    }
}

/// Read access to the platform health store.
///
/// Time ranges are half-open, `[start, end)`.
pub trait HealthStore: Send + Sync {
    fn authorization(&self) -> BoxFuture<'_, Result<AuthorizationStatus, HealthStoreError>>;

    /// Sum of a cumulative quantity over the range. No samples yields zero.
    fn cumulative_sum(
        &self,
        kind: QuantityKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Result<f64, HealthStoreError>>;

    /// Average of a discrete quantity over the range, `None` without samples.
    fn discrete_average(
        &self,
        kind: QuantityKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Result<Option<f64>, HealthStoreError>>;

    /// Sleep samples starting in the range whose stage is in `stages`.
    fn sleep_samples<'a>(
        &'a self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        stages: &'a [SleepStage],
    ) -> BoxFuture<'a, Result<Vec<SleepSample>, HealthStoreError>>;

    /// Workouts starting at or after `since`, most recently ended first.
    fn recent_workouts(
        &self,
        since: DateTime<Utc>,
        limit: Option<usize>,
    ) -> BoxFuture<'_, Result<Vec<WorkoutSample>, HealthStoreError>>;

    /// Receiver signalled whenever new samples arrive.
    ///
    /// Returns `None` if the store cannot observe changes, or if the receiver
    /// was already handed out.
    fn subscribe_changes(&self) -> Option<mpsc::Receiver<()>> {
        None
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
