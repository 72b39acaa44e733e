// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::zone::LocalZone;

/// What happens to a queued event the server rejects with a 4xx.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientErrorPolicy {
    /// Move the event to the dead-letter log and keep draining.
    #[default]
    DeadLetter,
    /// Leave the event queued; it blocks the drain until removed by hand.
    Retain,
}

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the remote API, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Maximum cycles admitted per rolling window.
    pub max_syncs_per_window: usize,
    /// Length of the rolling rate-limit window.
    pub rate_window: Duration,
    /// Extra attempts for a transient health-store failure.
    pub acquisition_retries: u32,
    /// How far back workouts are considered for a cycle.
    pub workout_lookback: Duration,
    /// Time a background wake may take before it reports failure.
    pub wake_budget: Duration,
    /// Interval of the periodic trigger; `None` disables it.
    pub sync_interval: Option<Duration>,
    /// Zone used to find the local calendar day and midnight.
    pub local_zone: LocalZone,
    pub client_error_policy: ClientErrorPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            base_url: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_secs(60),
            max_syncs_per_window: 10,
            rate_window: Duration::from_secs(3600),
            acquisition_retries: 2,
            workout_lookback: Duration::from_secs(24 * 3600),
            wake_budget: Duration::from_secs(25),
            sync_interval: Some(Duration::from_secs(30 * 60)),
            local_zone: LocalZone::utc(),
            client_error_policy: ClientErrorPolicy::DeadLetter,
        }
    }
}

impl SyncConfig {
    /// Checks values that would make the engine misbehave.
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SyncError::Config(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.max_syncs_per_window == 0 {
            return Err(SyncError::Config(
                "max_syncs_per_window must be at least 1".to_string(),
            ));
        }
        if self.rate_window.is_zero() {
            return Err(SyncError::Config("rate_window must be positive".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(SyncError::Config("request_timeout must be positive".to_string()));
        }
        if self.wake_budget.is_zero() {
            return Err(SyncError::Config("wake_budget must be positive".to_string()));
        }
        if matches!(self.sync_interval, Some(d) if d.is_zero()) {
            return Err(SyncError::Config("sync_interval must be positive".to_string()));
        }
        Ok(())
    }

    /// Joins an endpoint path onto the base URL.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
