// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the sync engine.

use thiserror::Error;

/// Errors produced by the sync engine.
///
/// Acquisition and delivery failures are absorbed by the orchestrator and
/// reported through [`crate::CycleOutcome`]; they only surface as errors from
/// the lower-level components.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("health data unavailable: {0}\n  hint: grant read access to steps, heart rate, HRV, sleep and workouts")]
    AcquisitionUnavailable(String),

    #[error("health query failed after {attempts} attempts: {reason}")]
    AcquisitionFailed { attempts: u32, reason: String },

    #[error("session expired\n  hint: run `vitald login` to sign in again")]
    AuthExpired,

    #[error("server rejected the request with status {status}")]
    ClientError { status: u16 },

    #[error("server unreachable: {0}")]
    ServerOrNetwork(String),

    #[error("storage error: {0}")]
    Store(#[from] vital_core::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("sync engine is not running")]
    EngineStopped,
}

impl SyncError {
    /// Returns true if trying again later may succeed without user action.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::AcquisitionFailed { .. } | SyncError::ServerOrNetwork(_)
        )
    }
}

/// A specialized Result type for sync engine operations.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
