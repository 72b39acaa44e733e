// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for vital-core operations.

use thiserror::Error;

/// All possible errors that can occur in vital-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("timestamp {captured} is after acquisition time {now}\n  hint: records cannot describe the future")]
    FutureTimestamp { captured: String, now: String },

    #[error("invalid workout kind: '{0}'\n  hint: valid kinds are: walking, running, strength, other")]
    InvalidWorkoutKind(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data in {path}: {reason}")]
    CorruptedData { path: String, reason: String },
}

/// A specialized Result type for vital-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
