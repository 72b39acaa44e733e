// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;
use vital_sync::SyncError;

/// Errors surfaced by the vitald binary.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("invalid config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("signing secret missing\n  hint: set VITALSYNC_SIGNING_SECRET or signing_secret in {0}")]
    MissingSecret(PathBuf),

    #[error("another vitald instance holds {0}\n  hint: it did not answer on its control socket; stop it and retry")]
    AlreadyRunning(PathBuf),

    #[error("daemon error: {0}")]
    Daemon(String),

    #[error("invalid time '{0}'\n  hint: use RFC 3339, e.g. 2026-06-10T12:30:00+02:00")]
    InvalidTime(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config { .. } | Error::MissingSecret(_) | Error::InvalidTime(_) => 2,
            Error::AlreadyRunning(_) => 3,
            Error::Sync(SyncError::Config(_)) => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
