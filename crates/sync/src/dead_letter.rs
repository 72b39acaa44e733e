// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Log of events the server refused.
//!
//! An event answered with a 4xx other than 401 will never succeed as-is.
//! Instead of dropping it, the engine appends it here (one JSON line per
//! event) before removing it from the pending queue.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use vital_core::{jsonl, OfflineEvent};

use crate::error::Result;

/// File name of the log inside the state directory.
pub const FILE_NAME: &str = "dead-letters.jsonl";

/// One rejected event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetter {
    pub event: OfflineEvent,
    pub status: u16,
    pub rejected_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DeadLetterLog {
    path: PathBuf,
}

impl DeadLetterLog {
    pub fn new(path: &Path) -> Self {
        DeadLetterLog {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `event` and syncs the log.
    pub async fn record(
        &self,
        event: OfflineEvent,
        status: u16,
        rejected_at: DateTime<Utc>,
    ) -> Result<()> {
        warn!(
            id = %event.id(),
            endpoint = event.endpoint(),
            status,
            "server rejected queued event, moving to dead-letter log"
        );
        let entry = DeadLetter {
            event,
            status,
            rejected_at,
        };
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || jsonl::append(&path, &entry)).await??;
        Ok(())
    }

    pub async fn entries(&self) -> Result<Vec<DeadLetter>> {
        let path = self.path.clone();
        let entries = tokio::task::spawn_blocking(move || jsonl::read_all(&path)).await??;
        Ok(entries)
    }

    pub async fn count(&self) -> Result<usize> {
        let path = self.path.clone();
        let n = tokio::task::spawn_blocking(move || jsonl::count(&path)).await??;
        Ok(n)
    }
}

#[cfg(test)]
#[path = "dead_letter_tests.rs"]
mod tests;
