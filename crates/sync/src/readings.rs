// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Most recently acquired vitals and daily summary.
//!
//! Kept on disk so a status display has something to show while offline or
//! before the first cycle of a new process. Each file holds the wire payload
//! exactly as it was sent.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;
use vital_core::atomic;

use crate::acquirer::Acquisition;
use crate::error::Result;

pub const VITALS_FILE_NAME: &str = "last-vitals.json";
pub const SUMMARY_FILE_NAME: &str = "last-daily-summary.json";

/// A payload and the time the cycle that produced it started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastReading {
    pub acquired_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

#[derive(Default)]
struct Latest {
    vitals: Option<LastReading>,
    summary: Option<LastReading>,
}

pub struct ReadingCache {
    vitals_path: PathBuf,
    summary_path: PathBuf,
    latest: Mutex<Latest>,
    writes: AsyncMutex<()>,
}

impl ReadingCache {
    pub async fn open(state_dir: &Path) -> Result<Self> {
        let vitals_path = state_dir.join(VITALS_FILE_NAME);
        let summary_path = state_dir.join(SUMMARY_FILE_NAME);
        let (vitals, summary) = {
            let vitals_path = vitals_path.clone();
            let summary_path = summary_path.clone();
            tokio::task::spawn_blocking(move || -> Result<_> {
                Ok((
                    atomic::read_json::<LastReading>(&vitals_path)?,
                    atomic::read_json::<LastReading>(&summary_path)?,
                ))
            })
            .await??
        };
        Ok(ReadingCache {
            vitals_path,
            summary_path,
            latest: Mutex::new(Latest { vitals, summary }),
            writes: AsyncMutex::new(()),
        })
    }

    pub fn vitals(&self) -> Option<LastReading> {
        self.lock().vitals.clone()
    }

    pub fn summary(&self) -> Option<LastReading> {
        self.lock().summary.clone()
    }

    /// Replaces both readings with those of `acquisition`.
    pub async fn save(&self, acquisition: &Acquisition, acquired_at: DateTime<Utc>) -> Result<()> {
        let vitals = LastReading {
            acquired_at,
            payload: serde_json::to_value(&acquisition.vitals).map_err(vital_core::Error::from)?,
        };
        let summary = LastReading {
            acquired_at,
            payload: serde_json::to_value(&acquisition.summary).map_err(vital_core::Error::from)?,
        };

        let _guard = self.writes.lock().await;
        let (vitals_path, summary_path) = (self.vitals_path.clone(), self.summary_path.clone());
        let (v, s) = (vitals.clone(), summary.clone());
        tokio::task::spawn_blocking(move || -> Result<()> {
            atomic::write_json(&vitals_path, &v)?;
            atomic::write_json(&summary_path, &s)?;
            Ok(())
        })
        .await??;

        let mut latest = self.lock();
        latest.vitals = Some(vitals);
        latest.summary = Some(summary);
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Latest> {
        self.latest.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "readings_tests.rs"]
mod tests;
