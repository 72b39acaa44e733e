// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Time of the most recently logged meal.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;
use tracing::info;
use vital_core::atomic;

use crate::error::Result;

/// File name of the meal record inside the state directory.
pub const FILE_NAME: &str = "last-meal.json";

#[derive(Serialize, Deserialize)]
struct MealFile {
    logged_at: DateTime<Utc>,
}

/// Remembers the last meal across restarts.
pub struct MealLog {
    path: PathBuf,
    last: Mutex<Option<DateTime<Utc>>>,
    /// Serializes check, write and update across concurrent callers.
    writes: AsyncMutex<()>,
}

impl MealLog {
    pub async fn open(path: &Path) -> Result<Self> {
        let file = path.to_path_buf();
        let stored =
            tokio::task::spawn_blocking(move || atomic::read_json::<MealFile>(&file)).await??;
        Ok(MealLog {
            path: path.to_path_buf(),
            last: Mutex::new(stored.map(|m| m.logged_at)),
            writes: AsyncMutex::new(()),
        })
    }

    pub fn last(&self) -> Option<DateTime<Utc>> {
        *self.last.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records a meal. An older time than the one already stored is ignored.
    pub async fn record(&self, at: DateTime<Utc>) -> Result<bool> {
        let _guard = self.writes.lock().await;
        if matches!(self.last(), Some(existing) if existing >= at) {
            return Ok(false);
        }
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || atomic::write_json(&path, &MealFile { logged_at: at }))
            .await??;
        *self.last.lock().unwrap_or_else(|e| e.into_inner()) = Some(at);
        info!(%at, "meal logged");
        Ok(true)
    }
}

#[cfg(test)]
#[path = "meal_tests.rs"]
mod tests;
