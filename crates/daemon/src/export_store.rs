// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Health store backed by an exported JSON file.
//!
//! Stands in for the platform store on hosts without one. Another tool
//! writes the export; vitald re-reads it on every query and watches its
//! modification time to raise data-change triggers.
//!
//! ```json
//! {
//!   "authorization": "authorized",
//!   "quantities": [
//!     {"kind": "step_count", "start": "...", "end": "...", "value": 1200}
//!   ],
//!   "sleep": [{"start": "...", "end": "...", "stage": "core"}],
//!   "workouts": [{"kind": "walking", "start": "...", "end": "...", "calories": 90}]
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use vital_sync::{
    AuthorizationStatus, BoxFuture, HealthStore, HealthStoreError, QuantityKind, SleepSample,
    SleepStage, WorkoutSample,
};

pub const FILE_NAME: &str = "health-export.json";

#[derive(Debug, Clone, Deserialize)]
struct QuantitySample {
    kind: QuantityKind,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct Export {
    #[serde(default = "authorized")]
    authorization: AuthorizationStatus,
    #[serde(default)]
    quantities: Vec<QuantitySample>,
    #[serde(default)]
    sleep: Vec<SleepSample>,
    #[serde(default)]
    workouts: Vec<WorkoutSample>,
}

fn authorized() -> AuthorizationStatus {
    AuthorizationStatus::Authorized
}

impl Export {
    fn quantities(
        &self,
        kind: QuantityKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Iterator<Item = f64> + '_ {
        self.quantities
            .iter()
            .filter(move |q| q.kind == kind && q.start >= start && q.start < end)
            .map(|q| q.value)
    }
}

pub struct ExportFileStore {
    path: Arc<PathBuf>,
    poll: Option<Duration>,
    watching: AtomicBool,
}

impl ExportFileStore {
    /// `poll` is the change-detection interval; `None` disables it.
    pub fn new(path: &Path, poll: Option<Duration>) -> Self {
        ExportFileStore {
            path: Arc::new(path.to_path_buf()),
            poll,
            watching: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Export, HealthStoreError> {
        let path = Arc::clone(&self.path);
        tokio::task::spawn_blocking(move || read_export(&path))
            .await
            .map_err(|e| HealthStoreError::Query(e.to_string()))?
    }
}

fn read_export(path: &Path) -> Result<Export, HealthStoreError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(HealthStoreError::NotAvailable)
        }
        Err(e) => return Err(HealthStoreError::Query(format!("{}: {e}", path.display()))),
    };
    serde_json::from_slice(&bytes)
        .map_err(|e| HealthStoreError::Query(format!("{}: {e}", path.display())))
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

impl HealthStore for ExportFileStore {
    fn authorization(&self) -> BoxFuture<'_, Result<AuthorizationStatus, HealthStoreError>> {
        Box::pin(async move { Ok(self.load().await?.authorization) })
    }

    fn cumulative_sum(
        &self,
        kind: QuantityKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Result<f64, HealthStoreError>> {
        Box::pin(async move { Ok(self.load().await?.quantities(kind, start, end).sum()) })
    }

    fn discrete_average(
        &self,
        kind: QuantityKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Result<Option<f64>, HealthStoreError>> {
        Box::pin(async move {
            let export = self.load().await?;
            let (sum, n) = export
                .quantities(kind, start, end)
                .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
            Ok((n > 0).then(|| sum / n as f64))
        })
    }

    fn sleep_samples<'a>(
        &'a self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        stages: &'a [SleepStage],
    ) -> BoxFuture<'a, Result<Vec<SleepSample>, HealthStoreError>> {
        Box::pin(async move {
            Ok(self
                .load()
                .await?
                .sleep
                .into_iter()
                .filter(|s| s.start >= start && s.start < end && stages.contains(&s.stage))
                .collect())
        })
    }

    fn recent_workouts(
        &self,
        since: DateTime<Utc>,
        limit: Option<usize>,
    ) -> BoxFuture<'_, Result<Vec<WorkoutSample>, HealthStoreError>> {
        Box::pin(async move {
            let mut workouts: Vec<_> = self
                .load()
                .await?
                .workouts
                .into_iter()
                .filter(|w| w.start >= since)
                .collect();
            workouts.sort_by(|a, b| b.end.cmp(&a.end));
            if let Some(limit) = limit {
                workouts.truncate(limit);
            }
            Ok(workouts)
        })
    }

    /// Polls the export's modification time. Hands out one receiver.
    fn subscribe_changes(&self) -> Option<mpsc::Receiver<()>> {
        let every = self.poll?;
        if self.watching.swap(true, Ordering::SeqCst) {
            return None;
        }
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        let (tx, rx) = mpsc::channel(1);
        let path = Arc::clone(&self.path);
        let mut last = modified(&path);
        runtime.spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            while !tx.is_closed() {
                ticker.tick().await;
                let current = modified(&path);
                if current == last {
                    continue;
                }
                last = current;
                if current.is_none() {
                    warn!(path = %path.display(), "health export disappeared");
                    continue;
                }
                debug!(path = %path.display(), "health export changed");
                match tx.try_send(()) {
                    Ok(()) | Err(mpsc::error::TrySendError::Full(())) => {}
                    Err(mpsc::error::TrySendError::Closed(())) => break,
                }
            }
        });
        Some(rx)
    }
}

#[cfg(test)]
#[path = "export_store_tests.rs"]
mod tests;
