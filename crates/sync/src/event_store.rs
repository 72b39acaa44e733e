// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable store of undelivered records.
//!
//! The whole queue lives in one JSON file that is replaced atomically on
//! every change, so a crash at any point leaves either the old or the new
//! queue on disk. Operations are serialized by an async mutex and the file
//! I/O runs on the blocking pool.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tracing::debug;
use vital_core::{atomic, EventId, OfflineEvent};

use crate::error::Result;

/// File name of the queue inside the state directory.
pub const FILE_NAME: &str = "pending-events.json";

pub struct EventStore {
    path: Arc<PathBuf>,
    lock: Mutex<()>,
    pending: watch::Sender<usize>,
}

impl EventStore {
    /// Opens the queue at `path`, creating nothing until the first append.
    ///
    /// Fails if an existing queue file cannot be decoded; a damaged queue is
    /// never replaced with an empty one.
    pub async fn open(path: &Path) -> Result<Self> {
        let path = Arc::new(path.to_path_buf());
        let events = load(Arc::clone(&path)).await?;
        debug!(path = %path.display(), pending = events.len(), "opened event store");

        let (pending, _) = watch::channel(events.len());
        Ok(EventStore {
            path,
            lock: Mutex::new(()),
            pending,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists a new event holding `payload` for `endpoint`.
    ///
    /// The event is on disk when this returns.
    pub async fn append(
        &self,
        endpoint: &str,
        payload: Vec<u8>,
        created_at: DateTime<Utc>,
    ) -> Result<OfflineEvent> {
        let event = OfflineEvent::new(endpoint, payload, created_at);
        let _guard = self.lock.lock().await;

        let mut events = load(Arc::clone(&self.path)).await?;
        events.push(event.clone());
        let count = events.len();
        store(Arc::clone(&self.path), events).await?;

        self.pending.send_replace(count);
        debug!(id = %event.id(), endpoint, pending = count, "queued event");
        Ok(event)
    }

    /// Returns every pending event in append order.
    pub async fn all(&self) -> Result<Vec<OfflineEvent>> {
        let _guard = self.lock.lock().await;
        load(Arc::clone(&self.path)).await
    }

    /// Removes the events whose ids are in `ids`, all at once.
    ///
    /// Unknown ids are ignored. Returns how many events were removed.
    pub async fn remove(&self, ids: &HashSet<EventId>) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let _guard = self.lock.lock().await;

        let events = load(Arc::clone(&self.path)).await?;
        let before = events.len();
        let kept: Vec<OfflineEvent> = events
            .into_iter()
            .filter(|e| !ids.contains(&e.id()))
            .collect();
        let removed = before - kept.len();
        if removed == 0 {
            return Ok(0);
        }

        let count = kept.len();
        store(Arc::clone(&self.path), kept).await?;
        self.pending.send_replace(count);
        debug!(removed, pending = count, "removed delivered events");
        Ok(removed)
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        *self.pending.borrow()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Watches the pending count.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.pending.subscribe()
    }
}

async fn load(path: Arc<PathBuf>) -> Result<Vec<OfflineEvent>> {
    let events = tokio::task::spawn_blocking(move || {
        atomic::read_json::<Vec<OfflineEvent>>(&path)
    })
    .await??;
    Ok(events.unwrap_or_default())
}

async fn store(path: Arc<PathBuf>, events: Vec<OfflineEvent>) -> Result<()> {
    tokio::task::spawn_blocking(move || atomic::write_json(&path, &events)).await??;
    Ok(())
}

#[cfg(test)]
#[path = "event_store_tests.rs"]
mod tests;
