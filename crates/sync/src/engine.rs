// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One sync cycle, and draining of the offline queue.
//!
//! A cycle passes the rate limiter, acquires today's records and delivers
//! each of them on its own. Anything that does not get through is appended
//! to the [`EventStore`] before the next record is attempted. A drain
//! replays the queue in order and stops at the first event that fails.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};
use vital_core::{ClockSource, OfflineEvent, PostMealWalk};

use crate::acquirer::{Acquirer, Acquisition};
use crate::config::{ClientErrorPolicy, SyncConfig};
use crate::dead_letter::{self, DeadLetterLog};
use crate::error::{Result, SyncError};
use crate::event_store::{self, EventStore};
use crate::health::HealthStore;
use crate::http::{HttpClient, Method};
use crate::meal::{self, MealLog};
use crate::rate_limiter::RateLimiter;
use crate::readings::{LastReading, ReadingCache};
use crate::session_store::{self, SessionStore};
use crate::signing::RequestSigner;
use crate::transport::{Delivery, SignedTransport};

pub const VITALS_ENDPOINT: &str = "log-vitals";
pub const EXERCISE_ENDPOINT: &str = "log-exercise";
pub const SUMMARY_ENDPOINT: &str = "health/sync-summary";

/// What started a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    Manual,
    Periodic,
    Midnight,
    /// The health store reported new samples.
    DataChange,
    /// The OS woke the app for background work.
    BackgroundWake,
    MealLogged,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Manual => "manual",
            Trigger::Periodic => "periodic",
            Trigger::Midnight => "midnight",
            Trigger::DataChange => "data_change",
            Trigger::BackgroundWake => "background_wake",
            Trigger::MealLogged => "meal_logged",
        }
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-record results of a cycle's delivery phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryCounts {
    pub delivered: usize,
    pub queued: usize,
    pub dead_lettered: usize,
    /// Records that neither reached the server nor local storage.
    pub store_errors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Denied by the rate limiter.
    Gated,
    /// Health data cannot be read (no permission or no store).
    Unavailable { reason: String },
    /// Health data could not be read this time.
    Failed { reason: String },
    Delivered(DeliveryCounts),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub trigger: Trigger,
    pub started_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: CycleOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_meal_walk: Option<PostMealWalk>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrainStatus {
    /// Every queued event was handled.
    Completed,
    /// Stopped at an event that could not be delivered.
    Halted,
    /// Nothing attempted without a session.
    NoSession,
    /// Another drain was already running.
    Busy,
}

impl DrainStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrainStatus::Completed => "completed",
            DrainStatus::Halted => "halted",
            DrainStatus::NoSession => "no_session",
            DrainStatus::Busy => "busy",
        }
    }
}

impl std::fmt::Display for DrainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainReport {
    pub status: DrainStatus,
    pub delivered: usize,
    pub dead_lettered: usize,
    pub remaining: usize,
}

impl DrainReport {
    fn idle(status: DrainStatus, remaining: usize) -> Self {
        DrainReport {
            status,
            delivered: 0,
            dead_lettered: 0,
            remaining,
        }
    }
}

/// Snapshot of engine state for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub user_id: Option<String>,
    pub pending_events: usize,
    pub dead_letters: usize,
    pub syncs_remaining: usize,
    pub last_meal: Option<DateTime<Utc>>,
    pub health_access_denied: bool,
    /// Vitals payload of the last successful acquisition.
    pub last_vitals: Option<LastReading>,
    pub last_summary: Option<LastReading>,
}

/// External collaborators of the engine.
pub struct EngineDeps {
    pub http: Arc<dyn HttpClient>,
    pub health: Arc<dyn HealthStore>,
    pub signer: RequestSigner,
    pub clock: Arc<dyn ClockSource>,
}

pub struct SyncEngine {
    config: SyncConfig,
    clock: Arc<dyn ClockSource>,
    acquirer: Acquirer,
    transport: SignedTransport,
    sessions: Arc<SessionStore>,
    events: Arc<EventStore>,
    dead_letters: DeadLetterLog,
    meals: MealLog,
    readings: ReadingCache,
    limiter: RateLimiter,
    drain_lock: Mutex<()>,
}

impl SyncEngine {
    /// Opens the engine's persistent state under `state_dir`.
    pub async fn open(config: SyncConfig, state_dir: &Path, deps: EngineDeps) -> Result<Self> {
        config.validate()?;
        tokio::fs::create_dir_all(state_dir)
            .await
            .map_err(vital_core::Error::from)?;

        let sessions =
            Arc::new(SessionStore::open(&state_dir.join(session_store::FILE_NAME)).await?);
        let events = Arc::new(EventStore::open(&state_dir.join(event_store::FILE_NAME)).await?);
        let dead_letters = DeadLetterLog::new(&state_dir.join(dead_letter::FILE_NAME));
        let meals = MealLog::open(&state_dir.join(meal::FILE_NAME)).await?;
        let readings = ReadingCache::open(state_dir).await?;

        let acquirer = Acquirer::new(&config, deps.health, Arc::clone(&deps.clock));
        let transport = SignedTransport::new(
            config.clone(),
            deps.http,
            Arc::clone(&sessions),
            deps.signer,
            Arc::clone(&deps.clock),
        );
        let limiter = RateLimiter::new(config.max_syncs_per_window, config.rate_window);

        info!(
            state_dir = %state_dir.display(),
            pending = events.len(),
            logged_in = sessions.is_logged_in(),
            "sync engine ready"
        );
        Ok(SyncEngine {
            config,
            clock: deps.clock,
            acquirer,
            transport,
            sessions,
            events,
            dead_letters,
            meals,
            readings,
            limiter,
            drain_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn events(&self) -> &Arc<EventStore> {
        &self.events
    }

    pub fn dead_letters(&self) -> &DeadLetterLog {
        &self.dead_letters
    }

    pub fn acquirer(&self) -> &Acquirer {
        &self.acquirer
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn clock(&self) -> &Arc<dyn ClockSource> {
        &self.clock
    }

    pub fn pending_count(&self) -> usize {
        self.events.len()
    }

    pub fn last_meal(&self) -> Option<DateTime<Utc>> {
        self.meals.last()
    }

    /// Remembers a meal for the post-meal walk heuristic.
    pub async fn record_meal(&self, at: DateTime<Utc>) -> Result<bool> {
        self.meals.record(at).await
    }

    pub async fn status(&self) -> Result<EngineStatus> {
        Ok(EngineStatus {
            user_id: self.sessions.snapshot().map(|s| s.user_id().to_string()),
            pending_events: self.events.len(),
            dead_letters: self.dead_letters.count().await?,
            syncs_remaining: self.limiter.remaining(self.clock.now()),
            last_meal: self.meals.last(),
            health_access_denied: self.acquirer.is_denied(),
            last_vitals: self.readings.vitals(),
            last_summary: self.readings.summary(),
        })
    }

    /// Runs one acquisition-and-delivery cycle.
    ///
    /// Never fails: every outcome, including storage trouble, is described
    /// by the returned report.
    pub async fn run_cycle(&self, trigger: Trigger) -> CycleReport {
        let started_at = self.clock.now();
        let report = |outcome: CycleOutcome, walk: Option<PostMealWalk>| CycleReport {
            trigger,
            started_at,
            outcome,
            post_meal_walk: walk,
        };

        if !self.limiter.try_acquire(started_at) {
            info!(%trigger, "sync skipped, rate limit reached");
            return report(CycleOutcome::Gated, None);
        }
        debug!(%trigger, "sync cycle started");

        let acquisition = match self.acquirer.acquire_today(self.meals.last()).await {
            Ok(acquisition) => acquisition,
            Err(SyncError::AcquisitionUnavailable(reason)) => {
                return report(CycleOutcome::Unavailable { reason }, None);
            }
            Err(e) => {
                warn!(%trigger, error = %e, "sync cycle failed");
                return report(CycleOutcome::Failed { reason: e.to_string() }, None);
            }
        };

        if let Err(e) = self.readings.save(&acquisition, started_at).await {
            warn!(error = %e, "failed to cache last readings");
        }

        let records = match encode(&acquisition) {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "failed to encode records");
                return report(
                    CycleOutcome::Failed { reason: e.to_string() },
                    Some(acquisition.post_meal_walk),
                );
            }
        };

        let mut counts = DeliveryCounts::default();
        for (endpoint, body) in records {
            self.deliver(endpoint, body, started_at, &mut counts).await;
        }

        info!(
            %trigger,
            delivered = counts.delivered,
            queued = counts.queued,
            dead_lettered = counts.dead_lettered,
            "sync cycle finished"
        );
        report(
            CycleOutcome::Delivered(counts),
            Some(acquisition.post_meal_walk),
        )
    }

    async fn deliver(
        &self,
        endpoint: &'static str,
        body: Vec<u8>,
        now: DateTime<Utc>,
        counts: &mut DeliveryCounts,
    ) {
        let delivery = self.transport.send(endpoint, Method::Post, &body).await;
        match delivery {
            Delivery::Success => counts.delivered += 1,
            Delivery::ClientError(status)
                if self.config.client_error_policy == ClientErrorPolicy::DeadLetter =>
            {
                let event = OfflineEvent::new(endpoint, body, now);
                match self.dead_letters.record(event, status, now).await {
                    Ok(()) => counts.dead_lettered += 1,
                    Err(e) => {
                        error!(endpoint, error = %e, "failed to write dead letter, record lost");
                        counts.store_errors += 1;
                    }
                }
            }
            other => {
                debug!(endpoint, delivery = ?other, "delivery failed, queueing");
                match self.events.append(endpoint, body, now).await {
                    Ok(_) => counts.queued += 1,
                    Err(e) => {
                        error!(endpoint, error = %e, "failed to queue record, record lost");
                        counts.store_errors += 1;
                    }
                }
            }
        }
    }

    /// Replays queued events in order, removing each one once delivered.
    ///
    /// Stops at the first event that fails. Returns immediately if no session
    /// exists or another drain is running.
    pub async fn drain(&self) -> Result<DrainReport> {
        let Ok(guard) = self.drain_lock.try_lock() else {
            debug!("drain already running");
            return Ok(DrainReport::idle(DrainStatus::Busy, self.events.len()));
        };
        self.drain_locked(guard).await
    }

    /// Like [`drain`](Self::drain), but waits for a running drain to finish
    /// and then replays whatever it left behind. Never reports `Busy`.
    pub async fn drain_waiting(&self) -> Result<DrainReport> {
        let guard = self.drain_lock.lock().await;
        self.drain_locked(guard).await
    }

    async fn drain_locked(&self, _guard: MutexGuard<'_, ()>) -> Result<DrainReport> {
        if !self.sessions.is_logged_in() {
            return Ok(DrainReport::idle(DrainStatus::NoSession, self.events.len()));
        }

        let pending = self.events.all().await?;
        if pending.is_empty() {
            return Ok(DrainReport::idle(DrainStatus::Completed, 0));
        }
        info!(pending = pending.len(), "draining offline queue");

        let mut report = DrainReport::idle(DrainStatus::Completed, 0);
        for event in pending {
            let id = event.id();
            let delivery = self
                .transport
                .send(event.endpoint(), Method::Post, event.payload())
                .await;
            match delivery {
                Delivery::Success => {
                    self.events.remove(&HashSet::from([id])).await?;
                    report.delivered += 1;
                }
                Delivery::ClientError(status)
                    if self.config.client_error_policy == ClientErrorPolicy::DeadLetter =>
                {
                    self.dead_letters
                        .record(event, status, self.clock.now())
                        .await?;
                    self.events.remove(&HashSet::from([id])).await?;
                    report.dead_lettered += 1;
                }
                other => {
                    info!(%id, delivery = ?other, "drain halted");
                    report.status = DrainStatus::Halted;
                    break;
                }
            }
        }

        report.remaining = self.events.len();
        info!(
            delivered = report.delivered,
            dead_lettered = report.dead_lettered,
            remaining = report.remaining,
            "drain finished"
        );
        Ok(report)
    }
}

fn encode(acquisition: &Acquisition) -> serde_json::Result<Vec<(&'static str, Vec<u8>)>> {
    let mut records = vec![(VITALS_ENDPOINT, serde_json::to_vec(&acquisition.vitals)?)];
    if let Some(exercise) = &acquisition.exercise {
        records.push((EXERCISE_ENDPOINT, serde_json::to_vec(exercise)?));
    }
    records.push((SUMMARY_ENDPOINT, serde_json::to_vec(&acquisition.summary)?));
    Ok(records)
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
