// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Actor that owns the sync engine's schedule of work.
//!
//! Triggers arrive as [`Command`]s on an mpsc channel. Each cycle runs as
//! its own task, so overlapping triggers may overlap in flight; the rate
//! limiter and drain lock inside the engine keep that safe. The actor also
//! drains the offline queue at startup and whenever a session is
//! established or refreshed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use vital_core::{walk, ClockSource};

use crate::engine::{CycleOutcome, CycleReport, DrainReport, SyncEngine, Trigger};
use crate::error::{Result, SyncError};
use crate::session_store::SessionChange;

const COMMAND_BUFFER: usize = 32;

/// Extra delay after a meal's window closes before its follow-up cycle.
const MEAL_FOLLOW_UP_SLACK: Duration = Duration::from_secs(5);

/// Result of a background wake, in the shape OS schedulers expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WakeResult {
    NewData,
    NoData,
    Failed,
}

impl WakeResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            WakeResult::NewData => "new_data",
            WakeResult::NoData => "no_data",
            WakeResult::Failed => "failed",
        }
    }

    pub fn from_report(report: &CycleReport) -> Self {
        match &report.outcome {
            CycleOutcome::Delivered(counts) if counts.delivered > 0 => WakeResult::NewData,
            CycleOutcome::Delivered(counts) if counts.queued > 0 || counts.store_errors > 0 => {
                WakeResult::Failed
            }
            CycleOutcome::Delivered(_) => WakeResult::NoData,
            CycleOutcome::Gated | CycleOutcome::Unavailable { .. } => WakeResult::NoData,
            CycleOutcome::Failed { .. } => WakeResult::Failed,
        }
    }
}

impl std::fmt::Display for WakeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

enum Command {
    Sync {
        trigger: Trigger,
        reply: Option<oneshot::Sender<CycleReport>>,
    },
    Drain {
        reply: Option<oneshot::Sender<Result<DrainReport>>>,
    },
    MealLogged {
        at: DateTime<Utc>,
        reply: oneshot::Sender<Result<bool>>,
    },
    Shutdown,
}

pub struct Orchestrator {
    engine: Arc<SyncEngine>,
    commands: mpsc::Receiver<Command>,
    self_tx: mpsc::Sender<Command>,
    sessions: watch::Receiver<SessionChange>,
    reports: watch::Sender<Option<CycleReport>>,
    cancel: CancellationToken,
    tasks: JoinSet<()>,
    startup_drain: bool,
}

/// Cloneable front end for sending work to the orchestrator.
#[derive(Clone)]
pub struct OrchestratorHandle {
    commands: mpsc::Sender<Command>,
    engine: Arc<SyncEngine>,
    reports: watch::Receiver<Option<CycleReport>>,
    wake_budget: Duration,
}

impl Orchestrator {
    pub fn new(engine: Arc<SyncEngine>, cancel: CancellationToken) -> (Self, OrchestratorHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let (reports, reports_rx) = watch::channel(None);
        let handle = OrchestratorHandle {
            commands: tx.clone(),
            engine: Arc::clone(&engine),
            reports: reports_rx,
            wake_budget: engine.config().wake_budget,
        };
        let orchestrator = Orchestrator {
            sessions: engine.sessions().subscribe(),
            engine,
            commands: rx,
            self_tx: tx,
            reports,
            cancel,
            tasks: JoinSet::new(),
            startup_drain: true,
        };
        (orchestrator, handle)
    }

    /// Skips the drain `run` would otherwise start when a session exists.
    pub fn without_startup_drain(mut self) -> Self {
        self.startup_drain = false;
        self
    }

    /// Starts the actor on the current runtime.
    pub fn spawn(
        engine: Arc<SyncEngine>,
        cancel: CancellationToken,
    ) -> (OrchestratorHandle, tokio::task::JoinHandle<()>) {
        let (orchestrator, handle) = Self::new(engine, cancel);
        (handle, tokio::spawn(orchestrator.run()))
    }

    pub async fn run(mut self) {
        info!("orchestrator started");
        let mut data_changes = self.engine.acquirer().store().subscribe_changes();
        if self.startup_drain && self.engine.sessions().is_logged_in() {
            self.spawn_drain(None);
        }

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                command = self.commands.recv() => match command {
                    None | Some(Command::Shutdown) => break,
                    Some(Command::Sync { trigger, reply }) => self.spawn_cycle(trigger, reply),
                    Some(Command::Drain { reply }) => self.spawn_drain(reply),
                    Some(Command::MealLogged { at, reply }) => self.spawn_meal(at, reply),
                },
                Ok(()) = self.sessions.changed() => {
                    let change = *self.sessions.borrow_and_update();
                    debug!(?change, "session changed");
                    if change.has_session() {
                        self.spawn_drain(None);
                    }
                }
                Some(()) = next_change(&mut data_changes) => {
                    self.spawn_cycle(Trigger::DataChange, None);
                }
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "sync task failed");
                    }
                }
            }
        }

        info!(in_flight = self.tasks.len(), "orchestrator stopping");
        self.cancel.cancel();
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(e) = joined {
                if !e.is_cancelled() {
                    error!(error = %e, "sync task failed during shutdown");
                }
            }
        }
        info!("orchestrator stopped");
    }

    fn spawn_cycle(&mut self, trigger: Trigger, reply: Option<oneshot::Sender<CycleReport>>) {
        // A user request or fresh samples are reasons to ask for access again.
        if matches!(trigger, Trigger::Manual | Trigger::DataChange) {
            self.engine.acquirer().reset_authorization();
        }
        let engine = Arc::clone(&self.engine);
        let reports = self.reports.clone();
        self.tasks.spawn(async move {
            let report = engine.run_cycle(trigger).await;
            reports.send_replace(Some(report.clone()));
            if let Some(reply) = reply {
                let _ = reply.send(report);
            }
        });
    }

    fn spawn_drain(&mut self, reply: Option<oneshot::Sender<Result<DrainReport>>>) {
        let engine = Arc::clone(&self.engine);
        self.tasks.spawn(async move {
            // Someone asked for this drain and wants its report.
            let result = if reply.is_some() {
                engine.drain_waiting().await
            } else {
                engine.drain().await
            };
            if let Err(e) = &result {
                error!(error = %e, "drain failed");
            }
            if let Some(reply) = reply {
                let _ = reply.send(result);
            }
        });
    }

    /// Records the meal, then schedules a cycle for when its walk window
    /// has closed and the verdict is final.
    fn spawn_meal(&mut self, at: DateTime<Utc>, reply: oneshot::Sender<Result<bool>>) {
        let engine = Arc::clone(&self.engine);
        let commands = self.self_tx.clone();
        let cancel = self.cancel.clone();
        self.tasks.spawn(async move {
            let recorded = engine.record_meal(at).await;
            let is_new = matches!(recorded, Ok(true));
            let _ = reply.send(recorded);
            if !is_new {
                return;
            }

            let wait = (walk::window_end(at) - engine.clock().now())
                .to_std()
                .unwrap_or(Duration::ZERO)
                + MEAL_FOLLOW_UP_SLACK;
            debug!(%at, wait_secs = wait.as_secs(), "post-meal cycle scheduled");
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(wait) => {
                    let _ = commands
                        .send(Command::Sync { trigger: Trigger::MealLogged, reply: None })
                        .await;
                }
            }
        });
    }
}

async fn next_change(changes: &mut Option<mpsc::Receiver<()>>) -> Option<()> {
    match changes {
        Some(rx) => match rx.recv().await {
            Some(()) => Some(()),
            None => {
                warn!("health data observer closed");
                *changes = None;
                None
            }
        },
        None => std::future::pending().await,
    }
}

impl OrchestratorHandle {
    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    /// Queues a cycle without waiting for it.
    pub async fn trigger(&self, trigger: Trigger) -> Result<()> {
        self.send(Command::Sync {
            trigger,
            reply: None,
        })
        .await
    }

    /// Runs a cycle and waits for its report.
    pub async fn sync_now(&self, trigger: Trigger) -> Result<CycleReport> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Sync {
            trigger,
            reply: Some(tx),
        })
        .await?;
        rx.await.map_err(|_| SyncError::EngineStopped)
    }

    /// Handles an OS background wake, always answering within the budget.
    pub async fn background_wake(&self) -> WakeResult {
        match tokio::time::timeout(self.wake_budget, self.sync_now(Trigger::BackgroundWake)).await
        {
            Ok(Ok(report)) => {
                let result = WakeResult::from_report(&report);
                info!(?result, "background wake finished");
                result
            }
            Ok(Err(e)) => {
                warn!(error = %e, "background wake failed");
                WakeResult::Failed
            }
            Err(_) => {
                warn!(
                    budget_secs = self.wake_budget.as_secs(),
                    "background wake ran out of time"
                );
                WakeResult::Failed
            }
        }
    }

    /// Drains the offline queue and waits for the result.
    pub async fn drain(&self) -> Result<DrainReport> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Drain { reply: Some(tx) }).await?;
        rx.await.map_err(|_| SyncError::EngineStopped)?
    }

    /// Records a meal. Returns false if a later meal was already known.
    pub async fn meal_logged(&self, at: DateTime<Utc>) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::MealLogged { at, reply: tx }).await?;
        rx.await.map_err(|_| SyncError::EngineStopped)?
    }

    pub fn pending_count(&self) -> usize {
        self.engine.pending_count()
    }

    /// Watches the number of events waiting to sync.
    pub fn subscribe_pending(&self) -> watch::Receiver<usize> {
        self.engine.events().subscribe()
    }

    /// Report of the most recently finished cycle.
    pub fn last_report(&self) -> Option<CycleReport> {
        self.reports.borrow().clone()
    }

    /// Asks the actor to stop after in-flight work finishes.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SyncError::EngineStopped)
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
