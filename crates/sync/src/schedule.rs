// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Time-based triggers: a fixed sync interval and local midnight.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vital_core::ClockSource;

use crate::engine::Trigger;
use crate::orchestrator::OrchestratorHandle;
use crate::zone::{local_date, local_midnight, LocalZone};

/// Seconds past local midnight at which the day-rollover cycle runs.
pub const MIDNIGHT_DELAY_SECS: i64 = 5;

/// First local `00:00:05` in `tz` strictly after `now`.
pub fn next_midnight<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let delay = chrono::Duration::seconds(MIDNIGHT_DELAY_SECS);
    let today = local_date(now, tz);
    let candidate = local_midnight(today, tz) + delay;
    if candidate > now {
        return candidate;
    }
    match today.succ_opt() {
        Some(tomorrow) => local_midnight(tomorrow, tz) + delay,
        None => candidate + chrono::Duration::days(1),
    }
}

fn next_midnight_in(zone: LocalZone, now: DateTime<Utc>) -> DateTime<Utc> {
    match zone {
        LocalZone::System => next_midnight(now, &Local),
        LocalZone::Fixed(offset) => next_midnight(now, &offset),
    }
}

pub struct Scheduler {
    handle: OrchestratorHandle,
    clock: Arc<dyn ClockSource>,
    zone: LocalZone,
    interval: Option<Duration>,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(handle: OrchestratorHandle, cancel: CancellationToken) -> Self {
        let config = handle.engine().config();
        Scheduler {
            clock: Arc::clone(handle.engine().clock()),
            zone: config.local_zone,
            interval: config.sync_interval,
            handle,
            cancel,
        }
    }

    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        info!(
            interval_secs = self.interval.map(|d| d.as_secs()),
            "scheduler started"
        );
        let mut periodic = self.interval.map(|every| {
            let mut interval = tokio::time::interval_at(Instant::now() + every, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            // Recomputed every time so a daylight saving change is picked up.
            let now = self.clock.now();
            let midnight = next_midnight_in(self.zone, now);
            let until_midnight = (midnight - now).to_std().unwrap_or(Duration::ZERO);
            debug!(%midnight, "next midnight cycle");

            let trigger = tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tick(&mut periodic) => Trigger::Periodic,
                _ = tokio::time::sleep(until_midnight) => Trigger::Midnight,
            };
            if let Err(e) = self.handle.trigger(trigger).await {
                warn!(error = %e, %trigger, "orchestrator gone, scheduler stopping");
                break;
            }
        }
        info!("scheduler stopped");
    }
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
