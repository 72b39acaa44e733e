// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Turns raw health-store samples into today's records.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use vital_core::walk::{self, PostMealWalk, WalkEvidence};
use vital_core::{ClockSource, DailyHealthSummary, ExerciseRecord, VitalsRecord, WorkoutKind};

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::health::{
    AuthorizationStatus, HealthStore, HealthStoreError, QuantityKind, SleepStage, WorkoutSample,
};
use crate::zone::LocalZone;
use crate::BoxFuture;

/// Everything one cycle delivers.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    pub summary: DailyHealthSummary,
    pub vitals: VitalsRecord,
    /// Built from the most recent workout, if there was one.
    pub exercise: Option<ExerciseRecord>,
    pub post_meal_walk: PostMealWalk,
}

pub struct Acquirer {
    store: Arc<dyn HealthStore>,
    clock: Arc<dyn ClockSource>,
    retries: u32,
    lookback: Duration,
    zone: LocalZone,
    denied: AtomicBool,
}

impl Acquirer {
    pub fn new(
        config: &SyncConfig,
        store: Arc<dyn HealthStore>,
        clock: Arc<dyn ClockSource>,
    ) -> Self {
        Acquirer {
            store,
            clock,
            retries: config.acquisition_retries,
            lookback: Duration::from_std(config.workout_lookback).unwrap_or(Duration::days(1)),
            zone: config.local_zone,
            denied: AtomicBool::new(false),
        }
    }

    /// The health store the acquirer reads from.
    pub fn store(&self) -> &Arc<dyn HealthStore> {
        &self.store
    }

    /// True once authorization was found missing; cleared by
    /// [`Acquirer::reset_authorization`].
    pub fn is_denied(&self) -> bool {
        self.denied.load(Ordering::SeqCst)
    }

    /// Forgets a previous denial so the next cycle asks the store again.
    pub fn reset_authorization(&self) {
        if self.denied.swap(false, Ordering::SeqCst) {
            info!("health authorization will be re-checked");
        }
    }

    /// Reads today's data, from local midnight up to now.
    ///
    /// `meal_time` is the most recent logged meal, used for the post-meal
    /// walk flag on the exercise record.
    pub async fn acquire_today(&self, meal_time: Option<DateTime<Utc>>) -> Result<Acquisition> {
        self.ensure_authorized().await?;

        let now = self.clock.now();
        let date = self.zone.date_of(now);
        let day_start = self.zone.midnight(date);
        debug!(%date, %day_start, %now, "acquiring health data");

        let steps = self
            .with_retries("steps", move || {
                self.store
                    .cumulative_sum(QuantityKind::StepCount, day_start, now)
            })
            .await?;
        let resting_hr = self
            .with_retries("resting heart rate", move || {
                self.store
                    .discrete_average(QuantityKind::RestingHeartRate, day_start, now)
            })
            .await?;
        let hrv = self
            .with_retries("heart-rate variability", move || {
                self.store
                    .discrete_average(QuantityKind::HeartRateVariability, day_start, now)
            })
            .await?;
        let sleep = self
            .with_retries("sleep", move || {
                self.store.sleep_samples(day_start, now, &SleepStage::ASLEEP)
            })
            .await?;
        let workouts = self
            .with_retries("workouts", move || {
                self.store.recent_workouts(now - self.lookback, None)
            })
            .await?;

        let sleep_hours: f64 = sleep
            .iter()
            .filter(|s| s.stage.is_asleep())
            .map(|s| s.hours())
            .sum();
        let vitals = VitalsRecord::new(
            to_count(steps),
            resting_hr,
            hrv,
            sleep_hours,
            now,
            now,
        )
        .map_err(|e| SyncError::AcquisitionFailed {
            attempts: 1,
            reason: e.to_string(),
        })?;

        let post_meal_walk = self.walk_verdict(meal_time, now).await?;

        let exercises: Vec<ExerciseRecord> = workouts
            .iter()
            .enumerate()
            .filter_map(|(i, w)| exercise_record(w, i == 0 && post_meal_walk.is_detected(), now))
            .collect();
        let exercise = exercises.first().cloned();
        let summary = DailyHealthSummary::new(date, &vitals, exercises);

        info!(
            steps = vitals.steps(),
            sleep_hours = format!("{:.2}", vitals.sleep_hours()),
            workouts = summary.exercises().len(),
            post_meal_walk = %post_meal_walk,
            "acquired health data"
        );
        Ok(Acquisition {
            summary,
            vitals,
            exercise,
            post_meal_walk,
        })
    }

    /// Evaluates the post-meal walk heuristic for a meal at `meal_time`.
    pub async fn detect_post_meal_walk(
        &self,
        meal_time: Option<DateTime<Utc>>,
    ) -> Result<PostMealWalk> {
        if meal_time.is_none() {
            return Ok(PostMealWalk::NotDetected);
        }
        self.ensure_authorized().await?;
        self.walk_verdict(meal_time, self.clock.now()).await
    }

    async fn walk_verdict(
        &self,
        meal_time: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<PostMealWalk> {
        let Some(meal) = meal_time else {
            return Ok(PostMealWalk::NotDetected);
        };
        if meal > now {
            return Ok(PostMealWalk::Pending);
        }

        let workouts = self
            .with_retries("workouts", move || self.store.recent_workouts(meal, None))
            .await?;
        let walked = workouts.iter().any(|w| {
            w.kind == WorkoutKind::Walking && walk::in_window(meal, w.start) && w.start <= now
        });
        if walked {
            debug!(%meal, "walking workout found after meal");
            return Ok(PostMealWalk::Detected);
        }

        let baseline_steps = self
            .with_retries("baseline steps", move || {
                self.store
                    .cumulative_sum(QuantityKind::StepCount, walk::baseline_start(meal), meal)
            })
            .await?;
        let window_end = walk::window_end(meal).min(now);
        let window_steps = self
            .with_retries("post-meal steps", move || {
                self.store
                    .cumulative_sum(QuantityKind::StepCount, meal, window_end)
            })
            .await?;

        let evidence = WalkEvidence {
            walk_started_in_window: false,
            baseline_steps,
            window_steps,
        };
        let verdict = evidence.verdict(walk::window_complete(meal, now));
        debug!(%meal, baseline_steps, window_steps, %verdict, "post-meal walk evaluated");
        Ok(verdict)
    }

    async fn ensure_authorized(&self) -> Result<()> {
        if self.is_denied() {
            return Err(SyncError::AcquisitionUnavailable(
                "authorization previously denied".to_string(),
            ));
        }
        let status = self
            .with_retries("authorization", move || self.store.authorization())
            .await?;
        match status {
            AuthorizationStatus::Authorized => Ok(()),
            other => {
                self.denied.store(true, Ordering::SeqCst);
                warn!(status = ?other, "health data not authorized");
                Err(SyncError::AcquisitionUnavailable(format!(
                    "authorization status is {other:?}"
                )))
            }
        }
    }

    /// Runs `query`, repeating it on transient failures.
    async fn with_retries<'a, T>(
        &'a self,
        what: &'static str,
        mut query: impl FnMut() -> BoxFuture<'a, std::result::Result<T, HealthStoreError>>,
    ) -> Result<T> {
        let attempts = self.retries + 1;
        let mut last_error = String::new();
        for attempt in 1..=attempts {
            match query().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    debug!(what, attempt, error = %e, "health query failed");
                    last_error = e.to_string();
                }
                Err(e) => {
                    self.denied.store(true, Ordering::SeqCst);
                    warn!(what, error = %e, "health data unavailable");
                    return Err(SyncError::AcquisitionUnavailable(e.to_string()));
                }
            }
        }
        warn!(what, attempts, error = %last_error, "health query gave up");
        Err(SyncError::AcquisitionFailed {
            attempts,
            reason: format!("{what}: {last_error}"),
        })
    }
}

fn to_count(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

fn exercise_record(
    workout: &WorkoutSample,
    is_post_meal_walk: bool,
    now: DateTime<Utc>,
) -> Option<ExerciseRecord> {
    let calories = workout.calories.filter(|c| c.is_finite() && *c >= 0.0);
    match ExerciseRecord::new(
        workout.kind,
        workout.duration_minutes(),
        calories,
        workout.start,
        is_post_meal_walk,
        now,
    ) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(start = %workout.start, error = %e, "skipping workout");
            None
        }
    }
}

#[cfg(test)]
#[path = "acquirer_tests.rs"]
mod tests;
