// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync engine tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Utc,
};
use secrecy::SecretString;
use tokio::sync::mpsc;
use vital_core::WorkoutKind;

use crate::health::{
    AuthorizationStatus, HealthStore, HealthStoreError, QuantityKind, SleepSample, SleepStage,
    WorkoutSample,
};
use crate::http::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::signing::RequestSigner;
use crate::BoxFuture;

/// 2026-06-10 at `hour:minute` UTC.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 10, hour, minute, 0).unwrap()
}

/// A zone with a single offset change, like a daylight saving switch.
#[derive(Debug, Clone, Copy)]
pub struct ShiftingZone {
    pub switch_at: DateTime<Utc>,
    pub before: FixedOffset,
    pub after: FixedOffset,
}

impl ShiftingZone {
    /// Central European spring forward: 02:00 +01:00 becomes 03:00 +02:00.
    pub fn spring_2026() -> Self {
        ShiftingZone {
            switch_at: Utc.with_ymd_and_hms(2026, 3, 29, 1, 0, 0).unwrap(),
            before: FixedOffset::east_opt(3600).unwrap(),
            after: FixedOffset::east_opt(2 * 3600).unwrap(),
        }
    }

    fn offset_for_utc(&self, at: DateTime<Utc>) -> FixedOffset {
        if at < self.switch_at {
            self.before
        } else {
            self.after
        }
    }
}

impl TimeZone for ShiftingZone {
    type Offset = FixedOffset;

    fn from_offset(offset: &FixedOffset) -> Self {
        ShiftingZone {
            switch_at: Utc.with_ymd_and_hms(9999, 1, 1, 0, 0, 0).unwrap(),
            before: *offset,
            after: *offset,
        }
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
        self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
        let as_before =
            (*local - Duration::seconds(i64::from(self.before.local_minus_utc()))).and_utc();
        let as_after =
            (*local - Duration::seconds(i64::from(self.after.local_minus_utc()))).and_utc();
        match (as_before < self.switch_at, as_after >= self.switch_at) {
            (true, true) => LocalResult::Ambiguous(self.before, self.after),
            (true, false) => LocalResult::Single(self.before),
            (false, true) => LocalResult::Single(self.after),
            (false, false) => LocalResult::None,
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
        self.offset_for_utc(utc.and_time(NaiveTime::MIN).and_utc())
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
        self.offset_for_utc(utc.and_utc())
    }
}

pub fn signer() -> RequestSigner {
    RequestSigner::new(&SecretString::from("test-secret".to_string())).unwrap()
}

pub fn ok() -> Result<HttpResponse, HttpError> {
    status(200)
}

pub fn status(code: u16) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse {
        status: code,
        body: Vec::new(),
    })
}

pub fn json(code: u16, body: &str) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse {
        status: code,
        body: body.as_bytes().to_vec(),
    })
}

pub fn offline() -> Result<HttpResponse, HttpError> {
    Err(HttpError::Connect("network is unreachable".into()))
}

type Handler = Box<dyn FnMut(&HttpRequest) -> Result<HttpResponse, HttpError> + Send>;

/// Scripted [`HttpClient`] that records every request.
#[derive(Clone)]
pub struct MockHttp {
    handler: Arc<Mutex<Handler>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockHttp {
    /// Answers every request with `handler`.
    pub fn new(
        handler: impl FnMut(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + 'static,
    ) -> Self {
        MockHttp {
            handler: Arc::new(Mutex::new(Box::new(handler))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answers requests with `responses` in order, then with 200.
    pub fn scripted(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        let mut queue: VecDeque<_> = responses.into();
        Self::new(move |_| queue.pop_front().unwrap_or_else(ok))
    }

    /// Replaces the handler.
    pub fn respond_with(
        &self,
        handler: impl FnMut(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + 'static,
    ) {
        *self.handler.lock().unwrap() = Box::new(handler);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// URL paths of recorded requests, without the base URL.
    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| {
                r.url
                    .split_once("://")
                    .and_then(|(_, rest)| rest.split_once('/'))
                    .map(|(_, path)| path.to_string())
                    .unwrap_or_default()
            })
            .collect()
    }
}

impl HttpClient for MockHttp {
    fn execute(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, HttpError>> {
        let response = (self.handler.lock().unwrap())(&request);
        self.requests.lock().unwrap().push(request);
        Box::pin(async move { response })
    }
}

/// In-memory [`HealthStore`] with adjustable contents.
pub struct MockHealth {
    pub authorization: Mutex<AuthorizationStatus>,
    /// (start, value) step samples.
    pub steps: Mutex<Vec<(DateTime<Utc>, f64)>>,
    pub resting_hr: Mutex<Option<f64>>,
    pub hrv: Mutex<Option<f64>>,
    pub sleep: Mutex<Vec<SleepSample>>,
    pub workouts: Mutex<Vec<WorkoutSample>>,
    /// Number of upcoming queries that fail with a transient error.
    pub failures: AtomicUsize,
    pub queries: AtomicUsize,
    pub auth_checks: AtomicUsize,
    changes: Mutex<Option<mpsc::Receiver<()>>>,
    change_tx: mpsc::Sender<()>,
}

impl MockHealth {
    pub fn new() -> Self {
        let (change_tx, rx) = mpsc::channel(8);
        MockHealth {
            authorization: Mutex::new(AuthorizationStatus::Authorized),
            steps: Mutex::new(Vec::new()),
            resting_hr: Mutex::new(None),
            hrv: Mutex::new(None),
            sleep: Mutex::new(Vec::new()),
            workouts: Mutex::new(Vec::new()),
            failures: AtomicUsize::new(0),
            queries: AtomicUsize::new(0),
            auth_checks: AtomicUsize::new(0),
            changes: Mutex::new(Some(rx)),
            change_tx,
        }
    }

    pub fn add_steps(&self, at: DateTime<Utc>, count: f64) {
        self.steps.lock().unwrap().push((at, count));
    }

    pub fn add_sleep(&self, start: DateTime<Utc>, minutes: i64, stage: SleepStage) {
        self.sleep.lock().unwrap().push(SleepSample {
            start,
            end: start + Duration::minutes(minutes),
            stage,
        });
    }

    pub fn add_workout(&self, kind: WorkoutKind, start: DateTime<Utc>, minutes: i64) {
        self.workouts.lock().unwrap().push(WorkoutSample {
            kind,
            start,
            end: start + Duration::minutes(minutes),
            calories: Some(minutes as f64 * 5.0),
        });
    }

    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Simulates the platform reporting new samples.
    pub fn notify_change(&self) {
        let _ = self.change_tx.try_send(());
    }

    fn begin_query(&self) -> Result<(), HealthStoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(HealthStoreError::Query("store busy".into()));
        }
        Ok(())
    }
}

impl HealthStore for MockHealth {
    fn authorization(&self) -> BoxFuture<'_, Result<AuthorizationStatus, HealthStoreError>> {
        self.auth_checks.fetch_add(1, Ordering::SeqCst);
        let status = *self.authorization.lock().unwrap();
        Box::pin(async move { Ok(status) })
    }

    fn cumulative_sum(
        &self,
        kind: QuantityKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Result<f64, HealthStoreError>> {
        let result = self.begin_query().map(|()| match kind {
            QuantityKind::StepCount => self
                .steps
                .lock()
                .unwrap()
                .iter()
                .filter(|(t, _)| *t >= start && *t < end)
                .map(|(_, v)| v)
                .sum(),
            _ => 0.0,
        });
        Box::pin(async move { result })
    }

    fn discrete_average(
        &self,
        kind: QuantityKind,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> BoxFuture<'_, Result<Option<f64>, HealthStoreError>> {
        let result = self.begin_query().map(|()| match kind {
            QuantityKind::RestingHeartRate => *self.resting_hr.lock().unwrap(),
            QuantityKind::HeartRateVariability => *self.hrv.lock().unwrap(),
            QuantityKind::StepCount => None,
        });
        Box::pin(async move { result })
    }

    fn sleep_samples<'a>(
        &'a self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        stages: &'a [SleepStage],
    ) -> BoxFuture<'a, Result<Vec<SleepSample>, HealthStoreError>> {
        let result = self.begin_query().map(|()| {
            self.sleep
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.start >= start && s.start < end && stages.contains(&s.stage))
                .cloned()
                .collect()
        });
        Box::pin(async move { result })
    }

    fn recent_workouts(
        &self,
        since: DateTime<Utc>,
        limit: Option<usize>,
    ) -> BoxFuture<'_, Result<Vec<WorkoutSample>, HealthStoreError>> {
        let result = self.begin_query().map(|()| {
            let mut workouts: Vec<WorkoutSample> = self
                .workouts
                .lock()
                .unwrap()
                .iter()
                .filter(|w| w.start >= since)
                .cloned()
                .collect();
            workouts.sort_by(|a, b| b.end.cmp(&a.end));
            if let Some(limit) = limit {
                workouts.truncate(limit);
            }
            workouts
        });
        Box::pin(async move { result })
    }

    fn subscribe_changes(&self) -> Option<mpsc::Receiver<()>> {
        self.changes.lock().unwrap().take()
    }
}
