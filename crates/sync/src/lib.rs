// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! vital-sync: acquisition, delivery and offline buffering of health records.
//!
//! # Architecture
//!
//! ```text
//!  triggers ──► ┌──────────────┐   gate   ┌─────────────┐
//!               │ Orchestrator │ ───────► │ RateLimiter │
//!               └──────┬───────┘          └─────────────┘
//!                      │ cycle
//!                      ▼
//!               ┌──────────────┐  records ┌─────────────────┐
//!               │   Acquirer   │ ───────► │ SignedTransport │ ──► remote API
//!               └──────────────┘          └────────┬────────┘
//!                                    failure       │      ▲ drain
//!                                                  ▼      │
//!                                          ┌───────────────┴┐
//!                                          │   EventStore   │ (pending-events.json)
//!                                          └────────────────┘
//! ```
//!
//! Nothing that fails to deliver is lost: it lands in the [`EventStore`]
//! and is retried, in order, whenever a session is (re)established or a
//! drain is requested.

use std::future::Future;
use std::pin::Pin;

pub mod acquirer;
pub mod config;
pub mod dead_letter;
pub mod engine;
pub mod error;
pub mod event_store;
pub mod health;
pub mod http;
pub mod meal;
pub mod orchestrator;
pub mod rate_limiter;
pub mod readings;
pub mod schedule;
pub mod session_store;
pub mod signing;
pub mod transport;
pub mod zone;

pub use acquirer::{Acquirer, Acquisition};
pub use config::{ClientErrorPolicy, SyncConfig};
pub use dead_letter::{DeadLetter, DeadLetterLog};
pub use engine::{
    CycleOutcome, CycleReport, DeliveryCounts, DrainReport, DrainStatus, EngineDeps, EngineStatus,
    SyncEngine, Trigger,
};
pub use error::{Result, SyncError};
pub use event_store::EventStore;
pub use health::{
    AuthorizationStatus, HealthStore, HealthStoreError, QuantityKind, SleepSample, SleepStage,
    WorkoutSample,
};
pub use http::{HttpClient, HttpError, HttpRequest, HttpResponse, Method, ReqwestClient};
pub use meal::MealLog;
pub use orchestrator::{Orchestrator, OrchestratorHandle, WakeResult};
pub use rate_limiter::RateLimiter;
pub use readings::{LastReading, ReadingCache};
pub use schedule::{next_midnight, Scheduler};
pub use session_store::{SessionChange, SessionStore};
pub use signing::RequestSigner;
pub use transport::{Delivery, SignedTransport};
pub use zone::LocalZone;

/// Boxed future returned by the object-safe async traits in this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[cfg(test)]
mod test_helpers;
