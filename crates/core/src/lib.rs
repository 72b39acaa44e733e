// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! vital-core: Shared data model for the vitalsync engine.
//!
//! This crate provides the health records, wire payloads, offline events,
//! session credentials, and durable file primitives used by both the
//! `vital-sync` engine and the `vitald` binary.

pub mod atomic;
pub mod clock;
pub mod error;
pub mod event;
pub mod jsonl;
pub mod record;
pub mod session;
pub mod summary;
pub mod walk;

pub use clock::{ClockSource, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use event::{EventId, OfflineEvent};
pub use record::{ExerciseRecord, VitalsRecord, WorkoutKind};
pub use session::Session;
pub use summary::DailyHealthSummary;
pub use walk::{PostMealWalk, WalkEvidence};
