// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local calendar time.
//!
//! "Today" and the midnight trigger use the offset in effect at the instant
//! being converted, so a daylight saving change moves them with the wall
//! clock instead of leaving them an hour off until restart.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

/// Zone that defines the local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalZone {
    /// The system time zone, consulted on every conversion.
    System,
    /// An offset that never changes.
    Fixed(FixedOffset),
}

impl LocalZone {
    pub fn utc() -> Self {
        LocalZone::Fixed(Utc.fix())
    }

    /// Local calendar date at `at`.
    pub fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        match self {
            LocalZone::System => local_date(at, &Local),
            LocalZone::Fixed(offset) => local_date(at, offset),
        }
    }

    /// First instant of `date`.
    pub fn midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        match self {
            LocalZone::System => local_midnight(date, &Local),
            LocalZone::Fixed(offset) => local_midnight(date, offset),
        }
    }
}

pub fn local_date<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

/// UTC instant of 00:00 on `date` in `tz`.
///
/// When a clock change skips midnight, the day starts at the first local
/// time that exists. An ambiguous midnight resolves to the earlier instant.
pub fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let local = date.and_time(NaiveTime::MIN);
    if let Some(start) = tz.from_local_datetime(&local).earliest() {
        return start.with_timezone(&Utc);
    }
    // Skipped: the jump happened exactly at the old offset's midnight.
    let before = tz.offset_from_utc_datetime(&(local - Duration::days(1))).fix();
    let utc = local - Duration::seconds(i64::from(before.local_minus_utc()));
    Utc.from_utc_datetime(&utc)
}

#[cfg(test)]
#[path = "zone_tests.rs"]
mod tests;
