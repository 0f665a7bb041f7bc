//! Fixed-offset timezone arithmetic.
//!
//! Each user carries one signed whole-hour offset from UTC. Conversion is
//! plain arithmetic on purpose: the contract promises offset math, not an
//! IANA zone database, so DST transitions cannot be represented here.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_OFFSET_HOURS: i32 = -12;
pub const MAX_OFFSET_HOURS: i32 = 14;

/// Offset applied when a user has not set one.
pub const DEFAULT_OFFSET_HOURS: i32 = 3;

/// Wall-clock format collected from users: "2026-02-20 23:59".
const LOCAL_DEADLINE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OffsetError {
    #[error("utc offset must be within [{MIN_OFFSET_HOURS}, {MAX_OFFSET_HOURS}] hours, got {0}")]
    OutOfRange(i32),
}

/// Validated whole-hour offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct UtcOffset(i32);

impl UtcOffset {
    /// Range check is boundary-inclusive: -12 and +14 are both valid.
    pub fn new(hours: i32) -> Result<Self, OffsetError> {
        if (MIN_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(&hours) {
            Ok(UtcOffset(hours))
        } else {
            Err(OffsetError::OutOfRange(hours))
        }
    }

    pub fn hours(&self) -> i32 {
        self.0
    }

    /// Interpret a reading of the user's wall clock as a UTC instant.
    pub fn local_to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        (local - Duration::hours(self.0 as i64)).and_utc()
    }

    /// Shift a UTC instant onto the user's wall clock.
    pub fn utc_to_local(&self, utc: DateTime<Utc>) -> NaiveDateTime {
        (utc + Duration::hours(self.0 as i64)).naive_utc()
    }
}

impl Default for UtcOffset {
    fn default() -> Self {
        UtcOffset(DEFAULT_OFFSET_HOURS)
    }
}

impl TryFrom<i32> for UtcOffset {
    type Error = OffsetError;

    fn try_from(hours: i32) -> Result<Self, Self::Error> {
        UtcOffset::new(hours)
    }
}

impl From<UtcOffset> for i32 {
    fn from(offset: UtcOffset) -> i32 {
        offset.0
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 0 {
            write!(f, "UTC+{}", self.0)
        } else {
            write!(f, "UTC{}", self.0)
        }
    }
}

/// Parse a deadline like "2026-02-20 23:59" as entered on the user's wall
/// clock. Pair with [`UtcOffset::local_to_utc`] before storing.
pub fn parse_local_deadline(input: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(input.trim(), LOCAL_DEADLINE_FORMAT)
}
