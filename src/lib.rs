//! Leap-second-aware instants on the TAI and UTC time scales.
//!
//! A [`TaiInstant`] is a continuous count of SI seconds from
//! 1958-01-01T00:00:00 (TAI). A [`UtcInstant`] is a civil day number
//! (Modified Julian Day) plus a nanosecond-of-day, where a day is 86400
//! seconds long unless a leap second was inserted on it. The
//! [`LeapSecondTable`] records when that happened and relates the two
//! scales exactly.

pub mod convert;
pub mod date;
pub mod iso;
pub mod nist;
pub mod table;
pub mod tai;
pub mod utc;

pub use crate::table::{Drift, LeapRule, LeapSecondTable, TableError};
pub use crate::tai::TaiInstant;
pub use crate::utc::UtcInstant;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong in this crate, by kind: range
/// validation, text parsing, checked arithmetic, and leap-second table
/// construction. Table errors are fatal at startup; the rest are normal
/// control flow for callers feeding us input.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{what} out of range: {value} not in {min}..={max}")]
    OutOfRange { what: &'static str, value: i64, min: i64, max: i64 },
    #[error("parse error: expected {expected}, got {input:?}")]
    Parse { expected: &'static str, input: String },
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
    #[error("invalid leap second table: {0}")]
    Table(#[from] TableError),
}

pub(crate) const NANOS_PER_SEC: i64 = 1_000_000_000;
pub(crate) const SECS_PER_DAY: i64 = 86_400;
pub(crate) const NANOS_PER_DAY: i64 = SECS_PER_DAY * NANOS_PER_SEC;
