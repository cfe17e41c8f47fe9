//! Instants on the UTC time scale.
//!
//! A `UtcInstant` is a Modified Julian Day number plus a
//! nanosecond-of-day. The upper bound of the nanosecond-of-day depends
//! on the day: a day carrying an inserted leap second is 86401 seconds
//! long, so `23:59:60` exists on it and nowhere else. Every operation
//! that moves an instant between days re-checks against the length of
//! the day it lands on.

use std::str::FromStr;
use std::time::Duration;

use crate::table::LeapSecondTable;
use crate::tai::TaiInstant;
use crate::{iso, Error, Result, NANOS_PER_DAY, NANOS_PER_SEC, SECS_PER_DAY};

#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct UtcInstant {
    mjd: i64,
    nano_of_day: i64,
}

impl UtcInstant {
    // the caller guarantees validity against its conversion table
    pub(crate) fn new_unchecked(mjd: i64, nano_of_day: i64) -> UtcInstant {
        debug_assert!(nano_of_day >= 0);
        UtcInstant { mjd, nano_of_day }
    }

    /// Builds an instant on day `mjd`, validating the nanosecond-of-day
    /// against that day's length in the shared leap-second table.
    pub fn of_modified_julian_day(mjd: i64, nano_of_day: i64) -> Result<UtcInstant> {
        let max = LeapSecondTable::shared().nanos_in_day(mjd);
        if !(0..max).contains(&nano_of_day) {
            return Err(Error::OutOfRange {
                what: "nano-of-day",
                value: nano_of_day,
                min: 0,
                max: max - 1,
            });
        }
        Ok(UtcInstant { mjd, nano_of_day })
    }

    pub fn modified_julian_day(&self) -> i64 {
        self.mjd
    }

    pub fn nano_of_day(&self) -> i64 {
        self.nano_of_day
    }

    /// Moves to another day keeping the nanosecond-of-day, which must
    /// be valid there too: a leap-second instant can move to another
    /// leap day but not to a 86400-second day.
    pub fn with_modified_julian_day(&self, mjd: i64) -> Result<UtcInstant> {
        UtcInstant::of_modified_julian_day(mjd, self.nano_of_day)
    }

    pub fn with_nano_of_day(&self, nano_of_day: i64) -> Result<UtcInstant> {
        UtcInstant::of_modified_julian_day(self.mjd, nano_of_day)
    }

    pub fn plus(&self, duration: Duration) -> Result<UtcInstant> {
        Self::at_position(self.position() + duration_nanos(duration))
    }

    pub fn minus(&self, duration: Duration) -> Result<UtcInstant> {
        Self::at_position(self.position() - duration_nanos(duration))
    }

    /// Nanoseconds on a contiguous scale that counts every second a
    /// day actually had: day number times 86400, plus one second per
    /// leap second inserted on an earlier day, plus the
    /// nanosecond-of-day. Strictly monotone and gap-free over valid
    /// instants, which makes duration arithmetic a plain addition here.
    fn position(&self) -> i128 {
        let table = LeapSecondTable::shared();
        self.mjd as i128 * NANOS_PER_DAY as i128
            + table.leaps_before(self.mjd) as i128 * NANOS_PER_SEC as i128
            + self.nano_of_day as i128
    }

    /// Inverse of [`position`](Self::position). The first estimate
    /// ignores leap seconds and may land a day off, so step by single
    /// days consulting each day's actual length; a fixed modulus would
    /// misplace instants around leap days.
    fn at_position(position: i128) -> Result<UtcInstant> {
        let table = LeapSecondTable::shared();
        let day = NANOS_PER_DAY as i128;
        let mut d = position.div_euclid(day);
        loop {
            let mjd = i64::try_from(d).map_err(|_| Error::Overflow("modified julian day"))?;
            let start = d * day + table.leaps_before(mjd) as i128 * NANOS_PER_SEC as i128;
            let nod = position - start;
            if nod < 0 {
                d -= 1;
            } else if nod >= table.nanos_in_day(mjd) as i128 {
                d += 1;
            } else {
                return Ok(UtcInstant { mjd, nano_of_day: nod as i64 });
            }
        }
    }

    pub fn is_before(&self, other: &UtcInstant) -> bool {
        self < other
    }

    pub fn is_after(&self, other: &UtcInstant) -> bool {
        self > other
    }

    /// Whether this instant is within an inserted leap second.
    pub fn is_leap_second(&self) -> bool {
        self.nano_of_day >= SECS_PER_DAY * NANOS_PER_SEC
    }

    /// The same physical instant on the TAI scale, resolved by the
    /// shared leap-second table.
    pub fn to_tai(&self) -> Result<TaiInstant> {
        TaiInstant::try_from(*self)
    }
}

fn duration_nanos(duration: Duration) -> i128 {
    duration.as_secs() as i128 * NANOS_PER_SEC as i128 + duration.subsec_nanos() as i128
}

impl std::fmt::Display for UtcInstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&iso::format(self))
    }
}

impl FromStr for UtcInstant {
    type Err = Error;
    fn from_str(s: &str) -> Result<UtcInstant> {
        iso::parse(s)
    }
}
