//! The leap-second rule table.
//!
//! A table is an ordered list of [`LeapRule`]s. Each rule names the
//! first civil day (MJD) its TAI-UTC offset applies to, so the offset
//! step between one rule and the next accounts for the leap seconds
//! inserted on the civil day immediately before the later rule takes
//! effect. The first rule may carry a [`Drift`] describing the pre-1972
//! linear TAI-UTC relationship.
//!
//! A table is validated once when built and never mutated afterwards,
//! so the process-wide shared table can be read from any thread without
//! locking.

use std::sync::OnceLock;

use thiserror::Error;

use crate::date::Gregorian;
use crate::nist::Hash;
use crate::{NANOS_PER_SEC, SECS_PER_DAY};

/// Pre-1972 linear drift: the fractional part of the TAI-UTC offset
/// grows by `coefficient` seconds per day from `reference_day`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Drift {
    pub reference_day: i64,
    pub coefficient: f64,
}

/// One entry of the table: from civil day `effective_day` onwards the
/// TAI-UTC offset is `offset` whole seconds (plus drift, if any).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LeapRule {
    pub effective_day: i64,
    pub offset: i64,
    pub drift: Option<Drift>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LeapSecondTable {
    rules: Vec<LeapRule>,
}

/// Construction-time diagnoses. Any of these is fatal: a process with a
/// bad table must not perform time-scale operations.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("leap second table is empty")]
    Empty,
    #[error("rules are disordered (mjd {0} then mjd {1})")]
    OutOfOrder(i64, i64),
    #[error("offset decreases at mjd {0} ({1} -> {2})")]
    OffsetDecrease(i64, i64, i64),
    #[error("drift on a rule that is not the first (mjd {0})")]
    MisplacedDrift(i64),
    #[error("drift coefficient is not finite and non-negative ({0})")]
    BadDrift(f64),
    #[error("a drift rule needs a fixed-offset rule after it")]
    DriftAlone,
    #[error("a shared table is already installed")]
    AlreadyInstalled,
    #[error("incorrect starting point (mjd {0} DTAI {1})")]
    FalseStart(i64, i64),
    #[error("offset step is not +-1 at mjd {0} ({1} -> {2})")]
    WrongStep(i64, i64, i64),
    #[error("timestamp is not midnight (NTP {0})")]
    Midnight(i64),
    #[error("timestamp and date do not match ({0} <> {1})")]
    TimeDate(Gregorian, Gregorian),
    #[error("list expired on {0}")]
    Expired(Gregorian),
    #[error("checksum failed {0} <> {1}")]
    Checksum(Hash, Hash),
}

/// Built-in rules: the IERS leap seconds from 1972 through 2017, and
/// one drift rule standing in for the 1961-1971 rubber-second era.
const BUILTIN: &[LeapRule] = &[
    rule(37300, 1, Some(Drift { reference_day: 37300, coefficient: 0.001296 })),
    rule(41317, 10, None), // 1972-01-01
    rule(41499, 11, None), // 1972-07-01
    rule(41683, 12, None), // 1973-01-01
    rule(42048, 13, None), // 1974-01-01
    rule(42413, 14, None), // 1975-01-01
    rule(42778, 15, None), // 1976-01-01
    rule(43144, 16, None), // 1977-01-01
    rule(43509, 17, None), // 1978-01-01
    rule(43874, 18, None), // 1979-01-01
    rule(44239, 19, None), // 1980-01-01
    rule(44786, 20, None), // 1981-07-01
    rule(45151, 21, None), // 1982-07-01
    rule(45516, 22, None), // 1983-07-01
    rule(46247, 23, None), // 1985-07-01
    rule(47161, 24, None), // 1988-01-01
    rule(47892, 25, None), // 1990-01-01
    rule(48257, 26, None), // 1991-01-01
    rule(48804, 27, None), // 1992-07-01
    rule(49169, 28, None), // 1993-07-01
    rule(49534, 29, None), // 1994-07-01
    rule(50083, 30, None), // 1996-01-01
    rule(50630, 31, None), // 1997-07-01
    rule(51179, 32, None), // 1999-01-01
    rule(53736, 33, None), // 2006-01-01
    rule(54832, 34, None), // 2009-01-01
    rule(56109, 35, None), // 2012-07-01
    rule(57204, 36, None), // 2015-07-01
    rule(57754, 37, None), // 2017-01-01
];

const fn rule(effective_day: i64, offset: i64, drift: Option<Drift>) -> LeapRule {
    LeapRule { effective_day, offset, drift }
}

static SHARED: OnceLock<LeapSecondTable> = OnceLock::new();

impl LeapSecondTable {
    pub fn new(rules: Vec<LeapRule>) -> Result<LeapSecondTable, TableError> {
        let first = match rules.first() {
            Some(&first) => first,
            None => return Err(TableError::Empty),
        };
        if first.drift.is_some() && rules.len() < 2 {
            return Err(TableError::DriftAlone);
        }
        if let Some(Drift { coefficient, .. }) = first.drift {
            if !coefficient.is_finite() || coefficient < 0.0 {
                return Err(TableError::BadDrift(coefficient));
            }
        }
        let mut prev = first;
        for &this in &rules[1..] {
            if this.effective_day <= prev.effective_day {
                return Err(TableError::OutOfOrder(prev.effective_day, this.effective_day));
            }
            if this.offset < prev.offset {
                return Err(TableError::OffsetDecrease(
                    this.effective_day,
                    prev.offset,
                    this.offset,
                ));
            }
            if this.drift.is_some() {
                return Err(TableError::MisplacedDrift(this.effective_day));
            }
            prev = this;
        }
        Ok(LeapSecondTable { rules })
    }

    /// The process-wide table: whatever was [`install`](Self::install)ed,
    /// or the built-in IERS table on first use.
    pub fn shared() -> &'static LeapSecondTable {
        SHARED.get_or_init(LeapSecondTable::builtin)
    }

    /// Replace the shared table before anything has used it. Fails once
    /// the shared table exists, because values validated against one
    /// table must never be re-interpreted against another.
    pub fn install(table: LeapSecondTable) -> Result<(), TableError> {
        SHARED.set(table).map_err(|_| TableError::AlreadyInstalled)
    }

    pub fn builtin() -> LeapSecondTable {
        // the built-in data is covered by tests, so this cannot fail
        LeapSecondTable::new(BUILTIN.to_vec()).expect("built-in leap second table")
    }

    pub fn rules(&self) -> &[LeapRule] {
        &self.rules
    }

    /// Index of the rule governing day `mjd`, clamped to the first rule
    /// for days before the table begins.
    pub(crate) fn index_for(&self, mjd: i64) -> usize {
        match self.rules.binary_search_by_key(&mjd, |rule| rule.effective_day) {
            Ok(i) => i,
            Err(0) => 0,
            Err(i) => i - 1,
        }
    }

    /// Whole-second TAI-UTC offset effective on day `mjd`. The drift
    /// contribution of the pre-1972 era is not included; see
    /// [`drift_seconds_at`](Self::drift_seconds_at).
    pub fn offset_at(&self, mjd: i64) -> i64 {
        self.rules[self.index_for(mjd)].offset
    }

    /// Fractional drift seconds on day `mjd`, zero in the fixed era.
    pub fn drift_seconds_at(&self, mjd: i64) -> f64 {
        match self.rules[self.index_for(mjd)].drift {
            Some(Drift { reference_day, coefficient }) => {
                (mjd as f64 - reference_day as f64) * coefficient
            }
            None => 0.0,
        }
    }

    /// Leap seconds inserted on civil day `mjd`, which is the offset
    /// step between day `mjd` and day `mjd + 1`. The step out of a
    /// drift rule is a clock adjustment rather than a leap second, so
    /// it does not lengthen the preceding day.
    pub fn leap_seconds_inserted_on(&self, mjd: i64) -> i64 {
        let next = match mjd.checked_add(1) {
            Some(next) => next,
            None => return 0,
        };
        let i = self.index_for(mjd);
        let j = self.index_for(next);
        if i == j || self.rules[i].drift.is_some() {
            return 0;
        }
        self.rules[j].offset - self.rules[i].offset
    }

    /// Leap seconds inserted on all days strictly before `mjd`. Zero
    /// throughout the drift era; in the fixed era it is the offset
    /// accumulated since the first fixed rule, so consecutive days
    /// differ by exactly [`leap_seconds_inserted_on`] of the earlier day.
    ///
    /// [`leap_seconds_inserted_on`]: Self::leap_seconds_inserted_on
    pub(crate) fn leaps_before(&self, mjd: i64) -> i64 {
        let first_fixed = usize::from(self.rules[0].drift.is_some());
        if mjd < self.rules[first_fixed].effective_day {
            0
        } else {
            self.offset_at(mjd) - self.rules[first_fixed].offset
        }
    }

    pub fn day_length(&self, mjd: i64) -> i64 {
        SECS_PER_DAY + self.leap_seconds_inserted_on(mjd)
    }

    pub fn nanos_in_day(&self, mjd: i64) -> i64 {
        self.day_length(mjd) * NANOS_PER_SEC
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::NANOS_PER_DAY;

    #[test]
    fn builtin_is_valid() {
        let table = LeapSecondTable::builtin();
        assert_eq!(table.rules().len(), 29);
        assert_eq!(table.rules()[0].effective_day, 37300);
        assert_eq!(table.rules().last().unwrap().offset, 37);
    }

    #[test]
    fn offsets() {
        let table = LeapSecondTable::builtin();
        assert_eq!(table.offset_at(41317), 10); // 1972-01-01
        assert_eq!(table.offset_at(41498), 10); // 1972-06-30, the leap day
        assert_eq!(table.offset_at(41499), 11); // 1972-07-01
        assert_eq!(table.offset_at(57753), 36); // 2016-12-31
        assert_eq!(table.offset_at(57754), 37); // 2017-01-01
        assert_eq!(table.offset_at(60000), 37); // beyond the last rule
        assert_eq!(table.offset_at(40000), 1); // drift era
        assert_eq!(table.offset_at(30000), 1); // before the first rule
    }

    #[test]
    fn day_lengths() {
        let table = LeapSecondTable::builtin();
        assert_eq!(table.leap_seconds_inserted_on(41498), 1);
        assert_eq!(table.leap_seconds_inserted_on(41499), 0);
        assert_eq!(table.leap_seconds_inserted_on(41682), 1);
        assert_eq!(table.leap_seconds_inserted_on(57753), 1);
        assert_eq!(table.leap_seconds_inserted_on(57754), 0);
        assert_eq!(table.nanos_in_day(41682), NANOS_PER_DAY + 1_000_000_000);
        assert_eq!(table.nanos_in_day(41683), NANOS_PER_DAY);
        // end of the drift era is an adjustment, not a leap second
        assert_eq!(table.leap_seconds_inserted_on(41316), 0);
        assert_eq!(table.nanos_in_day(41316), NANOS_PER_DAY);
        assert_eq!(table.leap_seconds_inserted_on(i64::MAX), 0);
        assert_eq!(table.leap_seconds_inserted_on(i64::MIN), 0);
    }

    #[test]
    fn cumulative_leaps() {
        let table = LeapSecondTable::builtin();
        assert_eq!(table.leaps_before(41317), 0);
        assert_eq!(table.leaps_before(41498), 0);
        assert_eq!(table.leaps_before(41499), 1);
        assert_eq!(table.leaps_before(41683), 2);
        assert_eq!(table.leaps_before(57754), 27);
        assert_eq!(table.leaps_before(40000), 0);
        assert_eq!(table.leaps_before(i64::MIN), 0);
        // consecutive days differ by the inserted leap seconds
        for mjd in 41315..41690 {
            assert_eq!(
                table.leaps_before(mjd + 1) - table.leaps_before(mjd),
                table.leap_seconds_inserted_on(mjd),
                "mjd {}",
                mjd
            );
        }
    }

    #[test]
    fn drift() {
        let table = LeapSecondTable::builtin();
        assert_eq!(table.drift_seconds_at(37300), 0.0);
        let at_40000 = table.drift_seconds_at(40000);
        assert!((at_40000 - 2700.0 * 0.001296).abs() < 1e-9);
        assert_eq!(table.drift_seconds_at(41499), 0.0);
    }

    #[test]
    fn rejects_bad_tables() {
        let fixed = |day, offset| LeapRule { effective_day: day, offset, drift: None };
        assert!(matches!(LeapSecondTable::new(vec![]), Err(TableError::Empty)));
        assert!(matches!(
            LeapSecondTable::new(vec![fixed(41317, 10), fixed(41317, 11)]),
            Err(TableError::OutOfOrder(41317, 41317))
        ));
        assert!(matches!(
            LeapSecondTable::new(vec![fixed(41317, 10), fixed(41499, 9)]),
            Err(TableError::OffsetDecrease(41499, 10, 9))
        ));
        let drift = Some(Drift { reference_day: 0, coefficient: 0.001 });
        assert!(matches!(
            LeapSecondTable::new(vec![
                fixed(41317, 10),
                LeapRule { effective_day: 41499, offset: 11, drift },
            ]),
            Err(TableError::MisplacedDrift(41499))
        ));
        assert!(matches!(
            LeapSecondTable::new(vec![LeapRule { effective_day: 37300, offset: 1, drift }]),
            Err(TableError::DriftAlone)
        ));
        assert!(matches!(
            LeapSecondTable::new(vec![LeapRule {
                effective_day: 37300,
                offset: 1,
                drift: Some(Drift { reference_day: 0, coefficient: -1.0 }),
            }, fixed(41317, 10)]),
            Err(TableError::BadDrift(_))
        ));
    }
}
