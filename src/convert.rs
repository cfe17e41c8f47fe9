//! Conversion between the TAI and UTC scales.
//!
//! UTC→TAI is direct: scale the day number, add the table offset for
//! that day. TAI→UTC locates the table rule whose TAI range brackets
//! the instant; an instant landing in the one-second window a rule
//! introduces reconstructs the `23:59:60` leap second of the preceding
//! day rather than collapsing onto the next day's first second. The
//! pre-1972 drift era is inverted by fixed-point iteration on the day
//! number, since the offset there changes by about 1.3 ms per day.

use crate::table::{Drift, LeapSecondTable};
use crate::tai::TaiInstant;
use crate::utc::UtcInstant;
use crate::{Error, Result, NANOS_PER_DAY, NANOS_PER_SEC, SECS_PER_DAY};

/// MJD of 1958-01-01, where the TAI second count is zero.
pub const TAI_EPOCH_MJD: i64 = 36204;

impl LeapSecondTable {
    /// TAI-UTC offset for day `mjd` as whole seconds plus nanoseconds
    /// in `0..1_000_000_000`. The nanosecond part is zero outside the
    /// drift era. Fractional drift rounds half-up to the nanosecond;
    /// both conversion directions use this one function, which is what
    /// makes them exact inverses.
    fn offset_at_nanos(&self, mjd: i64) -> (i64, i64) {
        let i = self.index_for(mjd);
        let rule = self.rules()[i];
        match rule.drift {
            Some(Drift { reference_day, coefficient }) => {
                let drift = (mjd as f64 - reference_day as f64) * coefficient;
                let whole = drift.floor();
                let mut nanos = ((drift - whole) * 1e9 + 0.5).floor() as i64;
                let mut whole = whole as i64;
                if nanos >= NANOS_PER_SEC {
                    nanos -= NANOS_PER_SEC;
                    whole += 1;
                }
                (rule.offset + whole, nanos)
            }
            None => (rule.offset, 0),
        }
    }

    pub fn to_tai(&self, utc: UtcInstant) -> Result<TaiInstant> {
        let mjd = utc.modified_julian_day();
        let nod = utc.nano_of_day();
        let (off_secs, off_nanos) = self.offset_at_nanos(mjd);
        let secs = mjd
            .checked_sub(TAI_EPOCH_MJD)
            .and_then(|days| days.checked_mul(SECS_PER_DAY))
            .and_then(|secs| secs.checked_add(nod / NANOS_PER_SEC))
            .and_then(|secs| secs.checked_add(off_secs))
            .ok_or(Error::Overflow("TAI seconds"))?;
        let mut nanos = nod % NANOS_PER_SEC + off_nanos;
        let secs = if nanos >= NANOS_PER_SEC {
            nanos -= NANOS_PER_SEC;
            secs.checked_add(1).ok_or(Error::Overflow("TAI seconds"))?
        } else {
            secs
        };
        Ok(TaiInstant::new_unchecked(secs, nanos as u32))
    }

    pub fn to_utc(&self, tai: TaiInstant) -> UtcInstant {
        let rules = self.rules();
        let first_fixed = usize::from(rules[0].drift.is_some());
        if first_fixed < rules.len() && tai_start(self, first_fixed) <= tai.tai_seconds() as i128 {
            self.fixed_era_to_utc(tai, first_fixed)
        } else {
            self.drift_era_to_utc(tai)
        }
    }

    fn fixed_era_to_utc(&self, tai: TaiInstant, first_fixed: usize) -> UtcInstant {
        let rules = self.rules();
        let t = tai.tai_seconds() as i128;
        // greatest rule whose TAI range has started; the caller
        // guarantees the first candidate has
        let mut i = first_fixed;
        let mut hi = rules.len();
        while i + 1 < hi {
            let mid = (i + hi) / 2;
            if tai_start(self, mid) <= t {
                i = mid;
            } else {
                hi = mid;
            }
        }
        let eff = rules[i].effective_day as i128;
        let secs_into_era =
            t - rules[i].offset as i128 - (eff - TAI_EPOCH_MJD as i128) * SECS_PER_DAY as i128;
        let mut mjd = eff + secs_into_era.div_euclid(SECS_PER_DAY as i128);
        let mut sod = secs_into_era.rem_euclid(SECS_PER_DAY as i128);
        if i + 1 < rules.len() {
            let next_eff = rules[i + 1].effective_day as i128;
            if mjd >= next_eff {
                // inside the leap second window at the end of the era
                sod = SECS_PER_DAY as i128 + secs_into_era - (next_eff - eff) * SECS_PER_DAY as i128;
                mjd = next_eff - 1;
            }
        }
        let nod = sod as i64 * NANOS_PER_SEC + tai.nano() as i64;
        UtcInstant::new_unchecked(mjd as i64, nod)
    }

    fn drift_era_to_utc(&self, tai: TaiInstant) -> UtcInstant {
        let t_nanos = tai.tai_seconds() as i128 * NANOS_PER_SEC as i128 + tai.nano() as i128;
        let nod_on = |mjd: i64| -> i128 {
            let (os, on) = self.offset_at_nanos(mjd);
            let u = t_nanos - (os as i128 * NANOS_PER_SEC as i128 + on as i128);
            u - (mjd as i128 - TAI_EPOCH_MJD as i128) * NANOS_PER_DAY as i128
        };
        let mut mjd = TAI_EPOCH_MJD + tai.tai_seconds().div_euclid(SECS_PER_DAY);
        // the offset changes so slowly per day that this converges fast
        for _ in 0..4 {
            let nod = nod_on(mjd);
            let shift = nod.div_euclid(NANOS_PER_DAY as i128) as i64;
            if shift == 0 {
                break;
            }
            mjd += shift;
        }
        let mut nod = nod_on(mjd);
        if nod < 0 {
            mjd -= 1;
            nod = nod_on(mjd);
            if nod >= self.nanos_in_day(mjd) as i128 {
                // offset discontinuity: no day contains this instant,
                // resolve onto the start of the following day
                mjd += 1;
                nod = 0;
            }
        } else if nod >= self.nanos_in_day(mjd) as i128 {
            mjd += 1;
            nod = nod_on(mjd);
            if nod < 0 {
                nod = 0;
            }
        }
        UtcInstant::new_unchecked(mjd, nod as i64)
    }
}

/// First TAI second governed by rule `i`, exact in `i128` even for
/// tables with extreme effective days.
fn tai_start(table: &LeapSecondTable, i: usize) -> i128 {
    let rule = table.rules()[i];
    (rule.effective_day as i128 - TAI_EPOCH_MJD as i128) * SECS_PER_DAY as i128
        + rule.offset as i128
}

impl TryFrom<UtcInstant> for TaiInstant {
    type Error = Error;
    fn try_from(utc: UtcInstant) -> Result<TaiInstant> {
        LeapSecondTable::shared().to_tai(utc)
    }
}

impl From<TaiInstant> for UtcInstant {
    fn from(tai: TaiInstant) -> UtcInstant {
        LeapSecondTable::shared().to_utc(tai)
    }
}
