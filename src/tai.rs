//! Instants on the TAI time scale.
//!
//! TAI is a continuous count of SI seconds with no leap seconds, so
//! arithmetic here is plain seconds-and-nanoseconds with overflow
//! checking. The epoch is 1958-01-01T00:00:00 (TAI); negative second
//! counts are instants before it.

use std::str::FromStr;
use std::time::Duration;

use nom::bytes::complete::{tag, take_while_m_n};
use nom::character::complete::{char, digit1};
use nom::combinator::{all_consuming, map_res, opt, recognize};
use nom::sequence::{pair, preceded, tuple};

use crate::utc::UtcInstant;
use crate::{Error, Result, NANOS_PER_SEC};

/// A point on the TAI scale: whole seconds from the 1958 epoch plus a
/// nanosecond-of-second in `0..1_000_000_000`. The nanosecond always
/// points towards the future, also for instants before the epoch.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TaiInstant {
    secs: i64,
    nanos: u32,
}

impl TaiInstant {
    pub(crate) fn new_unchecked(secs: i64, nanos: u32) -> TaiInstant {
        debug_assert!(nanos < NANOS_PER_SEC as u32);
        TaiInstant { secs, nanos }
    }

    /// Builds an instant from seconds and a nanosecond adjustment of
    /// any sign, carrying the adjustment into the seconds. Fails if the
    /// carry overflows.
    pub fn of_tai_seconds(secs: i64, nano_adjustment: i64) -> Result<TaiInstant> {
        let carry = nano_adjustment.div_euclid(NANOS_PER_SEC);
        let nanos = nano_adjustment.rem_euclid(NANOS_PER_SEC) as u32;
        let secs = secs
            .checked_add(carry)
            .ok_or(Error::Overflow("TAI seconds adjustment"))?;
        Ok(TaiInstant { secs, nanos })
    }

    pub fn tai_seconds(&self) -> i64 {
        self.secs
    }

    pub fn nano(&self) -> u32 {
        self.nanos
    }

    /// Any `i64` second count is valid, so this never fails.
    pub fn with_tai_seconds(&self, secs: i64) -> TaiInstant {
        TaiInstant { secs, nanos: self.nanos }
    }

    pub fn with_nano(&self, nano: i64) -> Result<TaiInstant> {
        if !(0..NANOS_PER_SEC).contains(&nano) {
            return Err(Error::OutOfRange {
                what: "nano-of-second",
                value: nano,
                min: 0,
                max: NANOS_PER_SEC - 1,
            });
        }
        Ok(TaiInstant { secs: self.secs, nanos: nano as u32 })
    }

    pub fn plus(&self, duration: Duration) -> Result<TaiInstant> {
        let add_secs = i64::try_from(duration.as_secs())
            .map_err(|_| Error::Overflow("duration seconds"))?;
        let mut secs = self
            .secs
            .checked_add(add_secs)
            .ok_or(Error::Overflow("TAI seconds addition"))?;
        let mut nanos = self.nanos + duration.subsec_nanos();
        if nanos >= NANOS_PER_SEC as u32 {
            nanos -= NANOS_PER_SEC as u32;
            secs = secs.checked_add(1).ok_or(Error::Overflow("TAI seconds addition"))?;
        }
        Ok(TaiInstant { secs, nanos })
    }

    pub fn minus(&self, duration: Duration) -> Result<TaiInstant> {
        let sub_secs = i64::try_from(duration.as_secs())
            .map_err(|_| Error::Overflow("duration seconds"))?;
        let mut secs = self
            .secs
            .checked_sub(sub_secs)
            .ok_or(Error::Overflow("TAI seconds subtraction"))?;
        let mut nanos = self.nanos as i64 - duration.subsec_nanos() as i64;
        if nanos < 0 {
            nanos += NANOS_PER_SEC;
            secs = secs.checked_sub(1).ok_or(Error::Overflow("TAI seconds subtraction"))?;
        }
        Ok(TaiInstant { secs, nanos: nanos as u32 })
    }

    /// Time from `self` forwards to `other`. Fails with a range error
    /// if `other` is earlier; use [`duration_since`](Self::duration_since)
    /// for the other direction.
    pub fn duration_until(&self, other: &TaiInstant) -> Result<Duration> {
        other.duration_since(self)
    }

    pub fn duration_since(&self, earlier: &TaiInstant) -> Result<Duration> {
        if self < earlier {
            return Err(Error::OutOfRange {
                what: "duration",
                value: self.secs.saturating_sub(earlier.secs),
                min: 0,
                max: i64::MAX,
            });
        }
        let mut secs = self
            .secs
            .checked_sub(earlier.secs)
            .ok_or(Error::Overflow("TAI duration"))?;
        let mut nanos = self.nanos as i64 - earlier.nanos as i64;
        if nanos < 0 {
            nanos += NANOS_PER_SEC;
            secs -= 1;
        }
        Ok(Duration::new(secs as u64, nanos as u32))
    }

    pub fn is_before(&self, other: &TaiInstant) -> bool {
        self < other
    }

    pub fn is_after(&self, other: &TaiInstant) -> bool {
        self > other
    }

    /// The same physical instant on the UTC scale, resolved by the
    /// shared leap-second table.
    pub fn to_utc(&self) -> UtcInstant {
        UtcInstant::from(*self)
    }
}

impl std::fmt::Display for TaiInstant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:09}s(TAI)", self.secs, self.nanos)
    }
}

fn parse(input: &str) -> nom::IResult<&str, (i64, u32)> {
    // an explicit leading '+' is not part of the format
    all_consuming(tuple((
        map_res(recognize(pair(opt(char('-')), digit1)), i64::from_str),
        preceded(
            char('.'),
            map_res(take_while_m_n(9, 9, |c: char| c.is_ascii_digit()), u32::from_str),
        ),
        tag("s(TAI)"),
    )))(input)
    .map(|(rest, (secs, nanos, _))| (rest, (secs, nanos)))
}

impl FromStr for TaiInstant {
    type Err = Error;
    fn from_str(s: &str) -> Result<TaiInstant> {
        match parse(s) {
            Ok((_, (secs, nanos))) => Ok(TaiInstant { secs, nanos }),
            Err(_) => Err(Error::Parse {
                expected: "{seconds}.{nano-of-second:09}s(TAI)",
                input: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tai(secs: i64, nanos: i64) -> TaiInstant {
        TaiInstant::of_tai_seconds(secs, nanos).unwrap()
    }

    #[test]
    fn nano_adjustment_carries() {
        assert_eq!(tai(3, 200), tai(2, 1_000_000_200));
        assert_eq!(tai(0, -1), tai(-1, 999_999_999));
        assert_eq!(tai(2, -2_000_000_001), tai(-1, 999_999_999));
        assert!(matches!(
            TaiInstant::of_tai_seconds(i64::MAX, 1_000_000_000),
            Err(Error::Overflow(_))
        ));
        assert!(matches!(
            TaiInstant::of_tai_seconds(i64::MIN, -1),
            Err(Error::Overflow(_))
        ));
    }

    #[test]
    fn withers() {
        let t = tai(10, 500);
        assert_eq!(t.with_tai_seconds(-4), tai(-4, 500));
        assert_eq!(t.with_nano(999_999_999).unwrap(), tai(10, 999_999_999));
        assert!(matches!(t.with_nano(-1), Err(Error::OutOfRange { .. })));
        assert!(matches!(t.with_nano(1_000_000_000), Err(Error::OutOfRange { .. })));
    }

    #[test]
    fn arithmetic() {
        let zero = tai(0, 0);
        assert_eq!(zero.plus(Duration::new(3, 200)).unwrap(), tai(3, 200));
        assert_eq!(tai(3, 200).minus(Duration::new(3, 200)).unwrap(), zero);
        assert_eq!(zero.minus(Duration::new(0, 1)).unwrap(), tai(-1, 999_999_999));
        assert_eq!(
            tai(1, 999_999_999).plus(Duration::new(0, 1)).unwrap(),
            tai(2, 0)
        );
        assert!(matches!(
            tai(i64::MAX, 999_999_999).plus(Duration::new(0, 1)),
            Err(Error::Overflow(_))
        ));
        assert!(matches!(
            tai(i64::MIN, 0).minus(Duration::new(0, 1)),
            Err(Error::Overflow(_))
        ));
    }

    #[test]
    fn durations() {
        let a = tai(5, 200);
        let b = tai(7, 100);
        assert_eq!(a.duration_until(&b).unwrap(), Duration::new(1, 999_999_900));
        assert_eq!(b.duration_since(&a).unwrap(), Duration::new(1, 999_999_900));
        assert_eq!(a.duration_until(&a).unwrap(), Duration::ZERO);
        assert!(matches!(b.duration_until(&a), Err(Error::OutOfRange { .. })));
        assert!(matches!(
            tai(i64::MAX, 0).duration_since(&tai(i64::MIN, 0)),
            Err(Error::Overflow(_))
        ));
    }

    #[test]
    fn ordering() {
        let sorted = [
            tai(-10, 0),
            tai(-10, 1),
            tai(0, 0),
            tai(0, 999_999_999),
            tai(1, 0),
        ];
        for (i, a) in sorted.iter().enumerate() {
            for (j, b) in sorted.iter().enumerate() {
                assert_eq!(a < b, i < j);
                assert_eq!(a.is_before(b), i < j);
                assert_eq!(a.is_after(b), i > j);
                assert_eq!(a == b, i == j);
            }
        }
    }

    #[test]
    fn text_round_trip() {
        for &(t, s) in &[
            (tai(0, 0), "0.000000000s(TAI)"),
            (tai(3, 200), "3.000000200s(TAI)"),
            (tai(-1, 999_999_999), "-1.999999999s(TAI)"),
            (tai(i64::MAX, 999_999_999), "9223372036854775807.999999999s(TAI)"),
        ] {
            assert_eq!(t.to_string(), s);
            assert_eq!(s.parse::<TaiInstant>().unwrap(), t);
        }
    }

    #[test]
    fn parse_rejects() {
        for bad in [
            "",
            "1s(TAI)",
            "+1.000000000s(TAI)",
            "1.000000000",
            "1.00000000s(TAI)",
            "1.0000000000s(TAI)",
            "1.00000000as(TAI)",
            " 1.000000000s(TAI)",
            "1.000000000s(TAI) ",
            "99999999999999999999.000000000s(TAI)",
        ] {
            assert!(matches!(
                bad.parse::<TaiInstant>(),
                Err(Error::Parse { .. })
            ), "accepted {:?}", bad);
        }
    }
}
