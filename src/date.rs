//! Proleptic-Gregorian calendar dates and Modified Julian Day numbers.
//!
//! The instant types index civil days by MJD (day 0 is 1858-11-17), so
//! the conversions here work over the full `i64` day range. The
//! intermediate arithmetic runs in `i128` because the year count for an
//! extreme day number does not fit a multiplication in `i64`.

#[derive(Copy, Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Gregorian(pub i64, pub i32, pub i32);

impl std::fmt::Display for Gregorian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

impl Gregorian {
    pub fn year(self) -> i64 {
        self.0
    }
    pub fn month(self) -> i32 {
        self.1
    }
    pub fn day(self) -> i32 {
        self.2
    }

    /// Day number of this date, counted from 1858-11-17.
    pub const fn mjd(self) -> i64 {
        let Gregorian(y, m, d) = self;
        let (y, m) = if m > 2 { (y, m as i64 + 1) } else { (y - 1, m as i64 + 13) };
        let days = days_in_years(y as i128) + muldiv(m as i128, 153, 5) + d as i128;
        (days - 679004) as i64
    }

    pub fn from_mjd(mjd: i64) -> Gregorian {
        let mut d = mjd as i128 + 678881;
        let mut y = muldiv(d, 400, 146097) + 1;
        y -= (days_in_years(y) > d) as i128;
        d -= days_in_years(y) - 31;
        let m = muldiv(d, 17, 520);
        d -= muldiv(m, 520, 17);
        if m > 10 {
            Gregorian((y + 1) as i64, (m - 10) as i32, d as i32)
        } else {
            Gregorian(y as i64, (m + 2) as i32, d as i32)
        }
    }
}

impl From<Gregorian> for i64 {
    fn from(date: Gregorian) -> i64 {
        date.mjd()
    }
}

const fn days_in_years(y: i128) -> i128 {
    muldiv(y, 1461, 4) - muldiv(y, 1, 100) + muldiv(y, 1, 400)
}

const fn muldiv(var: i128, mul: i128, div: i128) -> i128 {
    (var * mul).div_euclid(div)
}

pub fn is_leap_year(y: i64) -> bool {
    y % 4 == 0 && (y % 100 != 0 || y % 400 == 0)
}

pub fn days_in_month(y: i64, m: i32) -> i32 {
    match m {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(y) => 29,
        2 => 28,
        _ => 0,
    }
}

/// MJD of 1900-01-01, the NTP era origin used by leap-seconds.list.
pub const NTP_EPOCH_MJD: i64 = 15020;

pub fn today() -> i64 {
    use std::time::SystemTime;
    let now = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH);
    // panic if we are in a tardis
    let days = now.unwrap().as_secs().div_euclid(86400);
    Gregorian(1970, 1, 1).mjd() + days as i64
}
