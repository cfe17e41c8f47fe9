//! ISO-8601 extended text for UTC instants.
//!
//! The profile is strict: `YYYY-MM-DDThh:mm:ss[.fraction]Z`, nothing
//! else. The seconds field runs to `60`, which is only meaningful as
//! `23:59:60` on a day the leap-second table says was 86401 seconds
//! long. Fractions are written in groups of 3, 6 or 9 digits, the
//! shortest that is exact.

use std::str::FromStr;

use nom::bytes::complete::take_while_m_n;
use nom::character::complete::{char, one_of};
use nom::combinator::{all_consuming, map_res, opt, recognize};
use nom::sequence::{pair, preceded, tuple};

use crate::date::{days_in_month, Gregorian};
use crate::utc::UtcInstant;
use crate::{Error, Result, NANOS_PER_SEC, SECS_PER_DAY};

pub fn format(utc: &UtcInstant) -> String {
    let date = Gregorian::from_mjd(utc.modified_julian_day());
    let nod = utc.nano_of_day();
    let secs = nod / NANOS_PER_SEC;
    let frac = nod % NANOS_PER_SEC;
    let (h, m, s) = if secs >= SECS_PER_DAY {
        // inside an inserted leap second
        (23, 59, 60 + secs - SECS_PER_DAY)
    } else {
        (secs / 3600, secs / 60 % 60, secs % 60)
    };
    let (sign, year) = if date.year() < 0 { ("-", -date.year()) } else { ("", date.year()) };
    let mut out = format!(
        "{}{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        sign,
        year,
        date.month(),
        date.day(),
        h,
        m,
        s
    );
    if frac != 0 {
        if frac % 1_000_000 == 0 {
            out.push_str(&format!(".{:03}", frac / 1_000_000));
        } else if frac % 1_000 == 0 {
            out.push_str(&format!(".{:06}", frac / 1_000));
        } else {
            out.push_str(&format!(".{:09}", frac));
        }
    }
    out.push('Z');
    out
}

struct Fields {
    year: i64,
    month: i32,
    day: i32,
    hour: i64,
    minute: i64,
    second: i64,
    nanos: i64,
}

fn digits(min: usize, max: usize) -> impl Fn(&str) -> nom::IResult<&str, &str> {
    move |input| take_while_m_n(min, max, |c: char| c.is_ascii_digit())(input)
}

fn field2(input: &str) -> nom::IResult<&str, i64> {
    map_res(digits(2, 2), i64::from_str)(input)
}

fn fraction(input: &str) -> nom::IResult<&str, i64> {
    let (rest, frac) = preceded(char('.'), digits(1, 9))(input)?;
    // the grammar guarantees this fits an i64
    let nanos = frac.parse::<i64>().unwrap() * 10_i64.pow(9 - frac.len() as u32);
    Ok((rest, nanos))
}

fn grammar(input: &str) -> nom::IResult<&str, Fields> {
    let (rest, (year, month, day, hour, minute, second, nanos, _)) =
        all_consuming(tuple((
            map_res(recognize(pair(opt(char('-')), digits(4, 17))), i64::from_str),
            preceded(char('-'), field2),
            preceded(char('-'), field2),
            preceded(char('T'), field2),
            preceded(char(':'), field2),
            preceded(char(':'), field2),
            opt(fraction),
            one_of("Z"),
        )))(input)?;
    Ok((rest, Fields {
        year,
        month: month as i32,
        day: day as i32,
        hour,
        minute,
        second,
        nanos: nanos.unwrap_or(0),
    }))
}

fn in_range(what: &'static str, value: i64, min: i64, max: i64) -> Result<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Error::OutOfRange { what, value, min, max })
    }
}

pub fn parse(text: &str) -> Result<UtcInstant> {
    let fields = match grammar(text) {
        Ok((_, fields)) => fields,
        Err(_) => {
            return Err(Error::Parse {
                expected: "YYYY-MM-DDThh:mm:ss[.fraction]Z",
                input: text.to_owned(),
            })
        }
    };
    in_range("month-of-year", fields.month as i64, 1, 12)?;
    in_range(
        "day-of-month",
        fields.day as i64,
        1,
        days_in_month(fields.year, fields.month) as i64,
    )?;
    in_range("hour-of-day", fields.hour, 0, 23)?;
    in_range("minute-of-hour", fields.minute, 0, 59)?;
    if fields.second == 60 && !(fields.hour == 23 && fields.minute == 59) {
        return Err(Error::OutOfRange {
            what: "second-of-minute",
            value: 60,
            min: 0,
            max: 59,
        });
    }
    in_range("second-of-minute", fields.second, 0, 60)?;
    let date = Gregorian(fields.year, fields.month, fields.day);
    let mjd = date.mjd();
    // a year near the i64 limit has no representable day number
    if Gregorian::from_mjd(mjd) != date {
        return Err(Error::Overflow("modified julian day"));
    }
    let nod =
        (fields.hour * 3600 + fields.minute * 60 + fields.second) * NANOS_PER_SEC + fields.nanos;
    // a second of 60 is only valid if the table says the day is longer
    UtcInstant::of_modified_julian_day(mjd, nod)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Error;

    fn utc(mjd: i64, nanos: i64) -> UtcInstant {
        UtcInstant::of_modified_julian_day(mjd, nanos).unwrap()
    }

    #[test]
    fn formats() {
        for &(mjd, nod, text) in &[
            (0, 0, "1858-11-17T00:00:00Z"),
            (40587, 0, "1970-01-01T00:00:00Z"),
            (41682, 86_400_000_000_000, "1972-12-31T23:59:60Z"),
            (41682, 86_400_500_000_000, "1972-12-31T23:59:60.500Z"),
            (41683, 0, "1973-01-01T00:00:00Z"),
            (40587, 500_000_000, "1970-01-01T00:00:00.500Z"),
            (40587, 500_000, "1970-01-01T00:00:00.000500Z"),
            (40587, 5, "1970-01-01T00:00:00.000000005Z"),
            (40587, 123_456_789, "1970-01-01T00:00:00.123456789Z"),
            (40587, 86_399_000_000_000, "1970-01-01T23:59:59Z"),
            (-678942, 0, "-0001-12-31T00:00:00Z"),
        ] {
            let u = utc(mjd, nod);
            assert_eq!(format(&u), text);
            assert_eq!(parse(text).unwrap(), u, "{}", text);
        }
    }

    #[test]
    fn display_round_trip() {
        for &(mjd, nod) in &[
            (41317, 0),
            (41498, 86_400_999_999_999),
            (57753, 86_400_000_000_001),
            (60000, 43_210_987_654_321),
            (-1, 12),
        ] {
            let u = utc(mjd, nod);
            assert_eq!(u.to_string().parse::<UtcInstant>().unwrap(), u);
        }
    }

    #[test]
    fn parses_leap_second_only_on_leap_days() {
        assert_eq!(
            parse("1972-06-30T23:59:60Z").unwrap(),
            utc(41498, 86_400_000_000_000)
        );
        assert!(matches!(
            parse("1972-07-01T23:59:60Z"),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(
            parse("1972-06-30T12:00:60Z"),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_bad_fields() {
        for bad in [
            "1972-13-01T00:00:00Z",
            "1972-00-01T00:00:00Z",
            "1972-02-30T00:00:00Z",
            "1900-02-29T00:00:00Z",
            "1972-01-01T24:00:00Z",
            "1972-01-01T00:60:00Z",
            "1972-01-01T00:00:61Z",
        ] {
            assert!(matches!(parse(bad), Err(Error::OutOfRange { .. })), "{}", bad);
        }
        // but real leap-year dates are fine
        assert!(parse("2000-02-29T00:00:00Z").is_ok());
    }

    #[test]
    fn rejects_malformed_text() {
        for bad in [
            "",
            "1972-01-01",
            "1972-01-01T00:00:00",
            "1972-01-01 00:00:00Z",
            "1972-01-01t00:00:00Z",
            "1972-01-01T00:00:00+00:00",
            "1972-1-01T00:00:00Z",
            "72-01-01T00:00:00Z",
            "1972-01-01T00:00:00.Z",
            "1972-01-01T00:00:00.0000000001Z",
            "+1972-01-01T00:00:00Z",
            "1972-01-01T00:00:00Z ",
            "abc",
        ] {
            assert!(matches!(parse(bad), Err(Error::Parse { .. })), "{}", bad);
        }
    }
}
