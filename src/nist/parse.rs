use super::{Hash, UncheckedLeap, UncheckedList};
use crate::date::Gregorian;

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{digit1, hex_digit1, line_ending, not_line_ending, space1};
use nom::combinator::{map, map_res, value};
use nom::multi::{fill, many0_count, many1};
use nom::sequence::{delimited, pair, preceded, terminated, tuple};
use std::str::FromStr;

type Result<'a, O> = nom::IResult<&'a str, O>;

fn dec64(input: &str) -> Result<'_, i64> {
    map_res(digit1, i64::from_str)(input)
}

fn hex32(input: &str) -> Result<'_, u32> {
    map_res(hex_digit1, |s| u32::from_str_radix(s, 16))(input)
}

fn month(input: &str) -> Result<'_, i32> {
    alt((
        value(1, tag("Jan")),
        value(2, tag("Feb")),
        value(3, tag("Mar")),
        value(4, tag("Apr")),
        value(5, tag("May")),
        value(6, tag("Jun")),
        value(7, tag("Jul")),
        value(8, tag("Aug")),
        value(9, tag("Sep")),
        value(10, tag("Oct")),
        value(11, tag("Nov")),
        value(12, tag("Dec")),
    ))(input)
}

fn date(input: &str) -> Result<'_, Gregorian> {
    map(
        tuple((
            preceded(space1, dec64),
            preceded(space1, month),
            preceded(space1, dec64),
        )),
        |(d, m, y)| Gregorian(y, m, d as i32),
    )(input)
}

fn empty(input: &str) -> Result<'_, ()> {
    value((), pair(tag("#"), line_ending))(input)
}

fn comment(input: &str) -> Result<'_, ()> {
    value((), tuple((tag("#"), space1, not_line_ending, line_ending)))(input)
}

fn ignore(input: &str) -> Result<'_, ()> {
    value((), many0_count(alt((empty, comment))))(input)
}

fn updated(input: &str) -> Result<'_, i64> {
    delimited(pair(tag("#$"), space1), dec64, line_ending)(input)
}

fn expires(input: &str) -> Result<'_, i64> {
    delimited(pair(tag("#@"), space1), dec64, line_ending)(input)
}

fn leapsecs(input: &str) -> Result<'_, Vec<UncheckedLeap>> {
    many1(tuple((
        terminated(dec64, space1),
        terminated(dec64, space1),
        delimited(tag("#"), date, line_ending),
    )))(input)
}

fn hash(input: &str) -> Result<'_, Hash> {
    let mut words: [u32; 5] = Default::default();
    // fill wants Fn, preceded returns FnMut; re-invoke via a closure
    let (rest, ()) = delimited(
        tag("#h"),
        fill(|i| preceded(space1, hex32)(i), &mut words),
        line_ending,
    )(input)?;
    Ok((rest, Hash(words)))
}

pub(super) fn document(input: &str) -> Result<'_, UncheckedList> {
    map(
        tuple((
            preceded(ignore, updated),
            preceded(ignore, expires),
            preceded(ignore, leapsecs),
            preceded(ignore, hash),
        )),
        |(updated, expires, leapsecs, hash)| UncheckedList {
            updated,
            expires,
            leapsecs,
            hash,
        },
    )(input)
}
