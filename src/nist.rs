//! Parse and validate the NIST `leap-seconds.list` format.
//!
//! The file carries a `#$` last-update stamp, a `#@` expiry stamp, one
//! line per offset change (NTP timestamp, DTAI, commented date) and a
//! `#h` SHA-1 checksum over the data fields. A file that parses is
//! then checked semantically: timestamps must be midnight and agree
//! with their comment dates, the offsets must walk in ±1 steps from
//! the 1972 starting point, the list must not have expired, and the
//! checksum must verify. Only then does it become a [`LeapSecondTable`].

use anyhow::Context;
use std::io::Read;

use ring::digest::{digest, SHA1_FOR_LEGACY_USE_ONLY};

use crate::date::{today, Gregorian, NTP_EPOCH_MJD};
use crate::table::{LeapRule, LeapSecondTable, TableError};
use crate::{Error, Result, SECS_PER_DAY};

mod fmt;
mod parse;

pub use fmt::format;

/// A verified `leap-seconds.list`: the rule table plus the file's
/// publication metadata (both as MJDs).
#[derive(Clone, Debug, PartialEq)]
pub struct NistList {
    pub table: LeapSecondTable,
    pub updated: i64,
    pub expires: i64,
}

/// SHA-1 digest as the five big-endian words the file prints.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Hash(pub [u32; 5]);

impl std::fmt::Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Hash([a, b, c, d, e]) = self;
        write!(f, "{:08x} {:08x} {:08x} {:08x} {:08x}", a, b, c, d, e)
    }
}

// NTP timestamp, DTAI, date from the comment
pub(crate) type UncheckedLeap = (i64, i64, Gregorian);

#[derive(Clone, Debug, Default)]
pub(crate) struct UncheckedList {
    pub updated: i64,
    pub expires: i64,
    pub leapsecs: Vec<UncheckedLeap>,
    pub hash: Hash,
}

pub fn read_file(name: &str) -> anyhow::Result<NistList> {
    Ok(read_bytes(&load_file(name)?)?)
}

pub fn read_bytes(data: &[u8]) -> Result<NistList> {
    let text = std::str::from_utf8(data).map_err(|err| Error::Parse {
        expected: "UTF-8 text",
        input: err.to_string(),
    })?;
    read_str(text)
}

pub fn read_str(text: &str) -> Result<NistList> {
    match parse::document(text) {
        Ok((_, unchecked)) => Ok(check(unchecked)?),
        Err(err) => Err(Error::Parse {
            expected: "leap-seconds.list",
            input: err.to_string(),
        }),
    }
}

fn load_file(name: &str) -> anyhow::Result<Vec<u8>> {
    let ctx = || format!("failed to read {}", name);
    let mut fh = std::fs::File::open(name).with_context(ctx)?;
    let mut data = Vec::new();
    fh.read_to_end(&mut data).with_context(ctx)?;
    Ok(data)
}

////////////////////////////////////////////////////////////////////////

pub(crate) fn mjd_to_ntp(mjd: i64) -> i64 {
    (mjd - NTP_EPOCH_MJD) * SECS_PER_DAY
}

fn ntp_to_mjd(ntp: i64) -> std::result::Result<i64, TableError> {
    if ntp < 0 || ntp % SECS_PER_DAY != 0 {
        return Err(TableError::Midnight(ntp));
    }
    Ok(ntp / SECS_PER_DAY + NTP_EPOCH_MJD)
}

fn check(u: UncheckedList) -> std::result::Result<NistList, TableError> {
    let mut rules: Vec<LeapRule> = Vec::with_capacity(u.leapsecs.len());
    for &(ntp, dtai, date) in &u.leapsecs {
        let mjd = ntp_to_mjd(ntp)?;
        if Gregorian::from_mjd(mjd) != date {
            return Err(TableError::TimeDate(Gregorian::from_mjd(mjd), date));
        }
        match rules.last() {
            None => {
                if mjd != Gregorian(1972, 1, 1).mjd() || dtai != 10 {
                    return Err(TableError::FalseStart(mjd, dtai));
                }
            }
            Some(last) => {
                if mjd <= last.effective_day {
                    return Err(TableError::OutOfOrder(last.effective_day, mjd));
                }
                if (dtai - last.offset).abs() != 1 {
                    return Err(TableError::WrongStep(mjd, last.offset, dtai));
                }
            }
        }
        rules.push(LeapRule { effective_day: mjd, offset: dtai, drift: None });
    }
    let table = LeapSecondTable::new(rules)?;
    let updated = ntp_to_mjd(u.updated)?;
    let expires = ntp_to_mjd(u.expires)?;
    if expires <= today() {
        return Err(TableError::Expired(Gregorian::from_mjd(expires)));
    }
    let computed = sha1(&hash_input(&table, updated, expires));
    if computed != u.hash {
        return Err(TableError::Checksum(u.hash, computed));
    }
    Ok(NistList { table, updated, expires })
}

/// The checksum input: update and expiry stamps then every timestamp
/// and DTAI, decimal, no separators.
pub(crate) fn hash_input(table: &LeapSecondTable, updated: i64, expires: i64) -> String {
    use std::fmt::Write;
    let mut input = String::new();
    let _ = write!(input, "{}{}", mjd_to_ntp(updated), mjd_to_ntp(expires));
    for rule in table.rules() {
        let _ = write!(input, "{}{}", mjd_to_ntp(rule.effective_day), rule.offset);
    }
    input
}

pub(crate) fn sha1(input: &str) -> Hash {
    let hash = digest(&SHA1_FOR_LEGACY_USE_ONLY, input.as_bytes());
    // panic if sha1 is not the standard size
    let hash8: [u8; 20] = hash.as_ref().try_into().unwrap();
    let mut hash32 = Hash::default();
    for i in 0..5 {
        let word: [u8; 4] = hash8[i * 4..i * 4 + 4].try_into().unwrap();
        hash32.0[i] = u32::from_be_bytes(word);
    }
    hash32
}

////////////////////////////////////////////////////////////////////////
