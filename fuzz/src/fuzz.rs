#![no_main]
use leaptime::{nist, TaiInstant, UtcInstant};
use libfuzzer_sys::fuzz_target;
use std::str::FromStr;

fn fuzz_iso(data: &[u8]) {
    let text = match std::str::from_utf8(data) {
        Ok(text) => text,
        Err(_) => return,
    };
    // anything that parses must print back to something that parses
    // to the same instant
    if let Ok(parsed) = UtcInstant::from_str(text) {
        let printed = parsed.to_string();
        let reparsed = UtcInstant::from_str(&printed)
            .unwrap_or_else(|err| panic!("\nprinted {:?}\nerror {}\n", printed, err));
        assert_eq!(parsed, reparsed);
    }
}

fn fuzz_tai(data: &[u8]) {
    let text = match std::str::from_utf8(data) {
        Ok(text) => text,
        Err(_) => return,
    };
    if let Ok(parsed) = TaiInstant::from_str(text) {
        assert_eq!(parsed.to_string().parse::<TaiInstant>().unwrap(), parsed);
        // conversion is total and lands on a valid instant
        let utc = parsed.to_utc();
        assert!(utc.nano_of_day() >= 0);
    }
}

fn fuzz_nist(data: &[u8]) {
    // must reject or accept cleanly, never panic
    if let Ok(list) = nist::read_bytes(data) {
        let printed = nist::format(&list);
        let reparsed = nist::read_str(&printed).unwrap();
        assert_eq!(list, reparsed);
    }
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let rest = &data[1..];
    match data[0] {
        0 => fuzz_iso(rest),
        1 => fuzz_tai(rest),
        2 => fuzz_nist(rest),
        _ => (),
    }
});
