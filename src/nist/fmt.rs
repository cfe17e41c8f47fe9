use super::{hash_input, mjd_to_ntp, sha1, NistList};
use crate::date::Gregorian;

/// Writes a list back out in the NIST format, checksum included, so
/// that parsing the result reproduces the list exactly.
pub fn format(list: &NistList) -> String {
    let mut out = String::new();
    out.push_str(&format!("#$\t{}\n", mjd_to_ntp(list.updated)));
    out.push_str(&format!("#@\t{}\n", mjd_to_ntp(list.expires)));
    for rule in list.table.rules() {
        let date = Gregorian::from_mjd(rule.effective_day);
        let month = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ][(date.month() - 1) as usize];
        out.push_str(&format!(
            "{}\t{}\t# {} {} {}\n",
            mjd_to_ntp(rule.effective_day),
            rule.offset,
            date.day(),
            month,
            date.year(),
        ));
    }
    let hash = sha1(&hash_input(&list.table, list.updated, list.expires));
    let [a, b, c, d, e] = hash.0;
    out.push_str(&format!(
        "#h\t{:08x} {:08x} {:08x} {:08x} {:08x}\n",
        a, b, c, d, e,
    ));
    out
}
