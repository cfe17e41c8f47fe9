use anyhow::{Context, Result};

use leaptime::date::Gregorian;

fn main() -> Result<()> {
    let name = std::env::args()
        .nth(1)
        .context("usage: leaptime <leap-seconds.list>")?;
    let list = leaptime::nist::read_file(&name)?;
    println!("updated {}", Gregorian::from_mjd(list.updated));
    println!("expires {}", Gregorian::from_mjd(list.expires));
    for rule in list.table.rules() {
        println!(
            "{} mjd {} DTAI {}",
            Gregorian::from_mjd(rule.effective_day),
            rule.effective_day,
            rule.offset,
        );
    }
    Ok(())
}
