use std::path::Path;

use anyhow::Result;
use chrono::{Days, Local};
use vix_term::config::EngineConfig;

/// Entry point for the `history` command.
pub fn run(days: u32, db: &Path, config: &EngineConfig) -> Result<()> {
    let store = super::open_store(db, config)?;
    let end = Local::now().date_naive();
    let start = end
        .checked_sub_days(Days::new(days as u64))
        .unwrap_or(chrono::NaiveDate::MIN);
    let rows = store.range(start, end)?;

    if rows.is_empty() {
        println!("No snapshots stored between {start} and {end}.");
        return Ok(());
    }

    println!(
        "{:<26} {:>7} {:>8} {:>8} {:>8}  {:<20} {}",
        "TIMESTAMP", "SPOT", "S->F", "F->S", "ROLL%", "SHAPE", "SIGNAL"
    );
    println!("{}", "-".repeat(110));
    for r in &rows {
        println!(
            "{:<26} {:>7.2} {:>+8.2} {:>+8.2} {:>+8.2}  {:<20} {}",
            r.timestamp,
            r.spot_price,
            r.spot_to_front,
            r.front_to_second,
            r.roll_carry_pct,
            r.curve_shape,
            r.trading_signal
        );
    }
    println!("{} snapshots", rows.len());
    Ok(())
}
