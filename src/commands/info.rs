use std::path::Path;

use anyhow::Result;
use vix_term::config::EngineConfig;

/// Entry point for the `info` command.
pub fn run(db: &Path, config: &EngineConfig) -> Result<()> {
    let store = super::open_store(db, config)?;
    let stats = store.database_stats()?;

    println!("Historical Database");
    println!("{}", "=".repeat(40));
    println!("Path: {}", db.display());
    println!("Snapshots: {}", stats.snapshots);
    println!("Contracts: {}", stats.contracts);
    println!("Inversions: {}", stats.inversions);
    if let (Some(earliest), Some(latest)) = (stats.earliest, stats.latest) {
        println!("Date range: {earliest} to {latest}");
    }

    if !stats.recent.is_empty() {
        println!("\nRecent snapshots:");
        for r in &stats.recent {
            println!("  {}  VIX {:>6.2}  {}", r.date, r.spot_price, r.curve_shape);
        }
    }
    Ok(())
}
