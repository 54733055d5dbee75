use std::path::Path;

use anyhow::{Context, Result};
use vix_term::config::EngineConfig;
use vix_term::data;

/// Entry point for the `migrate` command.
pub fn run(dir: &Path, db: &Path, config: &EngineConfig) -> Result<()> {
    let records = data::read_json_dir(dir)
        .with_context(|| format!("reading analysis files from {}", dir.display()))?;
    if records.is_empty() {
        println!("No JSON files found in {}", dir.display());
        return Ok(());
    }

    println!("Migrating {} files from {}...", records.len(), dir.display());
    let mut store = super::open_store(db, config)?;
    let report = store.migrate(&records);
    store.close()?;

    println!(
        "Migration complete: {} migrated, {} skipped, {} failed",
        report.migrated, report.skipped, report.failed
    );
    Ok(())
}
