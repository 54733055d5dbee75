pub mod analyze;
pub mod history;
pub mod info;
pub mod migrate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use vix_term::config::EngineConfig;
use vix_term::store::HistoryStore;

/// Where the history database lives by default.
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vix-term")
        .join("vix_historical.db")
}

pub fn open_store(path: &Path, config: &EngineConfig) -> Result<HistoryStore> {
    HistoryStore::open(path, &config.store)
        .with_context(|| format!("opening history database at {}", path.display()))
}
