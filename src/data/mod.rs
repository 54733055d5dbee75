//! Loading analysis inputs and legacy analysis files from disk.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{ContractInput, SnapshotInput};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON parse error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Spot price must be positive, got {0}")]
    InvalidSpotPrice(f64),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let contents = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn check_spot(spot_price: f64) -> Result<(), InputError> {
    if spot_price > 0.0 && spot_price.is_finite() {
        Ok(())
    } else {
        Err(InputError::InvalidSpotPrice(spot_price))
    }
}

/// Load a snapshot input document (`{"spot_price": .., "contracts": [..]}`).
pub fn load_snapshot(path: &Path) -> Result<SnapshotInput, InputError> {
    let input: SnapshotInput = read_json(path)?;
    check_spot(input.spot_price)?;
    Ok(input)
}

/// Load futures quotes from a CSV file with the header
/// `symbol,price,days_to_expiration[,expiration_date]`.
pub fn load_futures_csv(path: &Path) -> Result<Vec<ContractInput>, InputError> {
    let csv_err = |source| InputError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::Reader::from_path(path).map_err(csv_err)?;
    let rows: Vec<ContractInput> = rdr
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .map_err(csv_err)?;
    debug!(path = %path.display(), rows = rows.len(), "loaded futures csv");
    Ok(rows)
}

/// Combine a spot level with a futures CSV into one input.
pub fn snapshot_from_csv(spot_price: f64, futures: &Path) -> Result<SnapshotInput, InputError> {
    check_spot(spot_price)?;
    Ok(SnapshotInput {
        spot_price,
        contracts: load_futures_csv(futures)?,
    })
}

/// Read every `*.json` file in `dir`, sorted by file name.
///
/// Files that cannot be read or parsed become `Value::Null` so the
/// migration counts them as skipped instead of aborting the batch.
pub fn read_json_dir(dir: &Path) -> Result<Vec<Value>, InputError> {
    let io_err = |source| InputError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(io_err)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    Ok(paths
        .iter()
        .map(|path| {
            read_json::<Value>(path).unwrap_or_else(|e| {
                warn!(error = %e, "unreadable analysis file");
                Value::Null
            })
        })
        .collect())
}
