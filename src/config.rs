use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunables for the statistical context engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Main lookback window, in calendar days.
    pub lookback_days: u32,
    /// Windows used for the condensed multi-period percentile view.
    pub ranking_periods: Vec<u32>,
    /// Minimum historical samples before a metric is reported.
    pub min_samples: usize,
    /// Percentile at or above which a metric is in the `High` regime.
    pub high_percentile: f64,
    /// Percentile at or below which a metric is in the `Low` regime.
    pub low_percentile: f64,
    pub short_ma_window: usize,
    pub long_ma_window: usize,
    /// Window searched for extreme values.
    pub extremes_lookback_days: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            lookback_days: 252,
            ranking_periods: vec![30, 90, 252],
            min_samples: 20,
            high_percentile: 80.0,
            low_percentile: 20.0,
            short_ma_window: 30,
            long_ma_window: 60,
            extremes_lookback_days: 252,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
        }
    }
}

/// Engine configuration. Every field is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub stats: StatsConfig,
    pub store: StoreConfig,
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config at {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("parsing config at {}", path.display()))
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
