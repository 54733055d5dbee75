//! Ties the pieces together: build a snapshot, persist it, compare it with
//! the previous trading day and locate it within its history.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis;
use crate::changes::{self, HistoricalComparison};
use crate::config::EngineConfig;
use crate::model::{SnapshotInput, TermStructure};
use crate::stats::{CurrentMetrics, StatisticalContext, StatsEngine, StatsError};
use crate::store::HistoryStore;

/// One analysis run, ready for serialization.
///
/// Historical sections are absent when the analyzer runs without a store.
/// A failed store write or lookup leaves the snapshot itself intact and is
/// reported in the matching `*_error` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub snapshot: TermStructure,

    #[serde(flatten)]
    pub history: Option<HistoricalComparison>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistical_context: Option<StatisticalContext>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stored: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics_error: Option<String>,
}

impl AnalysisReport {
    fn snapshot_only(snapshot: TermStructure) -> Self {
        Self {
            snapshot,
            history: None,
            statistical_context: None,
            stored: false,
            storage_error: None,
            historical_error: None,
            statistics_error: None,
        }
    }

    pub fn has_previous_data(&self) -> bool {
        self.history.as_ref().is_some_and(|h| h.has_previous_data)
    }
}

/// Runs the full analysis pipeline for one snapshot.
pub struct TermStructureAnalyzer<'a> {
    store: Option<&'a mut HistoryStore>,
    config: &'a EngineConfig,
}

impl<'a> TermStructureAnalyzer<'a> {
    /// Analyzer that persists snapshots and adds historical context.
    pub fn new(store: &'a mut HistoryStore, config: &'a EngineConfig) -> Self {
        Self {
            store: Some(store),
            config,
        }
    }

    /// Analyzer that only builds the snapshot.
    pub fn without_history(config: &'a EngineConfig) -> Self {
        Self {
            store: None,
            config,
        }
    }

    pub fn analyze(&mut self, input: &SnapshotInput, timestamp: NaiveDateTime) -> AnalysisReport {
        let snapshot = analysis::build(input, timestamp);
        info!(
            spot = snapshot.spot_price,
            contracts = snapshot.num_contracts,
            curve_shape = %snapshot.curve_shape,
            signal = %snapshot.trading_signal,
            "built term structure"
        );

        let Some(store) = self.store.as_deref_mut() else {
            return AnalysisReport::snapshot_only(snapshot);
        };
        let mut report = AnalysisReport::snapshot_only(snapshot);

        match store.store(&report.snapshot) {
            Ok(()) => report.stored = true,
            Err(e) => {
                warn!(error = %e, "failed to store snapshot");
                report.storage_error = Some(e.to_string());
            }
        }

        let date = report.snapshot.date_only();
        report.history = Some(match store.previous_trading_day(date) {
            Ok(previous) => changes::compare(&report.snapshot, previous.as_ref()),
            Err(e) => {
                warn!(error = %e, "previous trading day lookup failed");
                report.historical_error = Some(e.to_string());
                HistoricalComparison::unavailable(format!("Historical lookup failed: {e}"))
            }
        });

        let current = CurrentMetrics::from_snapshot(&report.snapshot);
        let engine = StatsEngine::new(store, &self.config.stats);
        match engine.context(&current, date) {
            Ok(context) => report.statistical_context = Some(context),
            Err(e @ StatsError::NoData { .. }) => {
                info!(reason = %e, "skipping statistical context");
                report.statistics_error = Some(e.to_string());
            }
            Err(e) => {
                warn!(error = %e, "statistical context failed");
                report.statistics_error = Some(e.to_string());
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::ContractInput;

    fn input(spot: f64) -> SnapshotInput {
        SnapshotInput {
            spot_price: spot,
            contracts: vec![ContractInput {
                symbol: "F1".into(),
                price: 28.0,
                days_to_expiration: 10,
                expiration_date: None,
            }],
        }
    }

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_without_history_omits_historical_keys() {
        let config = EngineConfig::default();
        let mut analyzer = TermStructureAnalyzer::without_history(&config);
        let report = analyzer.analyze(&input(30.0), at(11));

        assert_eq!(report.snapshot.trading_signal.as_str(), "inversion alert");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["spot_price"], 30.0);
        assert_eq!(json["curve_shape"], "insufficient data");
        assert!(json.get("has_previous_data").is_none());
        assert!(json.get("statistical_context").is_none());
    }

    #[test]
    fn test_first_run_has_no_previous_data() {
        let config = EngineConfig::default();
        let mut store = HistoryStore::open_in_memory().unwrap();
        let mut analyzer = TermStructureAnalyzer::new(&mut store, &config);
        let report = analyzer.analyze(&input(30.0), at(11));

        assert!(report.stored);
        assert!(!report.has_previous_data());
        // One stored row is below the sample threshold: context exists,
        // but no metric is reported.
        let context = report.statistical_context.as_ref().unwrap();
        assert!(context.one_year_stats.metrics.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["has_previous_data"], false);
        assert_eq!(json["changes"]["summary"], changes::NO_PREVIOUS_SUMMARY);
    }
}
