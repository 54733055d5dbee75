//! Statistical context: where today's metrics sit within their history.

pub mod descriptive;
pub mod insights;
pub mod types;

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use thiserror::Error;
use tracing::debug;

use crate::config::StatsConfig;
use crate::model::{CurveShape, round_to};
use crate::store::{Column, Extremum, HistoryStore, StoreError, StoredSnapshot};

pub use types::{
    CurrentMetrics, ExtremeValues, Metric, MetricStats, PercentileRankings, PeriodRanking,
    RankEntry, Regime, StatisticalContext, WindowStats, period_name,
};

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("No historical data between {start} and {end}")]
    NoData { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Computes statistics for the current snapshot against a store's history.
pub struct StatsEngine<'a> {
    store: &'a HistoryStore,
    config: &'a StatsConfig,
}

impl<'a> StatsEngine<'a> {
    pub fn new(store: &'a HistoryStore, config: &'a StatsConfig) -> Self {
        Self { store, config }
    }

    /// Full statistical context as of `as_of`: main-window stats, the
    /// multi-period rankings, extremes and insights.
    pub fn context(
        &self,
        current: &CurrentMetrics,
        as_of: NaiveDate,
    ) -> Result<StatisticalContext, StatsError> {
        let one_year_stats = self.window_stats(current, self.config.lookback_days, as_of)?;
        let percentile_rankings =
            self.percentile_rankings(current, &self.config.ranking_periods, as_of)?;
        let extreme_values = self.extreme_values(self.config.extremes_lookback_days, as_of)?;
        let insights = insights::generate(&one_year_stats, &percentile_rankings);

        Ok(StatisticalContext {
            one_year_stats,
            percentile_rankings,
            extreme_values,
            insights,
        })
    }

    /// Statistics over `[as_of - lookback_days, as_of]`.
    pub fn window_stats(
        &self,
        current: &CurrentMetrics,
        lookback_days: u32,
        as_of: NaiveDate,
    ) -> Result<WindowStats, StatsError> {
        let start = window_start(as_of, lookback_days);
        let rows = self.store.range(start, as_of)?;
        if rows.is_empty() {
            return Err(StatsError::NoData { start, end: as_of });
        }
        debug!(lookback_days, samples = rows.len(), "computing window stats");
        Ok(summarize(current, &rows, self.config, lookback_days, start, as_of))
    }

    /// Percentile and regime per metric for each of `periods`. Windows
    /// without any data are left out.
    pub fn percentile_rankings(
        &self,
        current: &CurrentMetrics,
        periods: &[u32],
        as_of: NaiveDate,
    ) -> Result<PercentileRankings, StoreError> {
        let mut rankings = Vec::with_capacity(periods.len());
        for &days in periods {
            let start = window_start(as_of, days);
            let rows = self.store.range(start, as_of)?;
            if rows.is_empty() {
                continue;
            }
            let stats = summarize(current, &rows, self.config, days, start, as_of);
            rankings.push(PeriodRanking {
                period: period_name(days),
                lookback_days: days,
                metrics: stats
                    .metrics
                    .iter()
                    .map(|(metric, s)| {
                        (
                            *metric,
                            RankEntry {
                                percentile: s.percentile,
                                regime: s.regime,
                            },
                        )
                    })
                    .collect(),
            });
        }
        Ok(PercentileRankings(rankings))
    }

    /// Highest and lowest spot and roll carry, and the highest
    /// spot-to-front spread, within the window.
    pub fn extreme_values(
        &self,
        lookback_days: u32,
        as_of: NaiveDate,
    ) -> Result<ExtremeValues, StoreError> {
        let start = window_start(as_of, lookback_days);
        let find = |column, extremum| self.store.extreme(column, extremum, start, as_of);

        Ok(ExtremeValues {
            lookback_days,
            highest_spot: find(Column::SpotPrice, Extremum::Highest)?,
            lowest_spot: find(Column::SpotPrice, Extremum::Lowest)?,
            highest_roll_carry: find(Column::RollCarryPct, Extremum::Highest)?,
            lowest_roll_carry: find(Column::RollCarryPct, Extremum::Lowest)?,
            highest_spot_to_front: find(Column::SpotToFront, Extremum::Highest)?,
        })
    }
}

fn window_start(as_of: NaiveDate, lookback_days: u32) -> NaiveDate {
    as_of
        .checked_sub_days(Days::new(lookback_days as u64))
        .unwrap_or(NaiveDate::MIN)
}

/// Window statistics over already-fetched rows (oldest first).
pub fn summarize(
    current: &CurrentMetrics,
    rows: &[StoredSnapshot],
    config: &StatsConfig,
    lookback_days: u32,
    start: NaiveDate,
    end: NaiveDate,
) -> WindowStats {
    let mut metrics = BTreeMap::new();
    for metric in Metric::ALL {
        let values: Vec<f64> = rows
            .iter()
            .filter(|r| metric != Metric::ContangoPct || r.spot_price > 0.0)
            .map(|r| metric.of(r))
            .filter(|v| v.is_finite())
            .collect();
        if values.len() < config.min_samples || values.is_empty() {
            continue;
        }
        metrics.insert(metric, metric_stats(current.get(metric), &values, config));
    }

    WindowStats {
        lookback_days,
        start,
        end,
        samples: rows.len(),
        metrics,
        curve_shape_distribution: shape_distribution(rows),
    }
}

fn metric_stats(current: f64, values: &[f64], config: &StatsConfig) -> MetricStats {
    let mean = descriptive::mean(values);
    let std = descriptive::std_dev(values);
    let percentile = descriptive::percentile_of_score(values, current);

    MetricStats {
        current,
        percentile: round_to(percentile, 1),
        z_score: round_to(descriptive::z_score(current, mean, std), 2),
        mean: round_to(mean, 4),
        std: round_to(std, 4),
        min: descriptive::min(values),
        max: descriptive::max(values),
        moving_avg_short: round_to(descriptive::trailing_mean(values, config.short_ma_window), 4),
        moving_avg_long: round_to(descriptive::trailing_mean(values, config.long_ma_window), 4),
        regime: Regime::classify(percentile, config),
        count: values.len(),
    }
}

/// Percentage of rows in each curve shape, keyed by canonical label.
fn shape_distribution(rows: &[StoredSnapshot]) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for row in rows {
        let label = row
            .curve_shape
            .parse::<CurveShape>()
            .map(|s| s.to_string())
            .unwrap_or_else(|_| row.curve_shape.clone());
        *counts.entry(label).or_default() += 1;
    }

    let total = rows.len() as f64;
    counts
        .into_iter()
        .map(|(label, n)| (label, round_to(n as f64 * 100.0 / total, 1)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(day: u32, spot: f64, shape: &str) -> StoredSnapshot {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(day as u64);
        StoredSnapshot {
            timestamp: format!("{date}T16:00:00"),
            date_only: date,
            spot_price: spot,
            num_contracts: 3,
            curve_shape: shape.to_string(),
            trading_signal: "neutral".to_string(),
            roll_carry_pct: 0.1,
            roll_carry_pts: 0.02,
            synthetic_index: spot + 1.0,
            spot_to_front: 1.0,
            front_to_second: 0.5,
            front_month_price: Some(spot + 1.0),
            second_month_price: Some(spot + 1.5),
        }
    }

    fn current(spot: f64) -> CurrentMetrics {
        CurrentMetrics {
            spot_price: spot,
            roll_carry_pct: 0.1,
            contango_pct: 5.0,
            spot_to_front: 1.0,
            front_to_second: 0.5,
            curve_shape: CurveShape::SteepContango,
        }
    }

    fn dates() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
    }

    #[test]
    fn test_metrics_below_min_samples_are_absent() {
        let rows: Vec<_> = (0..19).map(|d| row(d, 15.0 + d as f64, "steep contango")).collect();
        let (start, end) = dates();
        let stats = summarize(&current(20.0), &rows, &StatsConfig::default(), 252, start, end);
        assert!(stats.metrics.is_empty());
        assert_eq!(stats.samples, 19);
        assert_eq!(stats.curve_shape_distribution["steep contango"], 100.0);
    }

    #[test]
    fn test_moving_averages_and_regime() {
        // spot 10..=49, forty samples
        let rows: Vec<_> = (0..40).map(|d| row(d, 10.0 + d as f64, "steep contango")).collect();
        let (start, end) = dates();
        let stats = summarize(&current(49.0), &rows, &StatsConfig::default(), 252, start, end);
        let spot = stats.metric(Metric::SpotPrice).unwrap();

        assert_eq!(spot.count, 40);
        assert_eq!(spot.min, 10.0);
        assert_eq!(spot.max, 49.0);
        assert_eq!(spot.mean, 29.5);
        // last 30 samples: 20..=49
        assert_eq!(spot.moving_avg_short, 34.5);
        // fewer than 60 samples: full mean
        assert_eq!(spot.moving_avg_long, 29.5);
        assert_eq!(spot.percentile, 98.8);
        assert_eq!(spot.regime, Regime::High);
        assert!(spot.z_score > 1.0);
    }

    #[test]
    fn test_regime_boundaries_are_inclusive() {
        let cfg = StatsConfig::default();
        assert_eq!(Regime::classify(80.0, &cfg), Regime::High);
        assert_eq!(Regime::classify(20.0, &cfg), Regime::Low);
        assert_eq!(Regime::classify(79.9, &cfg), Regime::Normal);
        assert_eq!(Regime::classify(20.1, &cfg), Regime::Normal);
    }

    #[test]
    fn test_exact_80th_percentile_is_high() {
        // spot 10..=29; 16 of the 20 samples lie below 25.5
        let rows: Vec<_> = (0..20).map(|d| row(d, 10.0 + d as f64, "mild contango")).collect();
        let (start, end) = dates();
        let stats = summarize(&current(25.5), &rows, &StatsConfig::default(), 252, start, end);
        let spot = stats.metric(Metric::SpotPrice).unwrap();
        assert_eq!(spot.percentile, 80.0);
        assert_eq!(spot.regime, Regime::High);

        let stats = summarize(&current(13.5), &rows, &StatsConfig::default(), 252, start, end);
        let spot = stats.metric(Metric::SpotPrice).unwrap();
        assert_eq!(spot.percentile, 20.0);
        assert_eq!(spot.regime, Regime::Low);
    }

    #[test]
    fn test_regime_uses_unrounded_percentile() {
        // spot 1..=202; 162 ranks at 79.95, reported as 80.0
        let rows: Vec<_> = (0..202).map(|d| row(d, 1.0 + d as f64, "mild contango")).collect();
        let (start, end) = dates();
        let config = StatsConfig::default();

        let stats = summarize(&current(162.0), &rows, &config, 252, start, end);
        let spot = stats.metric(Metric::SpotPrice).unwrap();
        assert_eq!(spot.percentile, 80.0);
        assert_eq!(spot.regime, Regime::Normal);

        // 41 ranks at 20.05, reported as 20.0
        let stats = summarize(&current(41.0), &rows, &config, 252, start, end);
        let spot = stats.metric(Metric::SpotPrice).unwrap();
        assert_eq!(spot.percentile, 20.0);
        assert_eq!(spot.regime, Regime::Normal);
    }

    #[test]
    fn test_shape_distribution_normalizes_labels() {
        let rows = vec![
            row(0, 15.0, "Steep Contango"),
            row(1, 15.0, "steep contango"),
            row(2, 15.0, "mixed/kinked"),
            row(3, 15.0, "mild backwardation"),
        ];
        let dist = shape_distribution(&rows);
        assert_eq!(dist["steep contango"], 50.0);
        assert_eq!(dist["mixed/kinked"], 25.0);
        assert_eq!(dist["mild backwardation"], 25.0);
    }

    #[test]
    fn test_period_names() {
        assert_eq!(period_name(30), "1_month");
        assert_eq!(period_name(90), "3_months");
        assert_eq!(period_name(252), "1_year");
        assert_eq!(period_name(14), "14_days");
    }
}
