use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::StatsConfig;
use crate::model::{CurveShape, TermStructure};
use crate::store::{DatedValue, StoredSnapshot};

/// Numeric metrics tracked over history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    SpotPrice,
    RollCarryPct,
    ContangoPct,
    SpotToFront,
    FrontToSecond,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::SpotPrice,
        Metric::RollCarryPct,
        Metric::ContangoPct,
        Metric::SpotToFront,
        Metric::FrontToSecond,
    ];

    /// Value of this metric for a stored row. Contango % is derived.
    pub fn of(&self, row: &StoredSnapshot) -> f64 {
        match self {
            Self::SpotPrice => row.spot_price,
            Self::RollCarryPct => row.roll_carry_pct,
            Self::ContangoPct => row.contango_pct(),
            Self::SpotToFront => row.spot_to_front,
            Self::FrontToSecond => row.front_to_second,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SpotPrice => "VIX",
            Self::RollCarryPct => "Roll carry %",
            Self::ContangoPct => "Contango %",
            Self::SpotToFront => "Spot to front",
            Self::FrontToSecond => "Front to second",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The current snapshot's values, to be located within history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentMetrics {
    pub spot_price: f64,
    pub roll_carry_pct: f64,
    pub contango_pct: f64,
    pub spot_to_front: f64,
    pub front_to_second: f64,
    pub curve_shape: CurveShape,
}

impl CurrentMetrics {
    pub fn from_snapshot(ts: &TermStructure) -> Self {
        Self {
            spot_price: ts.spot_price,
            roll_carry_pct: ts.roll_carry.roll_pct,
            contango_pct: ts.contango_pct(),
            spot_to_front: ts.spreads.spot_to_front,
            front_to_second: ts.spreads.front_to_second,
            curve_shape: ts.curve_shape,
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::SpotPrice => self.spot_price,
            Metric::RollCarryPct => self.roll_carry_pct,
            Metric::ContangoPct => self.contango_pct,
            Metric::SpotToFront => self.spot_to_front,
            Metric::FrontToSecond => self.front_to_second,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    High,
    Normal,
    Low,
}

impl Regime {
    /// Boundaries are inclusive: exactly `high_percentile` is `High`.
    pub fn classify(percentile: f64, config: &StatsConfig) -> Self {
        if percentile >= config.high_percentile {
            Self::High
        } else if percentile <= config.low_percentile {
            Self::Low
        } else {
            Self::Normal
        }
    }
}

/// Where one metric's current value sits within a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub current: f64,
    pub percentile: f64,
    pub z_score: f64,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub moving_avg_short: f64,
    pub moving_avg_long: f64,
    pub regime: Regime,
    pub count: usize,
}

/// Statistics over one lookback window.
///
/// A metric with too little history is absent from `metrics`; absence
/// means "not enough data", never a neutral value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub lookback_days: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub samples: usize,
    pub metrics: BTreeMap<Metric, MetricStats>,
    /// Share of days (percent) spent in each curve shape.
    pub curve_shape_distribution: BTreeMap<String, f64>,
}

impl WindowStats {
    pub fn metric(&self, metric: Metric) -> Option<&MetricStats> {
        self.metrics.get(&metric)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub percentile: f64,
    pub regime: Regime,
}

/// Condensed percentile view for one lookback window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRanking {
    pub period: String,
    pub lookback_days: u32,
    pub metrics: BTreeMap<Metric, RankEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PercentileRankings(pub Vec<PeriodRanking>);

impl PercentileRankings {
    pub fn period(&self, name: &str) -> Option<&PeriodRanking> {
        self.0.iter().find(|p| p.period == name)
    }

    pub fn percentile(&self, period: &str, metric: Metric) -> Option<f64> {
        self.period(period)?.metrics.get(&metric).map(|r| r.percentile)
    }
}

/// Human-readable name of a lookback window.
pub fn period_name(days: u32) -> String {
    match days {
        30 => "1_month".to_string(),
        90 => "3_months".to_string(),
        252 => "1_year".to_string(),
        n => format!("{n}_days"),
    }
}

/// Extremes observed within a window, each with its date.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtremeValues {
    pub lookback_days: u32,
    pub highest_spot: Option<DatedValue>,
    pub lowest_spot: Option<DatedValue>,
    pub highest_roll_carry: Option<DatedValue>,
    pub lowest_roll_carry: Option<DatedValue>,
    pub highest_spot_to_front: Option<DatedValue>,
}

/// Everything the engine knows about the current snapshot relative to
/// history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalContext {
    pub one_year_stats: WindowStats,
    pub percentile_rankings: PercentileRankings,
    pub extreme_values: ExtremeValues,
    pub insights: Vec<String>,
}
