use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{Contract, Inversion, TermStructure};

/// One row of the `snapshots` table.
///
/// Curve shape and trading signal are kept as their stored labels so rows
/// imported from older tooling stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSnapshot {
    pub timestamp: String,
    pub date_only: NaiveDate,
    pub spot_price: f64,
    pub num_contracts: usize,
    pub curve_shape: String,
    pub trading_signal: String,
    pub roll_carry_pct: f64,
    pub roll_carry_pts: f64,
    pub synthetic_index: f64,
    pub spot_to_front: f64,
    pub front_to_second: f64,
    pub front_month_price: Option<f64>,
    pub second_month_price: Option<f64>,
}

impl StoredSnapshot {
    pub fn from_term_structure(ts: &TermStructure) -> Self {
        Self {
            timestamp: ts.timestamp_key(),
            date_only: ts.date_only(),
            spot_price: ts.spot_price,
            num_contracts: ts.num_contracts,
            curve_shape: ts.curve_shape.to_string(),
            trading_signal: ts.trading_signal.to_string(),
            roll_carry_pct: ts.roll_carry.roll_pct,
            roll_carry_pts: ts.roll_carry.roll_points,
            synthetic_index: ts.roll_carry.synthetic_index,
            spot_to_front: ts.spreads.spot_to_front,
            front_to_second: ts.spreads.front_to_second,
            front_month_price: ts.spreads.front_month,
            second_month_price: ts.spreads.second_month,
        }
    }

    /// Spot-to-front spread as a percentage of spot.
    pub fn contango_pct(&self) -> f64 {
        crate::model::snapshot::contango_pct(self.spot_to_front, self.spot_price)
    }
}

/// The most recent stored snapshot before a reference date, with its
/// child rows and the calendar distance it was found at.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviousDay {
    pub snapshot: StoredSnapshot,
    pub contracts: Vec<Contract>,
    pub inversions: Vec<Inversion>,
    pub days_back: u32,
}

/// Numeric columns that can be ranked directly in SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    SpotPrice,
    RollCarryPct,
    SpotToFront,
    FrontToSecond,
}

impl Column {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SpotPrice => "spot_price",
            Self::RollCarryPct => "roll_carry_pct",
            Self::SpotToFront => "spot_to_front",
            Self::FrontToSecond => "front_to_second",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Highest,
    Lowest,
}

/// A single extreme value and the day it occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedValue {
    pub value: f64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentRecord {
    pub date: NaiveDate,
    pub spot_price: f64,
    pub curve_shape: String,
}

/// Summary of what the store holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub snapshots: u64,
    pub contracts: u64,
    pub inversions: u64,
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
    pub recent: Vec<RecentRecord>,
}

/// Outcome of a bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MigrationReport {
    pub migrated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl MigrationReport {
    pub fn total(&self) -> usize {
        self.migrated + self.skipped + self.failed
    }
}
