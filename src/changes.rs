//! Day-over-day comparison against the previous trading day's snapshot.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{TermStructure, round_to};
use crate::store::PreviousDay;

pub const NO_PREVIOUS_SUMMARY: &str = "No previous data available for comparison";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Unchanged,
}

impl Direction {
    pub fn of(delta: f64) -> Self {
        if delta > 0.0 {
            Self::Up
        } else if delta < 0.0 {
            Self::Down
        } else {
            Self::Unchanged
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericChange {
    pub absolute: f64,
    /// Relative change in percent; 0 when the baseline is 0.
    pub percentage: f64,
    pub direction: Direction,
    pub from: f64,
    pub to: f64,
}

impl NumericChange {
    pub fn between(previous: f64, current: f64) -> Self {
        let absolute = current - previous;
        let percentage = if previous != 0.0 {
            absolute / previous * 100.0
        } else {
            0.0
        };
        Self {
            absolute: round_to(absolute, 4),
            percentage: round_to(percentage, 2),
            direction: Direction::of(absolute),
            from: previous,
            to: current,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelChange {
    pub changed: bool,
    pub from: String,
    pub to: String,
}

impl LabelChange {
    pub fn between(previous: &str, current: &str) -> Self {
        Self {
            changed: previous != current,
            from: previous.to_string(),
            to: current.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractChange {
    pub symbol: String,
    pub current_price: f64,
    pub previous_price: f64,
    #[serde(flatten)]
    pub change: NumericChange,
}

/// The previous day's headline values, as reported alongside the changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousSummary {
    pub date: NaiveDate,
    pub spot_price: f64,
    pub curve_shape: String,
    pub trading_signal: String,
    pub roll_carry_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayChanges {
    pub days_since_previous: u32,
    pub previous_date: NaiveDate,
    pub spot_price: NumericChange,
    pub curve_shape: LabelChange,
    pub trading_signal: LabelChange,
    pub roll_carry: NumericChange,
    pub contracts: Vec<ContractChange>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Changes {
    Compared(DayChanges),
    Unavailable { summary: String },
}

impl Changes {
    pub fn summary(&self) -> &str {
        match self {
            Self::Compared(c) => &c.summary,
            Self::Unavailable { summary } => summary,
        }
    }
}

/// Result of comparing a snapshot with the previous trading day.
/// Numeric changes exist only when `has_previous_data` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalComparison {
    pub has_previous_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<PreviousSummary>,
    pub changes: Changes,
}

impl HistoricalComparison {
    pub fn unavailable(summary: impl Into<String>) -> Self {
        Self {
            has_previous_data: false,
            previous: None,
            changes: Changes::Unavailable {
                summary: summary.into(),
            },
        }
    }

    pub fn day_changes(&self) -> Option<&DayChanges> {
        match &self.changes {
            Changes::Compared(c) => Some(c),
            Changes::Unavailable { .. } => None,
        }
    }
}

/// Compare `current` with `previous`, if there is one.
pub fn compare(current: &TermStructure, previous: Option<&PreviousDay>) -> HistoricalComparison {
    let Some(prev) = previous else {
        return HistoricalComparison::unavailable(NO_PREVIOUS_SUMMARY);
    };
    let row = &prev.snapshot;

    let spot_price = NumericChange::between(row.spot_price, current.spot_price);
    let roll_carry = NumericChange::between(row.roll_carry_pct, current.roll_carry.roll_pct);
    let curve_shape = LabelChange::between(&row.curve_shape, current.curve_shape.as_str());
    let trading_signal = LabelChange::between(&row.trading_signal, current.trading_signal.as_str());

    let previous_prices: HashMap<&str, f64> = prev
        .contracts
        .iter()
        .map(|c| (c.symbol.as_str(), c.price))
        .collect();
    let contracts = current
        .contracts
        .iter()
        .filter_map(|c| {
            let previous_price = *previous_prices.get(c.symbol.as_str())?;
            Some(ContractChange {
                symbol: c.symbol.clone(),
                current_price: c.price,
                previous_price,
                change: NumericChange::between(previous_price, c.price),
            })
        })
        .collect();

    let summary = summarize(current.spot_price, &spot_price, &curve_shape, prev.days_back);

    HistoricalComparison {
        has_previous_data: true,
        previous: Some(PreviousSummary {
            date: row.date_only,
            spot_price: row.spot_price,
            curve_shape: row.curve_shape.clone(),
            trading_signal: row.trading_signal.clone(),
            roll_carry_pct: row.roll_carry_pct,
        }),
        changes: Changes::Compared(DayChanges {
            days_since_previous: prev.days_back,
            previous_date: row.date_only,
            spot_price,
            curve_shape,
            trading_signal,
            roll_carry,
            contracts,
            summary,
        }),
    }
}

fn days_ago(days: u32) -> String {
    if days == 1 {
        "1 day ago".to_string()
    } else {
        format!("{days} days ago")
    }
}

fn summarize(spot: f64, spot_change: &NumericChange, shape: &LabelChange, days_back: u32) -> String {
    let when = days_ago(days_back);
    let mut summary = match spot_change.direction {
        Direction::Unchanged => format!("VIX unchanged at {spot:.2} from {when}"),
        direction => {
            let word = if direction == Direction::Up { "up" } else { "down" };
            format!(
                "VIX {word} {:.2} points ({:+.1}%) from {when}",
                spot_change.absolute.abs(),
                spot_change.percentage
            )
        }
    };

    if shape.changed {
        summary.push_str(&format!(". Curve changed from {} to {}", shape.from, shape.to));
    } else {
        summary.push_str(&format!(". Curve remains in {}", shape.to.to_lowercase()));
    }
    summary
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::analysis;
    use crate::model::{Contract, ContractInput, SnapshotInput};
    use crate::store::StoredSnapshot;

    fn snapshot(spot: f64, quotes: &[(&str, f64, u32)]) -> TermStructure {
        let input = SnapshotInput {
            spot_price: spot,
            contracts: quotes
                .iter()
                .map(|(s, p, d)| ContractInput {
                    symbol: s.to_string(),
                    price: *p,
                    days_to_expiration: *d,
                    expiration_date: None,
                })
                .collect(),
        };
        let ts = NaiveDate::from_ymd_opt(2024, 3, 11)
            .unwrap()
            .and_hms_opt(16, 0, 0)
            .unwrap();
        analysis::build(&input, ts)
    }

    fn previous(spot: f64, shape: &str, contracts: &[(&str, f64)], days_back: u32) -> PreviousDay {
        let date = NaiveDate::from_ymd_opt(2024, 3, 8).unwrap();
        PreviousDay {
            snapshot: StoredSnapshot {
                timestamp: "2024-03-08T16:00:00".into(),
                date_only: date,
                spot_price: spot,
                num_contracts: contracts.len(),
                curve_shape: shape.into(),
                trading_signal: "neutral".into(),
                roll_carry_pct: -0.1,
                roll_carry_pts: -0.02,
                synthetic_index: 19.0,
                spot_to_front: 1.0,
                front_to_second: 0.5,
                front_month_price: None,
                second_month_price: None,
            },
            contracts: contracts
                .iter()
                .enumerate()
                .map(|(i, (s, p))| Contract {
                    symbol: s.to_string(),
                    price: *p,
                    days_to_expiration: 10 + 30 * i as u32,
                    expiration_date: None,
                    order: i,
                })
                .collect(),
            inversions: vec![],
            days_back,
        }
    }

    #[test]
    fn test_numeric_change() {
        let c = NumericChange::between(20.0, 22.0);
        assert_eq!(c.absolute, 2.0);
        assert_eq!(c.percentage, 10.0);
        assert_eq!(c.direction, Direction::Up);

        let zero_base = NumericChange::between(0.0, 1.5);
        assert_eq!(zero_base.percentage, 0.0);
        assert_eq!(zero_base.direction, Direction::Up);

        assert_eq!(NumericChange::between(3.0, 3.0).direction, Direction::Unchanged);
        assert_eq!(NumericChange::between(3.0, 2.0).direction, Direction::Down);
    }

    #[test]
    fn test_no_previous_data() {
        let current = snapshot(18.0, &[("F1", 19.0, 10)]);
        let cmp = compare(&current, None);
        assert!(!cmp.has_previous_data);
        assert!(cmp.previous.is_none());
        assert!(cmp.day_changes().is_none());
        assert_eq!(cmp.changes.summary(), NO_PREVIOUS_SUMMARY);

        let json = serde_json::to_value(&cmp).unwrap();
        assert_eq!(json["changes"]["summary"], NO_PREVIOUS_SUMMARY);
        assert!(json["changes"].get("spot_price").is_none());
    }

    #[test]
    fn test_weekend_gap_summary_and_contract_matching() {
        let current = snapshot(
            19.0,
            &[("F1", 19.5, 7), ("F2", 20.0, 37), ("F3", 20.4, 67)],
        );
        let prev = previous(20.0, "steep contango", &[("F0", 19.0), ("F1", 20.0), ("F2", 20.0)], 3);
        let cmp = compare(&current, Some(&prev));

        assert!(cmp.has_previous_data);
        let changes = cmp.day_changes().unwrap();
        assert_eq!(changes.days_since_previous, 3);
        assert_eq!(changes.spot_price.absolute, -1.0);
        assert_eq!(changes.spot_price.percentage, -5.0);
        assert!(!changes.curve_shape.changed);

        let symbols: Vec<&str> = changes.contracts.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, ["F1", "F2"]);
        assert_eq!(changes.contracts[0].change.absolute, -0.5);
        assert_eq!(changes.contracts[1].change.direction, Direction::Unchanged);

        assert_eq!(
            changes.summary,
            "VIX down 1.00 points (-5.0%) from 3 days ago. Curve remains in steep contango"
        );
    }

    #[test]
    fn test_curve_change_summary() {
        let current = snapshot(
            18.0,
            &[("F1", 19.0, 10), ("F2", 19.5, 40), ("F3", 20.1, 70)],
        );
        let prev = previous(18.0, "mixed/kinked", &[], 1);
        let cmp = compare(&current, Some(&prev));
        let changes = cmp.day_changes().unwrap();
        assert!(changes.curve_shape.changed);
        assert_eq!(
            changes.summary,
            "VIX unchanged at 18.00 from 1 day ago. Curve changed from mixed/kinked to steep contango"
        );
        assert!(changes.contracts.is_empty());
    }
}
