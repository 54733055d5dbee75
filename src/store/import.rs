//! Bulk import of analysis records written by older tooling.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{HistoryStore, StoredSnapshot};
use crate::analysis;
use crate::model::snapshot::{format_timestamp, parse_timestamp};
use crate::model::{
    Contract, ContractInput, CurveShape, Inversion, InversionKind, SPOT_LABEL, Spreads,
    TradingSignal,
};
use crate::store::MigrationReport;

#[derive(Debug, Deserialize)]
struct LegacyRecord {
    timestamp: String,
    #[serde(alias = "spot_vix")]
    spot_price: f64,
    #[serde(default)]
    num_contracts: Option<usize>,
    #[serde(default)]
    curve_shape: Option<String>,
    #[serde(default)]
    trading_signal: Option<String>,
    #[serde(default, alias = "points_spreads")]
    spreads: LegacySpreads,
    #[serde(default)]
    roll_carry: LegacyRollCarry,
    #[serde(default)]
    inversions: Vec<LegacyInversion>,
    #[serde(default, alias = "futures_data")]
    contracts: Vec<LegacyContract>,
}

#[derive(Debug, Default, Deserialize)]
struct LegacySpreads {
    #[serde(default)]
    spot_to_front: f64,
    #[serde(default)]
    front_to_second: f64,
    #[serde(default)]
    front_month: Option<f64>,
    #[serde(default)]
    second_month: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LegacyRollCarry {
    #[serde(default)]
    roll_pct: f64,
    #[serde(default, alias = "roll_pts")]
    roll_points: f64,
    #[serde(default)]
    synthetic_index: f64,
}

#[derive(Debug, Deserialize)]
struct LegacyInversion {
    contract1: String,
    contract2: String,
    price1: f64,
    price2: f64,
    magnitude: f64,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LegacyContract {
    symbol: String,
    price: f64,
    #[serde(default)]
    days_to_expiration: u32,
    #[serde(default, alias = "expiration")]
    expiration_date: Option<String>,
}

impl LegacyInversion {
    fn into_inversion(self) -> Inversion {
        let kind = self
            .kind
            .as_deref()
            .and_then(|k| k.parse().ok())
            .unwrap_or(if self.contract1 == SPOT_LABEL {
                InversionKind::SpotInversion
            } else {
                InversionKind::ContractInversion
            });
        Inversion {
            kind,
            contract1: self.contract1,
            contract2: self.contract2,
            price1: self.price1,
            price2: self.price2,
            magnitude: self.magnitude,
        }
    }
}

fn parse_expiration(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

/// Keep a label in its canonical spelling when we recognise it.
fn normalize_label<T: std::str::FromStr + std::fmt::Display>(raw: &str) -> String {
    raw.parse::<T>()
        .map(|v| v.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

impl HistoryStore {
    /// Import externally produced snapshot records.
    ///
    /// Records without a parseable `timestamp` and `spot_price` are
    /// skipped; a record that fails to write is counted as failed and the
    /// batch carries on. Stored values are taken as given, and since each
    /// record is upserted by timestamp, importing the same batch twice
    /// leaves the store unchanged.
    pub fn migrate(&mut self, records: &[Value]) -> MigrationReport {
        let mut report = MigrationReport::default();

        for (i, value) in records.iter().enumerate() {
            let Some((row, contracts, inversions)) = legacy_rows(value) else {
                debug!(index = i, "skipping record without timestamp/spot_price");
                report.skipped += 1;
                continue;
            };

            match self.write(&row, &contracts, &inversions) {
                Ok(()) => report.migrated += 1,
                Err(e) => {
                    warn!(timestamp = %row.timestamp, error = %e, "failed to migrate record");
                    report.failed += 1;
                }
            }
        }

        info!(
            migrated = report.migrated,
            skipped = report.skipped,
            failed = report.failed,
            "migration complete"
        );
        report
    }
}

fn legacy_rows(value: &Value) -> Option<(StoredSnapshot, Vec<Contract>, Vec<Inversion>)> {
    let record: LegacyRecord = serde_json::from_value(value.clone()).ok()?;
    let timestamp = parse_timestamp(&record.timestamp)?;

    let inputs: Vec<ContractInput> = record
        .contracts
        .into_iter()
        .map(|c| ContractInput {
            expiration_date: c.expiration_date.as_deref().and_then(parse_expiration),
            symbol: c.symbol,
            price: c.price,
            days_to_expiration: c.days_to_expiration,
        })
        .collect();
    let contracts = analysis::prepare_contracts(&inputs);
    let inversions: Vec<Inversion> = record
        .inversions
        .into_iter()
        .map(LegacyInversion::into_inversion)
        .collect();

    let curve_shape = match record.curve_shape.as_deref() {
        Some(raw) => normalize_label::<CurveShape>(raw),
        None => analysis::classify_curve_shape(&contracts).to_string(),
    };
    let trading_signal = match record.trading_signal.as_deref() {
        Some(raw) => normalize_label::<TradingSignal>(raw),
        None => {
            let spreads = Spreads {
                spot_to_front: record.spreads.spot_to_front,
                ..Spreads::default()
            };
            analysis::trading_signal(&spreads, &inversions).to_string()
        }
    };

    let row = StoredSnapshot {
        timestamp: format_timestamp(&timestamp),
        date_only: timestamp.date(),
        spot_price: record.spot_price,
        num_contracts: record.num_contracts.unwrap_or(contracts.len()),
        curve_shape,
        trading_signal,
        roll_carry_pct: record.roll_carry.roll_pct,
        roll_carry_pts: record.roll_carry.roll_points,
        synthetic_index: record.roll_carry.synthetic_index,
        spot_to_front: record.spreads.spot_to_front,
        front_to_second: record.spreads.front_to_second,
        front_month_price: record
            .spreads
            .front_month
            .or_else(|| contracts.first().map(|c| c.price)),
        second_month_price: record
            .spreads
            .second_month
            .or_else(|| contracts.get(1).map(|c| c.price)),
    };

    Some((row, contracts, inversions))
}
