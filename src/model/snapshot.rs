use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::contract::Contract;

/// Timestamp format used for snapshot keys.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Point spreads between spot, front and second month.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Spreads {
    pub spot_to_front: f64,
    pub front_to_second: f64,
    pub spot_price: f64,
    pub front_month: Option<f64>,
    pub second_month: Option<f64>,
}

/// Constant-maturity roll carry derived from the first two contracts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RollCarry {
    pub roll_points: f64,
    pub synthetic_index: f64,
    pub roll_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contracts_used: Option<String>,
}

impl RollCarry {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.roll_points == 0.0 && self.synthetic_index == 0.0 && self.roll_pct == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InversionKind {
    ContractInversion,
    SpotInversion,
}

impl InversionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContractInversion => "contract_inversion",
            Self::SpotInversion => "spot_inversion",
        }
    }
}

impl FromStr for InversionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contract_inversion" | "futures_inversion" => Ok(Self::ContractInversion),
            "spot_inversion" => Ok(Self::SpotInversion),
            other => Err(format!("unknown inversion type `{other}`")),
        }
    }
}

/// A curve segment where the nearer leg is priced above the farther leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inversion {
    #[serde(rename = "type")]
    pub kind: InversionKind,
    pub contract1: String,
    pub contract2: String,
    pub price1: f64,
    pub price2: f64,
    pub magnitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CurveShape {
    #[serde(rename = "steep contango")]
    SteepContango,
    #[serde(rename = "steep backwardation")]
    SteepBackwardation,
    #[serde(rename = "mild contango")]
    MildContango,
    #[serde(rename = "mild backwardation")]
    MildBackwardation,
    #[serde(rename = "mixed/kinked")]
    MixedKinked,
    #[serde(rename = "insufficient data")]
    InsufficientData,
}

impl CurveShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SteepContango => "steep contango",
            Self::SteepBackwardation => "steep backwardation",
            Self::MildContango => "mild contango",
            Self::MildBackwardation => "mild backwardation",
            Self::MixedKinked => "mixed/kinked",
            Self::InsufficientData => "insufficient data",
        }
    }
}

impl fmt::Display for CurveShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurveShape {
    type Err = String;

    /// Case-insensitive, so labels written by older tooling
    /// ("Steep Contango") parse too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "steep contango" => Ok(Self::SteepContango),
            "steep backwardation" => Ok(Self::SteepBackwardation),
            "mild contango" => Ok(Self::MildContango),
            "mild backwardation" => Ok(Self::MildBackwardation),
            "mixed/kinked" => Ok(Self::MixedKinked),
            "insufficient data" => Ok(Self::InsufficientData),
            other => Err(format!("unknown curve shape `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradingSignal {
    #[serde(rename = "inversion alert")]
    InversionAlert,
    #[serde(rename = "strong contango signal")]
    StrongContango,
    #[serde(rename = "strong backwardation signal")]
    StrongBackwardation,
    #[serde(rename = "neutral")]
    Neutral,
}

impl TradingSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InversionAlert => "inversion alert",
            Self::StrongContango => "strong contango signal",
            Self::StrongBackwardation => "strong backwardation signal",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for TradingSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradingSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "inversion alert" => Ok(Self::InversionAlert),
            "strong contango signal" => Ok(Self::StrongContango),
            "strong backwardation signal" => Ok(Self::StrongBackwardation),
            "neutral" => Ok(Self::Neutral),
            l if l.starts_with("alert: curve inversion") => Ok(Self::InversionAlert),
            l if l.starts_with("strong contango") => Ok(Self::StrongContango),
            l if l.starts_with("strong backwardation") => Ok(Self::StrongBackwardation),
            l if l.starts_with("neutral") => Ok(Self::Neutral),
            other => Err(format!("unknown trading signal `{other}`")),
        }
    }
}

/// One analysed snapshot of the term structure.
///
/// Built once per run by [`crate::analysis::build`] and never mutated
/// afterwards; every derived field is a pure function of `spot_price`
/// and `contracts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermStructure {
    pub timestamp: NaiveDateTime,
    pub spot_price: f64,
    pub num_contracts: usize,
    pub contracts: Vec<Contract>,
    pub spreads: Spreads,
    pub roll_carry: RollCarry,
    pub inversions: Vec<Inversion>,
    pub curve_shape: CurveShape,
    pub trading_signal: TradingSignal,
}

impl TermStructure {
    /// Primary key used by the historical store.
    pub fn timestamp_key(&self) -> String {
        format_timestamp(&self.timestamp)
    }

    pub fn date_only(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Spot-to-front spread as a percentage of spot.
    pub fn contango_pct(&self) -> f64 {
        contango_pct(self.spreads.spot_to_front, self.spot_price)
    }

    pub fn front_month(&self) -> Option<&Contract> {
        self.contracts.first()
    }

    pub fn second_month(&self) -> Option<&Contract> {
        self.contracts.get(1)
    }
}

pub fn contango_pct(spot_to_front: f64, spot_price: f64) -> f64 {
    if spot_price > 0.0 {
        spot_to_front / spot_price * 100.0
    } else {
        0.0
    }
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse an ISO-8601 timestamp, with or without fractional seconds or offset.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_local());
    }
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d")
                .ok()?
                .and_hms_opt(0, 0, 0)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_shape_parses_legacy_labels() {
        assert_eq!("Steep Contango".parse(), Ok(CurveShape::SteepContango));
        assert_eq!("Mixed/Kinked".parse(), Ok(CurveShape::MixedKinked));
        assert!("sideways".parse::<CurveShape>().is_err());
    }

    #[test]
    fn test_trading_signal_parses_legacy_labels() {
        assert_eq!(
            "ALERT: Curve Inversion Detected".parse(),
            Ok(TradingSignal::InversionAlert)
        );
        assert_eq!(
            "Strong Contango - Consider Short Vol".parse(),
            Ok(TradingSignal::StrongContango)
        );
        assert_eq!("Neutral Structure".parse(), Ok(TradingSignal::Neutral));
    }

    #[test]
    fn test_timestamp_round_trips_through_key() {
        let ts = parse_timestamp("2024-03-08T16:15:00.250000").unwrap();
        assert_eq!(format_timestamp(&ts), "2024-03-08T16:15:00.250");
        assert_eq!(parse_timestamp(&format_timestamp(&ts)), Some(ts));

        let date_only = parse_timestamp("2024-03-08").unwrap();
        assert_eq!(format_timestamp(&date_only), "2024-03-08T00:00:00");
    }
}
