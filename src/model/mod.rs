pub mod contract;
pub mod snapshot;

pub use contract::{Contract, ContractInput, SnapshotInput};
pub use snapshot::{
    CurveShape, Inversion, InversionKind, RollCarry, Spreads, TermStructure, TradingSignal,
};

/// Label used for the spot leg of a spot inversion.
pub const SPOT_LABEL: &str = "VIX Spot";

/// Round to `dp` decimal places, half away from zero.
pub fn round_to(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}
