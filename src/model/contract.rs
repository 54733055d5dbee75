use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One futures quote as supplied by the acquisition layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContractInput {
    /// Contract symbol, e.g. "VX/F6". Unique within a snapshot.
    pub symbol: String,
    /// Settlement or last price in index points.
    pub price: f64,
    /// Calendar days until expiration.
    pub days_to_expiration: u32,
    /// Expiration date, if known.
    #[serde(default, alias = "expiration", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
}

/// The raw inputs of one analysis run: spot level plus the futures curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SnapshotInput {
    /// Spot index level.
    #[serde(alias = "spot_vix")]
    pub spot_price: f64,
    /// Futures quotes in any order.
    #[serde(default, alias = "futures_data")]
    pub contracts: Vec<ContractInput>,
}

/// A futures contract placed on the curve.
///
/// `order` is the position after sorting by `days_to_expiration`;
/// 0 is the front month, 1 the second month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub symbol: String,
    pub price: f64,
    pub days_to_expiration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<NaiveDate>,
    pub order: usize,
}

impl Contract {
    pub fn from_input(input: &ContractInput, order: usize) -> Self {
        Self {
            symbol: input.symbol.clone(),
            price: input.price,
            days_to_expiration: input.days_to_expiration,
            expiration_date: input.expiration_date,
            order,
        }
    }
}
