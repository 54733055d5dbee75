//! Snapshot builder: turns a spot level and a futures table into an
//! analysed [`TermStructure`].
//!
//! Every function here is pure and total. Incomplete curves degrade to
//! zero-valued spreads, zero roll carry and an "insufficient data" shape
//! rather than failing, so downstream consumers always get a record.

mod classify;
mod spreads;

use std::collections::HashSet;

use chrono::NaiveDateTime;
use tracing::warn;

use crate::model::{Contract, ContractInput, SnapshotInput, TermStructure};

pub use classify::{STRONG_SPREAD_POINTS, classify_curve_shape, detect_inversions, trading_signal};
pub use spreads::{CONSTANT_MATURITY_DAYS, ROLL_DT_DAYS, points_spreads, roll_carry};

/// Build the analysed snapshot for `input`, stamped with `timestamp`.
pub fn build(input: &SnapshotInput, timestamp: NaiveDateTime) -> TermStructure {
    let contracts = prepare_contracts(&input.contracts);
    let spot_price = input.spot_price;

    let spreads = points_spreads(spot_price, &contracts);
    let roll_carry = roll_carry(&contracts);
    let inversions = detect_inversions(spot_price, &contracts);
    let curve_shape = classify_curve_shape(&contracts);
    let trading_signal = trading_signal(&spreads, &inversions);

    TermStructure {
        timestamp,
        spot_price,
        num_contracts: contracts.len(),
        contracts,
        spreads,
        roll_carry,
        inversions,
        curve_shape,
        trading_signal,
    }
}

/// Drop repeated symbols (first occurrence wins), then order by days to
/// expiration. The sort is stable, so ties keep their input order.
pub fn prepare_contracts(inputs: &[ContractInput]) -> Vec<Contract> {
    let mut seen = HashSet::new();
    let mut unique: Vec<&ContractInput> = Vec::with_capacity(inputs.len());
    for input in inputs {
        if seen.insert(input.symbol.as_str()) {
            unique.push(input);
        } else {
            warn!(symbol = %input.symbol, "duplicate contract symbol ignored");
        }
    }

    unique.sort_by_key(|c| c.days_to_expiration);
    unique
        .into_iter()
        .enumerate()
        .map(|(order, input)| Contract::from_input(input, order))
        .collect()
}
