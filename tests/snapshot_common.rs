#![allow(dead_code)]

use chrono::{Days, NaiveDate, NaiveDateTime};

use vix_term::analysis;
use vix_term::model::{ContractInput, SnapshotInput, TermStructure};

pub fn input(spot: f64, quotes: &[(&str, f64, u32)]) -> SnapshotInput {
    SnapshotInput {
        spot_price: spot,
        contracts: quotes
            .iter()
            .map(|(symbol, price, dte)| ContractInput {
                symbol: symbol.to_string(),
                price: *price,
                days_to_expiration: *dte,
                expiration_date: None,
            })
            .collect(),
    }
}

/// Three-contract upward curve one point above spot.
pub fn calm_input(spot: f64) -> SnapshotInput {
    input(
        spot,
        &[
            ("VX1", spot + 1.0, 10),
            ("VX2", spot + 1.5, 40),
            ("VX3", spot + 2.1, 70),
        ],
    )
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(day: NaiveDate, hour: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, 0, 0).unwrap()
}

pub fn days_after(start: NaiveDate, n: u64) -> NaiveDate {
    start.checked_add_days(Days::new(n)).unwrap()
}

pub fn calm_snapshot(spot: f64, day: NaiveDate) -> TermStructure {
    analysis::build(&calm_input(spot), at(day, 16))
}
