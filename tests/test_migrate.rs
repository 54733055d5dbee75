use serde_json::{Value, json};

use vix_term::model::InversionKind;
use vix_term::store::HistoryStore;

mod snapshot_common;
use snapshot_common::date;

fn legacy_batch() -> Vec<Value> {
    vec![
        // Older analysis file layout.
        json!({
            "timestamp": "2024-03-07T16:15:02.123456",
            "spot_vix": 17.5,
            "points_spreads": {"spot_to_front": 1.2, "front_to_second": 0.6},
            "roll_carry": {"roll_pct": -0.09, "roll_pts": -0.02, "synthetic_index": 19.1},
            "curve_shape": "Steep Contango",
            "trading_signal": "NEUTRAL: No strong signals",
            "futures_data": [
                {"symbol": "VX/K4", "price": 19.3, "days_to_expiration": 41},
                {"symbol": "VX/J4", "price": 18.7, "days_to_expiration": 13, "expiration": "2024-03-20"}
            ],
            "inversions": []
        }),
        // Current layout, inverted; derived labels missing.
        json!({
            "timestamp": "2024-03-08T16:00:00",
            "spot_price": 24.0,
            "spreads": {"spot_to_front": -1.0, "front_to_second": -0.5},
            "contracts": [
                {"symbol": "VX/J4", "price": 23.0, "days_to_expiration": 12},
                {"symbol": "VX/K4", "price": 22.5, "days_to_expiration": 40},
                {"symbol": "VX/M4", "price": 22.0, "days_to_expiration": 68}
            ],
            "inversions": [
                {"contract1": "VX/J4", "contract2": "VX/K4", "price1": 23.0, "price2": 22.5, "magnitude": 0.5},
                {"contract1": "VIX Spot", "contract2": "VX/J4", "price1": 24.0, "price2": 23.0, "magnitude": 1.0}
            ]
        }),
        json!({"timestamp": "2024-03-09T16:00:00"}),
        json!({"spot_price": 18.0}),
        json!({"timestamp": "last tuesday", "spot_price": 18.0}),
        Value::Null,
    ]
}

#[test]
fn test_migration_counts_and_idempotence() {
    let mut store = HistoryStore::open_in_memory().unwrap();
    let batch = legacy_batch();

    let first = store.migrate(&batch);
    assert_eq!(first.migrated, 2);
    assert_eq!(first.skipped, 4);
    assert_eq!(first.failed, 0);
    assert_eq!(first.total(), batch.len());

    let before = store.database_stats().unwrap();
    let second = store.migrate(&batch);
    assert_eq!(second, first);
    assert_eq!(store.database_stats().unwrap(), before);
    assert_eq!(before.snapshots, 2);
    assert_eq!(before.contracts, 5);
    assert_eq!(before.inversions, 2);
}

#[test]
fn test_migrated_rows_are_normalized() {
    let mut store = HistoryStore::open_in_memory().unwrap();
    store.migrate(&legacy_batch());

    let old = store.latest_on(date(2024, 3, 7)).unwrap().unwrap();
    assert_eq!(old.timestamp, "2024-03-07T16:15:02.123456");
    assert_eq!(old.spot_price, 17.5);
    assert_eq!(old.curve_shape, "steep contango");
    assert_eq!(old.trading_signal, "neutral");
    assert_eq!(old.roll_carry_pts, -0.02);
    assert_eq!(old.spot_to_front, 1.2);
    // Front month comes from the sorted contract list.
    assert_eq!(old.front_month_price, Some(18.7));

    let contracts = store.contracts_for(&old.timestamp).unwrap();
    assert_eq!(contracts[0].symbol, "VX/J4");
    assert_eq!(contracts[0].expiration_date, Some(date(2024, 3, 20)));

    let inverted = store.latest_on(date(2024, 3, 8)).unwrap().unwrap();
    assert_eq!(inverted.curve_shape, "steep backwardation");
    assert_eq!(inverted.trading_signal, "inversion alert");
    assert_eq!(inverted.num_contracts, 3);

    let inversions = store.inversions_for(&inverted.timestamp).unwrap();
    assert_eq!(inversions[0].kind, InversionKind::ContractInversion);
    assert_eq!(inversions[1].kind, InversionKind::SpotInversion);
}
