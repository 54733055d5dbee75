use crate::model::{Contract, RollCarry, Spreads, round_to};

/// Rebalance interval for the roll-carry estimate, in days.
pub const ROLL_DT_DAYS: f64 = 1.0;

/// Constant maturity the synthetic index is interpolated to.
pub const CONSTANT_MATURITY_DAYS: f64 = 30.0;

/// Spot-to-front and front-to-second point spreads.
///
/// `contracts` must already be sorted by days to expiration.
pub fn points_spreads(spot_price: f64, contracts: &[Contract]) -> Spreads {
    let Some(front) = contracts.first() else {
        return Spreads {
            spot_price,
            ..Spreads::default()
        };
    };
    let second = contracts.get(1);

    Spreads {
        spot_to_front: round_to(front.price - spot_price, 2),
        front_to_second: second.map_or(0.0, |s| round_to(s.price - front.price, 2)),
        spot_price,
        front_month: Some(front.price),
        second_month: second.map(|s| s.price),
    }
}

/// Roll carry from the front two contracts, interpolated to a 30-day
/// constant maturity.
///
/// Returns all zeros with fewer than two contracts, or when the two
/// maturities are not strictly increasing.
pub fn roll_carry(contracts: &[Contract]) -> RollCarry {
    let (Some(c1), Some(c2)) = (contracts.first(), contracts.get(1)) else {
        return RollCarry::zero();
    };
    if c2.days_to_expiration <= c1.days_to_expiration {
        return RollCarry::zero();
    }

    let (f1, f2) = (c1.price, c2.price);
    let (t1, t2) = (c1.days_to_expiration as f64, c2.days_to_expiration as f64);
    let span = t2 - t1;

    let roll_points = -(ROLL_DT_DAYS / span) * (f2 - f1);
    let synthetic_index = ((t2 - CONSTANT_MATURITY_DAYS) / span) * f1
        + ((CONSTANT_MATURITY_DAYS - t1) / span) * f2;
    let roll_pct = if synthetic_index != 0.0 {
        roll_points / synthetic_index * 100.0
    } else {
        0.0
    };

    RollCarry {
        roll_points: round_to(roll_points, 4),
        synthetic_index: round_to(synthetic_index, 2),
        roll_pct: round_to(roll_pct, 2),
        contracts_used: Some(format!("{} to {}", c1.symbol, c2.symbol)),
    }
}
