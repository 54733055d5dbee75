use crate::model::{
    Contract, CurveShape, Inversion, InversionKind, SPOT_LABEL, Spreads, TradingSignal, round_to,
};

/// Spot-to-front spread (points) beyond which the curve counts as strongly sloped.
pub const STRONG_SPREAD_POINTS: f64 = 2.0;

/// Adjacent contract inversions in curve order, then the spot inversion if any.
pub fn detect_inversions(spot_price: f64, contracts: &[Contract]) -> Vec<Inversion> {
    let mut inversions: Vec<Inversion> = contracts
        .windows(2)
        .filter(|w| w[0].price > w[1].price)
        .map(|w| Inversion {
            kind: InversionKind::ContractInversion,
            contract1: w[0].symbol.clone(),
            contract2: w[1].symbol.clone(),
            price1: w[0].price,
            price2: w[1].price,
            magnitude: round_to(w[0].price - w[1].price, 2),
        })
        .collect();

    if let Some(front) = contracts.first() {
        if spot_price > front.price {
            inversions.push(Inversion {
                kind: InversionKind::SpotInversion,
                contract1: SPOT_LABEL.to_string(),
                contract2: front.symbol.clone(),
                price1: spot_price,
                price2: front.price,
                magnitude: round_to(spot_price - front.price, 2),
            });
        }
    }

    inversions
}

/// Classify the curve from the signs of consecutive contract price deltas.
/// Spot is not part of the curve here.
pub fn classify_curve_shape(contracts: &[Contract]) -> CurveShape {
    if contracts.len() < 3 {
        return CurveShape::InsufficientData;
    }

    let slopes: Vec<f64> = contracts.windows(2).map(|w| w[1].price - w[0].price).collect();
    let half = slopes.len() as f64 / 2.0;
    let rising = slopes.iter().filter(|s| **s > 0.0).count();
    let falling = slopes.iter().filter(|s| **s < 0.0).count();

    if rising == slopes.len() {
        CurveShape::SteepContango
    } else if falling == slopes.len() {
        CurveShape::SteepBackwardation
    } else if rising as f64 > half {
        CurveShape::MildContango
    } else if falling as f64 > half {
        CurveShape::MildBackwardation
    } else {
        CurveShape::MixedKinked
    }
}

/// Any inversion overrides the spread-based signal.
pub fn trading_signal(spreads: &Spreads, inversions: &[Inversion]) -> TradingSignal {
    if !inversions.is_empty() {
        TradingSignal::InversionAlert
    } else if spreads.spot_to_front > STRONG_SPREAD_POINTS {
        TradingSignal::StrongContango
    } else if spreads.spot_to_front < -STRONG_SPREAD_POINTS {
        TradingSignal::StrongBackwardation
    } else {
        TradingSignal::Neutral
    }
}
