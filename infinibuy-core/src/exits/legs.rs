//! Daily buy legs.

use crate::domain::{is_positive, BuyLeg, DailyLegs, LegKind, MarketSnapshot, MONEY_EPSILON};
use crate::sizers::floor_shares;

/// Price the legs are anchored to: average cost with a position, current price without.
pub fn reference_price(snapshot: &MarketSnapshot) -> f64 {
    if snapshot.has_position() {
        snapshot.average_cost
    } else {
        snapshot.current_price.max(0.0)
    }
}

/// Size the defensive and aggressive legs for one round.
///
/// The defensive leg buys `base_quantity` at the reference price and only
/// flags an overspend. The aggressive leg gets `aggressive_share` of the
/// budget at `aggressive_price` and is floored to whole shares.
pub fn plan_legs(
    snapshot: &MarketSnapshot,
    per_round_budget: f64,
    base_quantity: u64,
    aggressive_price: f64,
    aggressive_share: f64,
) -> DailyLegs {
    let defensive_price = reference_price(snapshot);
    let defensive_qty = if is_positive(defensive_price) { base_quantity } else { 0 };
    let defensive_cost = defensive_price * defensive_qty as f64;

    let leg_budget = per_round_budget.max(0.0) * aggressive_share.clamp(0.0, 1.0);
    let aggressive_qty = floor_shares(leg_budget, aggressive_price);
    let aggressive_cost = aggressive_price * aggressive_qty as f64;

    DailyLegs {
        defensive: BuyLeg {
            kind: LegKind::Defensive,
            price: defensive_price,
            quantity: defensive_qty,
            est_cost: defensive_cost,
            over_budget: defensive_cost > per_round_budget + MONEY_EPSILON,
        },
        aggressive: BuyLeg {
            kind: LegKind::Aggressive,
            price: aggressive_price,
            quantity: aggressive_qty,
            est_cost: aggressive_cost,
            over_budget: aggressive_cost > per_round_budget + MONEY_EPSILON,
        },
    }
}
