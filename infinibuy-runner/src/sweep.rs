//! What-if price sweep.
//!
//! Evaluates the same position at a grid of hypothetical current prices so a
//! trader can see where the ladder starts capping and where the aggressive
//! leg hits the safety cap. Evaluations are independent and run in parallel;
//! rows come back in grid order.

use infinibuy_core::domain::LineNote;
use infinibuy_core::{MarketSnapshot, OrderPlan, OrderPlanEngine};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One summary row per hypothetical price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub price: f64,
    pub base_quantity: u64,
    pub ladder_quantity: u64,
    pub ladder_cost: f64,
    pub capped: usize,
    pub insufficient: usize,
    pub defensive_quantity: u64,
    pub aggressive_quantity: u64,
    pub aggressive_price: f64,
    pub aggressive_capped: bool,
}

impl SweepRow {
    pub fn from_plan(plan: &OrderPlan) -> Self {
        Self {
            price: plan.snapshot.current_price,
            base_quantity: plan.base_quantity,
            ladder_quantity: plan
                .ladder
                .iter()
                .fold(0u64, |acc, l| acc.saturating_add(l.quantity)),
            ladder_cost: plan.ladder_cost(),
            capped: plan.count_notes(LineNote::Capped),
            insufficient: plan.count_notes(LineNote::Insufficient),
            defensive_quantity: plan.legs.defensive.quantity,
            aggressive_quantity: plan.legs.aggressive.quantity,
            aggressive_price: plan.aggression.final_price,
            aggressive_capped: plan.aggression.capped,
        }
    }
}

/// Inclusive price grid from `from` to `to` in increments of `step`.
///
/// Points are computed as `from + i * step` rather than by repeated addition,
/// so the grid does not drift. A non-positive or non-finite step, or
/// `to < from`, yields an empty grid.
pub fn price_grid(from: f64, to: f64, step: f64) -> Vec<f64> {
    if !(step.is_finite() && step > 0.0) || !from.is_finite() || !to.is_finite() || to < from {
        return Vec::new();
    }
    let count = ((to - from) / step + 1e-9).floor() as usize + 1;
    (0..count).map(|i| from + i as f64 * step).collect()
}

/// Evaluate `snapshot` at each price in `prices`.
pub fn sweep_prices(
    engine: &OrderPlanEngine,
    snapshot: &MarketSnapshot,
    prices: &[f64],
) -> Vec<SweepRow> {
    prices
        .par_iter()
        .map(|&price| SweepRow::from_plan(&engine.evaluate(&snapshot.with_price(price))))
        .collect()
}
