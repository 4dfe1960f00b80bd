//! Domain types for the order plan engine.
//!
//! Every record here is an immutable value snapshot: built from the inputs of a
//! single evaluation and thrown away on the next one.

pub mod buy_leg;
pub mod exit_tier;
pub mod order_line;
pub mod progress;
pub mod snapshot;
pub mod strategy;

pub use buy_leg::{BuyLeg, DailyLegs, LegKind};
pub use exit_tier::{ExitRule, ExitTier};
pub use order_line::{DropRequirement, LineNote, OrderLine};
pub use progress::{ProgressState, Valuation};
pub use snapshot::MarketSnapshot;
pub use strategy::StrategyConfig;

/// Tolerance used when comparing money amounts against a budget.
///
/// Products like `40.0 * 2.5` are exact, but `55.36 * 0.9 * 3` is not; a cost
/// that overshoots the budget by less than this is treated as on-budget.
pub const MONEY_EPSILON: f64 = 1e-9;

/// True when `x` is a finite, strictly positive number.
pub(crate) fn is_positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}
