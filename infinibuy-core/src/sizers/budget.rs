//! Budget allocator.

use crate::domain::{is_positive, StrategyConfig};

/// Per-round spending cap: `total_capital / split_count`.
///
/// Returns 0 when `split_count` is 0. The result is not truncated; callers
/// floor when they need whole shares.
///
/// # Example
/// ```
/// use infinibuy_core::sizers::allocate;
///
/// assert_eq!(allocate(4000.0, 40), 100.0);
/// assert_eq!(allocate(4000.0, 0), 0.0);
/// ```
pub fn allocate(total_capital: f64, split_count: u32) -> f64 {
    if split_count == 0 || !total_capital.is_finite() {
        return 0.0;
    }
    total_capital / split_count as f64
}

/// Budget actually used by the engine: an explicit `round_budget` wins over
/// the allocated one when it is positive.
pub fn resolve_budget(config: &StrategyConfig) -> f64 {
    match config.round_budget {
        Some(budget) if is_positive(budget) => budget,
        _ => allocate(config.total_capital, config.split_count),
    }
}
