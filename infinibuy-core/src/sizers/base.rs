//! Base quantity calculator.

use crate::domain::{is_positive, MONEY_EPSILON};

/// Whole shares `amount` buys at `price`, or 0 when `price` is not positive.
///
/// A ratio that lands a hair under an integer because of float error
/// (e.g. `2.9999999999`) is counted as the integer.
pub fn floor_shares(amount: f64, price: f64) -> u64 {
    if !is_positive(price) || !is_positive(amount) {
        return 0;
    }
    (amount / price + MONEY_EPSILON).floor() as u64
}

/// `floor(per_round_budget / current_price)`, 0 when the price is not positive.
pub fn base_quantity(per_round_budget: f64, current_price: f64) -> u64 {
    floor_shares(per_round_budget, current_price)
}

/// Base quantity with a minimum floor.
///
/// When the budget is positive, the price is positive and the budget still
/// buys 0 shares, the result is raised to `min_quantity`. With
/// `min_quantity == 0` this is plain [`base_quantity`].
pub fn base_quantity_with_floor(per_round_budget: f64, current_price: f64, min_quantity: u64) -> u64 {
    let qty = base_quantity(per_round_budget, current_price);
    if qty == 0 && is_positive(per_round_budget) && is_positive(current_price) {
        return min_quantity;
    }
    qty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_quantity_floors() {
        assert_eq!(base_quantity(100.0, 50.0), 2);
        assert_eq!(base_quantity(100.0, 33.0), 3);
        assert_eq!(base_quantity(74.0, 55.36), 1);
    }

    #[test]
    fn test_zero_or_negative_price() {
        assert_eq!(base_quantity(100.0, 0.0), 0);
        assert_eq!(base_quantity(100.0, -5.0), 0);
        assert_eq!(base_quantity(100.0, f64::NAN), 0);
    }

    #[test]
    fn test_float_error_does_not_lose_a_share() {
        // 0.3 / 0.1 == 2.9999999999999996 in f64
        assert_eq!(floor_shares(0.3, 0.1), 3);
    }

    #[test]
    fn test_floor_raises_zero_to_min() {
        assert_eq!(base_quantity(100.0, 150.0), 0);
        assert_eq!(base_quantity_with_floor(100.0, 150.0, 1), 1);
        assert_eq!(base_quantity_with_floor(100.0, 150.0, 0), 0);
    }

    #[test]
    fn test_floor_does_not_apply_to_zero_budget() {
        assert_eq!(base_quantity_with_floor(0.0, 50.0, 1), 0);
        assert_eq!(base_quantity_with_floor(100.0, 0.0, 1), 0);
    }

    #[test]
    fn test_floor_leaves_affordable_quantity_alone() {
        assert_eq!(base_quantity_with_floor(100.0, 50.0, 1), 2);
    }
}
