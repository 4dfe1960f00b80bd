//! ProgressState and Valuation: how far the strategy has run and what it is worth.

use serde::{Deserialize, Serialize};

use super::{is_positive, MarketSnapshot};

/// Capital deployment progress.
///
/// All ratios fall back to 0 when their denominator is not positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressState {
    /// `average_cost * holdings`
    pub invested: f64,
    /// `total_capital - invested` (negative when the trader has overspent)
    pub remaining_budget: f64,
    /// `invested / per_round_budget`, a.k.a. the T-value
    pub round_index: f64,
    /// `invested / total_capital * 100`
    pub burn_rate_pct: f64,
}

impl ProgressState {
    pub fn compute(total_capital: f64, per_round_budget: f64, snapshot: &MarketSnapshot) -> Self {
        let invested = snapshot.invested();
        let round_index = if is_positive(per_round_budget) {
            invested / per_round_budget
        } else {
            0.0
        };
        let burn_rate_pct = if is_positive(total_capital) {
            invested / total_capital * 100.0
        } else {
            0.0
        };
        Self {
            invested,
            remaining_budget: total_capital - invested,
            round_index,
            burn_rate_pct,
        }
    }
}

/// Mark-to-market view of the open position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub cost_basis: f64,
    pub market_value: f64,
    pub unrealized_pnl: f64,
    pub return_pct: f64,
}

impl Valuation {
    pub fn compute(snapshot: &MarketSnapshot) -> Self {
        let cost_basis = snapshot.invested();
        let market_value = if is_positive(snapshot.current_price) {
            snapshot.current_price * snapshot.holdings as f64
        } else {
            0.0
        };
        let unrealized_pnl = market_value - cost_basis;
        let return_pct = if cost_basis > 0.0 {
            unrealized_pnl / cost_basis * 100.0
        } else {
            0.0
        };
        Self {
            cost_basis,
            market_value,
            unrealized_pnl,
            return_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_basic() {
        // 10 shares at $50 = $500 invested of $4000, $100 per round
        let snap = MarketSnapshot::new(52.0, 50.0, 10);
        let p = ProgressState::compute(4000.0, 100.0, &snap);
        assert_eq!(p.invested, 500.0);
        assert_eq!(p.remaining_budget, 3500.0);
        assert_eq!(p.round_index, 5.0);
        assert_eq!(p.burn_rate_pct, 12.5);
    }

    #[test]
    fn test_progress_zero_budget_guards() {
        let snap = MarketSnapshot::new(52.0, 50.0, 10);
        let p = ProgressState::compute(0.0, 0.0, &snap);
        assert_eq!(p.round_index, 0.0);
        assert_eq!(p.burn_rate_pct, 0.0);
        assert_eq!(p.remaining_budget, -500.0);
    }

    #[test]
    fn test_progress_no_position() {
        let p = ProgressState::compute(4000.0, 100.0, &MarketSnapshot::flat(50.0));
        assert_eq!(p.invested, 0.0);
        assert_eq!(p.remaining_budget, 4000.0);
        assert_eq!(p.round_index, 0.0);
    }

    #[test]
    fn test_valuation_gain() {
        let snap = MarketSnapshot::new(55.0, 50.0, 10);
        let v = Valuation::compute(&snap);
        assert_eq!(v.cost_basis, 500.0);
        assert_eq!(v.market_value, 550.0);
        assert_eq!(v.unrealized_pnl, 50.0);
        assert_eq!(v.return_pct, 10.0);
    }

    #[test]
    fn test_valuation_without_cost_basis() {
        let v = Valuation::compute(&MarketSnapshot::new(55.0, 0.0, 0));
        assert_eq!(v.return_pct, 0.0);
        assert_eq!(v.unrealized_pnl, 0.0);
    }

    #[test]
    fn test_valuation_free_shares_still_show_pnl() {
        // Shares carried at zero cost are all profit; only the ratio is undefined.
        let v = Valuation::compute(&MarketSnapshot::new(55.0, 0.0, 4));
        assert_eq!(v.cost_basis, 0.0);
        assert_eq!(v.market_value, 220.0);
        assert_eq!(v.unrealized_pnl, 220.0);
        assert_eq!(v.return_pct, 0.0);
    }
}
