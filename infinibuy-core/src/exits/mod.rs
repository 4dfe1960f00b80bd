//! Exit planning: profit-taking sell tiers and the aggressive buy leg.
//!
//! - [`plan_exits`]: sell a fraction of holdings at each return threshold.
//! - [`aggression`]: phase-aware decay of the aggressiveness percentage and the
//!   safety cap on the price it produces.
//! - [`legs`]: the defensive and aggressive buy orders sized from those prices.

pub mod aggression;
pub mod legs;

pub use aggression::{
    aggressive_pct, assess_aggression, round_index, safety_cap, AggressionState, Phase,
    SAFETY_CAP_MULTIPLIER,
};
pub use legs::{plan_legs, reference_price};

use crate::domain::{ExitRule, ExitTier};

/// One [`ExitTier`] per rule, in rule order.
///
/// Partial tiers sell `max(1, floor(holdings * fraction))`; a fraction of 1.0
/// or more sells exactly `holdings`. No holdings means nothing to sell.
pub fn plan_exits(average_cost: f64, holdings: u64, rules: &[ExitRule]) -> Vec<ExitTier> {
    rules
        .iter()
        .map(|rule| {
            let target_price = average_cost * (1.0 + rule.threshold_pct / 100.0);
            let sell_quantity = sell_quantity(holdings, rule);
            ExitTier {
                threshold_pct: rule.threshold_pct,
                fraction: rule.fraction,
                target_price,
                sell_quantity,
                est_proceeds: target_price * sell_quantity as f64,
                est_profit: (target_price - average_cost) * sell_quantity as f64,
            }
        })
        .collect()
}

fn sell_quantity(holdings: u64, rule: &ExitRule) -> u64 {
    if holdings == 0 {
        return 0;
    }
    if rule.is_full_liquidation() {
        return holdings;
    }
    let partial = (holdings as f64 * rule.fraction.max(0.0)).floor() as u64;
    partial.clamp(1, holdings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_and_full_tiers() {
        let tiers = plan_exits(50.0, 10, &[ExitRule::new(5.0, 0.25), ExitRule::new(15.0, 1.0)]);
        assert_eq!(tiers[0].sell_quantity, 2);
        assert!((tiers[0].target_price - 52.5).abs() < 1e-9);
        assert_eq!(tiers[1].sell_quantity, 10);
        assert!((tiers[1].target_price - 57.5).abs() < 1e-9);
    }

    #[test]
    fn test_partial_tier_sells_at_least_one() {
        let tiers = plan_exits(50.0, 3, &[ExitRule::new(5.0, 0.25)]);
        assert_eq!(tiers[0].sell_quantity, 1);
    }

    #[test]
    fn test_full_liquidation_of_odd_holdings() {
        let tiers = plan_exits(31.7, 37, &ExitRule::default_tiers());
        assert_eq!(tiers[0].sell_quantity, 9);
        assert_eq!(tiers[1].sell_quantity, 18);
        assert_eq!(tiers[2].sell_quantity, 37);
    }

    #[test]
    fn test_no_holdings_sells_nothing() {
        let tiers = plan_exits(50.0, 0, &ExitRule::default_tiers());
        assert!(tiers.iter().all(|t| t.sell_quantity == 0));
        assert!(tiers.iter().all(|t| t.est_proceeds == 0.0));
    }

    #[test]
    fn test_profit_estimate() {
        let tiers = plan_exits(50.0, 10, &[ExitRule::new(10.0, 0.5)]);
        assert_eq!(tiers[0].sell_quantity, 5);
        assert!((tiers[0].est_proceeds - 275.0).abs() < 1e-9);
        assert!((tiers[0].est_profit - 25.0).abs() < 1e-9);
    }
}
