//! Exit tiers: profit-taking sell orders.

use serde::{Deserialize, Serialize};

/// A configured profit-taking rule: sell `fraction` of holdings at `threshold_pct` above cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitRule {
    /// Return threshold in percent (5.0 = +5%).
    pub threshold_pct: f64,
    /// Fraction of holdings to sell; 1.0 or more means full liquidation.
    pub fraction: f64,
}

impl ExitRule {
    pub fn new(threshold_pct: f64, fraction: f64) -> Self {
        Self {
            threshold_pct,
            fraction,
        }
    }

    pub fn is_full_liquidation(&self) -> bool {
        self.fraction >= 1.0
    }

    /// The three-tier ladder: a quarter at +5%, half at +10%, everything at +15%.
    pub fn default_tiers() -> Vec<ExitRule> {
        vec![
            ExitRule::new(5.0, 0.25),
            ExitRule::new(10.0, 0.5),
            ExitRule::new(15.0, 1.0),
        ]
    }
}

/// A planned sell order for one exit rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitTier {
    pub threshold_pct: f64,
    pub fraction: f64,
    pub target_price: f64,
    pub sell_quantity: u64,
    pub est_proceeds: f64,
    pub est_profit: f64,
}
