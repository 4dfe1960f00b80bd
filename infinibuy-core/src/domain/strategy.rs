//! StrategyConfig: the trader's capital allocation rules.

use serde::{Deserialize, Serialize};

/// Capital allocation rules, constant for a session.
///
/// `split_count` divides `total_capital` into equal rounds; a zero split count
/// leaves the per-round budget at 0 rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Total capital allocated to this ticker.
    pub total_capital: f64,

    /// Number of rounds the capital is split into (e.g. 40).
    pub split_count: u32,

    /// Premium over average cost for the aggressive leg, in percent (e.g. 10.0 = +10%).
    pub base_aggressive_pct: f64,

    /// Ladder aggressiveness knob in `1..=3`, used by the panic step formula.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panic_strength: Option<u8>,

    /// Quantity floor applied when the budget cannot buy a whole share.
    #[serde(default = "default_min_quantity")]
    pub min_quantity: u64,

    /// Explicit per-round budget; overrides `total_capital / split_count` when positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_budget: Option<f64>,

    /// Share of the per-round budget sized into the aggressive leg.
    #[serde(default = "default_aggressive_share")]
    pub aggressive_share: f64,

    /// Multiple of current price that no computed buy price may exceed.
    #[serde(default = "default_safety_cap_multiplier")]
    pub safety_cap_multiplier: f64,
}

fn default_min_quantity() -> u64 {
    1
}

fn default_aggressive_share() -> f64 {
    0.5
}

fn default_safety_cap_multiplier() -> f64 {
    crate::exits::SAFETY_CAP_MULTIPLIER
}

impl StrategyConfig {
    /// Config with the given capital and split count and every other knob at its default.
    pub fn new(total_capital: f64, split_count: u32) -> Self {
        Self {
            total_capital,
            split_count,
            ..Self::default()
        }
    }

    /// Panic strength to use when none is configured.
    pub fn panic_strength_or_default(&self) -> u8 {
        self.panic_strength.unwrap_or(1)
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            total_capital: 4000.0,
            split_count: 40,
            base_aggressive_pct: 10.0,
            panic_strength: None,
            min_quantity: default_min_quantity(),
            round_budget: None,
            aggressive_share: default_aggressive_share(),
            safety_cap_multiplier: default_safety_cap_multiplier(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = StrategyConfig::default();
        assert_eq!(cfg.split_count, 40);
        assert_eq!(cfg.min_quantity, 1);
        assert_eq!(cfg.safety_cap_multiplier, 1.15);
        assert_eq!(cfg.panic_strength_or_default(), 1);
    }

    #[test]
    fn test_optional_fields_default_on_deserialize() {
        let json = r#"{"total_capital": 1000.0, "split_count": 20, "base_aggressive_pct": 15.0}"#;
        let cfg: StrategyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.total_capital, 1000.0);
        assert_eq!(cfg.min_quantity, 1);
        assert_eq!(cfg.aggressive_share, 0.5);
        assert!(cfg.round_budget.is_none());
        assert!(cfg.panic_strength.is_none());
    }
}
