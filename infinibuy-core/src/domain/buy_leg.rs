//! Buy legs: the two limit-on-close orders placed every round.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegKind {
    /// Bid at the average cost to defend it.
    Defensive,
    /// Bid at a premium over average cost so the round still fills on up days.
    Aggressive,
}

impl fmt::Display for LegKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defensive => f.write_str("defensive"),
            Self::Aggressive => f.write_str("aggressive"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuyLeg {
    pub kind: LegKind,
    pub price: f64,
    pub quantity: u64,
    pub est_cost: f64,
    /// Set when `est_cost` exceeds the per-round budget. The quantity is left as planned.
    pub over_budget: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyLegs {
    pub defensive: BuyLeg,
    pub aggressive: BuyLeg,
}

impl DailyLegs {
    pub fn total_cost(&self) -> f64 {
        self.defensive.est_cost + self.aggressive.est_cost
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuyLeg> {
        [&self.defensive, &self.aggressive].into_iter()
    }
}
