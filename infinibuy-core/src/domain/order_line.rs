//! OrderLine: one row of the contingency buy ladder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a ladder line relates to the per-round budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineNote {
    /// Planned quantity fits the budget as-is.
    Normal,
    /// Planned quantity overspent the budget and was cut to what the budget buys.
    Capped,
    /// The budget cannot buy a single share at this price.
    Insufficient,
}

impl fmt::Display for LineNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Normal => "NORMAL",
            Self::Capped => "CAPPED",
            Self::Insufficient => "INSUFFICIENT",
        };
        f.write_str(s)
    }
}

/// Target-quantity mode: how far price must move before `q` shares fit the budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DropRequirement {
    /// The budget already buys this many shares at the current price.
    AlreadyBuyable,
    /// Price must change by `pct` percent (always negative) first.
    FallBy { pct: f64 },
}

/// A single contingency buy order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub label: String,
    /// Drop fraction from the current price this line is priced at (0.20 = -20%).
    pub drop_pct: f64,
    pub price: f64,
    /// Quantity before budget-cap enforcement.
    pub planned_quantity: u64,
    pub quantity: u64,
    pub est_cost: f64,
    pub note: LineNote,
    /// Only set for target-quantity lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement: Option<DropRequirement>,
}

impl OrderLine {
    /// True when the budget cap reduced the planned quantity.
    pub fn was_reduced(&self) -> bool {
        self.quantity < self.planned_quantity
    }

    /// Display text for the quantity column, e.g. `"4 → 2"` for a capped line.
    pub fn quantity_text(&self) -> String {
        match self.note {
            LineNote::Normal => self.quantity.to_string(),
            LineNote::Capped => format!("{} → {}", self.planned_quantity, self.quantity),
            LineNote::Insufficient => "0".to_string(),
        }
    }
}
