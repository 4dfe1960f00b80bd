//! MarketSnapshot: the per-evaluation market inputs.

use serde::{Deserialize, Serialize};

use super::is_positive;

/// Market inputs supplied fresh for every evaluation.
///
/// `average_cost == 0` or `holdings == 0` means there is no position yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub current_price: f64,
    pub average_cost: f64,
    pub holdings: u64,
}

impl MarketSnapshot {
    pub fn new(current_price: f64, average_cost: f64, holdings: u64) -> Self {
        Self {
            current_price,
            average_cost,
            holdings,
        }
    }

    /// Snapshot for a trader who has not bought anything yet.
    pub fn flat(current_price: f64) -> Self {
        Self::new(current_price, 0.0, 0)
    }

    /// True when both an average cost and a non-zero holding are known.
    pub fn has_position(&self) -> bool {
        self.holdings > 0 && is_positive(self.average_cost)
    }

    /// Capital already deployed: `average_cost * holdings`.
    pub fn invested(&self) -> f64 {
        if !self.has_position() {
            return 0.0;
        }
        self.average_cost * self.holdings as f64
    }

    /// Same snapshot repriced at a hypothetical current price.
    pub fn with_price(&self, current_price: f64) -> Self {
        Self {
            current_price,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_snapshot_has_no_position() {
        let snap = MarketSnapshot::flat(55.36);
        assert!(!snap.has_position());
        assert_eq!(snap.invested(), 0.0);
    }

    #[test]
    fn test_zero_average_cost_is_no_position() {
        let snap = MarketSnapshot::new(50.0, 0.0, 10);
        assert!(!snap.has_position());
        assert_eq!(snap.invested(), 0.0);
    }

    #[test]
    fn test_invested() {
        let snap = MarketSnapshot::new(55.36, 54.20, 3);
        assert!((snap.invested() - 162.60).abs() < 1e-9);
    }

    #[test]
    fn test_with_price_keeps_position() {
        let snap = MarketSnapshot::new(50.0, 48.0, 7).with_price(40.0);
        assert_eq!(snap.current_price, 40.0);
        assert_eq!(snap.average_cost, 48.0);
        assert_eq!(snap.holdings, 7);
    }
}
