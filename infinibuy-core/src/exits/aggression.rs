//! Aggressiveness decay and the price safety cap.
//!
//! While fewer than half the rounds are spent (accumulation) the aggressive
//! premium stays at its base value. From the halfway point it decays
//! linearly, reaching 0 when every round is spent:
//!
//! ```text
//! T < split/2  →  pct = base
//! T ≥ split/2  →  pct = max(base * (1 - T / split), 0)
//! ```
//!
//! The resulting price is clamped to `current_price * 1.15` so a limit order
//! is never placed far above the tradeable range.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::is_positive;

/// Highest computed buy price, as a multiple of the current price.
pub const SAFETY_CAP_MULTIPLIER: f64 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Accumulation,
    ExitManagement,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accumulation => f.write_str("accumulation"),
            Self::ExitManagement => f.write_str("exit management"),
        }
    }
}

/// `invested / per_round_budget`, 0 when the budget is not positive.
pub fn round_index(invested: f64, per_round_budget: f64) -> f64 {
    if !is_positive(per_round_budget) || !invested.is_finite() {
        return 0.0;
    }
    invested / per_round_budget
}

/// Aggressive percentage after phase decay.
///
/// A zero split count has no rounds to pace and returns 0.
pub fn aggressive_pct(base_pct: f64, round_index: f64, split_count: u32) -> f64 {
    if split_count == 0 {
        return 0.0;
    }
    let splits = split_count as f64;
    if round_index < splits / 2.0 {
        return base_pct;
    }
    (base_pct * (1.0 - round_index / splits)).max(0.0)
}

/// `min(price, current_price * multiplier)`.
pub fn safety_cap(price: f64, current_price: f64, multiplier: f64) -> f64 {
    let ceiling = current_price.max(0.0) * multiplier;
    price.min(ceiling)
}

/// Everything the aggressive leg needs to know about where the strategy stands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggressionState {
    pub round_index: f64,
    pub half_point: f64,
    pub phase: Phase,
    pub aggressive_pct: f64,
    /// `reference_price * (1 + aggressive_pct / 100)` before the cap.
    pub raw_price: f64,
    pub final_price: f64,
    /// True when the safety cap lowered the price.
    pub capped: bool,
}

/// Run the decay and the safety cap for one evaluation.
///
/// `cap_multiplier` may tighten the cap but never loosen it past
/// [`SAFETY_CAP_MULTIPLIER`].
pub fn assess_aggression(
    base_pct: f64,
    split_count: u32,
    round_index: f64,
    reference_price: f64,
    current_price: f64,
    cap_multiplier: f64,
) -> AggressionState {
    let half_point = split_count as f64 / 2.0;
    let phase = if round_index < half_point {
        Phase::Accumulation
    } else {
        Phase::ExitManagement
    };
    let pct = aggressive_pct(base_pct, round_index, split_count);
    let raw_price = reference_price.max(0.0) * (1.0 + pct / 100.0);
    let multiplier = cap_multiplier.min(SAFETY_CAP_MULTIPLIER);
    let final_price = safety_cap(raw_price, current_price, multiplier);

    AggressionState {
        round_index,
        half_point,
        phase,
        aggressive_pct: pct,
        raw_price,
        final_price,
        capped: final_price < raw_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_decay_at_start() {
        assert_eq!(aggressive_pct(10.0, 0.0, 40), 10.0);
    }

    #[test]
    fn test_no_decay_before_half_point() {
        assert_eq!(aggressive_pct(10.0, 19.9, 40), 10.0);
    }

    #[test]
    fn test_linear_decay_after_half_point() {
        assert!((aggressive_pct(10.0, 20.0, 40) - 5.0).abs() < 1e-9);
        assert!((aggressive_pct(10.0, 30.0, 40) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_decay_bottoms_out_at_zero() {
        assert_eq!(aggressive_pct(10.0, 40.0, 40), 0.0);
        assert_eq!(aggressive_pct(10.0, 55.0, 40), 0.0);
    }

    #[test]
    fn test_zero_split_count() {
        assert_eq!(aggressive_pct(10.0, 0.0, 0), 0.0);
    }

    #[test]
    fn test_round_index_guard() {
        assert_eq!(round_index(500.0, 100.0), 5.0);
        assert_eq!(round_index(500.0, 0.0), 0.0);
    }

    #[test]
    fn test_safety_cap_clamps() {
        // avg $60, current $50: 60 * 1.10 = 66 > 57.5
        let state = assess_aggression(10.0, 40, 0.0, 60.0, 50.0, SAFETY_CAP_MULTIPLIER);
        assert!((state.raw_price - 66.0).abs() < 1e-9);
        assert!((state.final_price - 57.5).abs() < 1e-9);
        assert!(state.capped);
    }

    #[test]
    fn test_safety_cap_leaves_reasonable_price() {
        let state = assess_aggression(10.0, 40, 5.0, 50.0, 52.0, SAFETY_CAP_MULTIPLIER);
        assert!((state.final_price - 55.0).abs() < 1e-9);
        assert!(!state.capped);
        assert_eq!(state.phase, Phase::Accumulation);
    }

    #[test]
    fn test_loose_multiplier_is_held_to_ceiling() {
        // avg $60 * 1.5 = $90 wanted at current $50; a 3x cap must not pass it through
        let state = assess_aggression(50.0, 40, 0.0, 60.0, 50.0, 3.0);
        assert!(state.capped);
        assert!(state.final_price <= 50.0 * SAFETY_CAP_MULTIPLIER);

        let tight = assess_aggression(50.0, 40, 0.0, 60.0, 50.0, 1.05);
        assert!((tight.final_price - 52.5).abs() < 1e-9);

        let nan = assess_aggression(50.0, 40, 0.0, 60.0, 50.0, f64::NAN);
        assert!(nan.final_price <= 50.0 * SAFETY_CAP_MULTIPLIER);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::Accumulation.to_string(), "accumulation");
        assert_eq!(Phase::ExitManagement.to_string(), "exit management");
    }

    #[test]
    fn test_phase_switches_at_half_point() {
        let state = assess_aggression(10.0, 40, 20.0, 50.0, 50.0, SAFETY_CAP_MULTIPLIER);
        assert_eq!(state.phase, Phase::ExitManagement);
        assert_eq!(state.half_point, 20.0);
    }
}
