//! Contingency ladder: buy orders for successively deeper price drops.
//!
//! Two modes:
//! - **Drop fractions**: price each rung at `current * (1 - d)`, size it at
//!   `base + step(d)`, then enforce the per-round budget cap.
//! - **Target quantities**: solve backward for the unit price at which `q`
//!   shares exactly spend the budget.
//!
//! # Budget cap
//! In drop-fraction mode no emitted line costs more than the per-round budget
//! (up to float tolerance). A rung that would overspend is cut to
//! `floor(budget / price)` shares and marked `CAPPED`; if not even one share
//! fits it is marked `INSUFFICIENT`.

pub mod step;

pub use step::{DropStep, PanicStep, StepRow, StepTableError, TableStep, PANIC_STEP_WIDTH};

use tracing::debug;

use crate::domain::{is_positive, DropRequirement, LineNote, OrderLine, MONEY_EPSILON};
use crate::sizers::floor_shares;

/// -10%, -15%, -20%, -30%.
pub const DEFAULT_DROPS: [f64; 4] = [0.10, 0.15, 0.20, 0.30];

/// Scenario set the ladder is built from.
#[derive(Debug, Clone)]
pub enum LadderScenarios {
    /// Drop fractions, each sized by `step`.
    Drops {
        drops: Vec<f64>,
        step: Box<dyn DropStep>,
    },
    /// Share counts to solve the required price for.
    Targets { quantities: Vec<u64> },
}

impl Default for LadderScenarios {
    fn default() -> Self {
        Self::Drops {
            drops: DEFAULT_DROPS.to_vec(),
            step: Box::new(TableStep::default()),
        }
    }
}

impl LadderScenarios {
    pub fn len(&self) -> usize {
        match self {
            Self::Drops { drops, .. } => drops.len(),
            Self::Targets { quantities } => quantities.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the ladder for whichever mode `scenarios` selects.
///
/// Lines come back in scenario order; no sorting is applied.
pub fn build_ladder(
    per_round_budget: f64,
    current_price: f64,
    base_quantity: u64,
    scenarios: &LadderScenarios,
) -> Vec<OrderLine> {
    match scenarios {
        LadderScenarios::Drops { drops, step } => build_drop_ladder(
            per_round_budget,
            current_price,
            base_quantity,
            drops,
            step.as_ref(),
        ),
        LadderScenarios::Targets { quantities } => {
            build_target_ladder(per_round_budget, current_price, quantities)
        }
    }
}

/// Drop-fraction ladder with budget-cap enforcement.
pub fn build_drop_ladder(
    per_round_budget: f64,
    current_price: f64,
    base_quantity: u64,
    drops: &[f64],
    step: &dyn DropStep,
) -> Vec<OrderLine> {
    drops
        .iter()
        .map(|&drop| {
            let target_price = if is_positive(current_price) {
                current_price * (1.0 - drop)
            } else {
                0.0
            };
            let planned = base_quantity.saturating_add(step.add_quantity(drop));
            let (quantity, est_cost, note) = enforce_budget_cap(per_round_budget, target_price, planned);
            let label = drop_label(drop);

            match note {
                LineNote::Capped => debug!(%label, planned, quantity, "ladder line capped to budget"),
                LineNote::Insufficient => debug!(%label, planned, "budget cannot buy one share"),
                LineNote::Normal => {}
            }

            OrderLine {
                label,
                drop_pct: drop,
                price: target_price,
                planned_quantity: planned,
                quantity,
                est_cost,
                note,
                requirement: None,
            }
        })
        .collect()
}

/// Fit `planned` shares at `price` into `per_round_budget`.
///
/// Returns `(quantity, est_cost, note)`. A non-positive price cannot be
/// ordered and is reported as `INSUFFICIENT`.
pub fn enforce_budget_cap(per_round_budget: f64, price: f64, planned: u64) -> (u64, f64, LineNote) {
    if !is_positive(price) {
        return (0, 0.0, LineNote::Insufficient);
    }

    let estimated_cost = price * planned as f64;
    if estimated_cost <= per_round_budget + MONEY_EPSILON {
        return (planned, estimated_cost, LineNote::Normal);
    }

    let max_buyable = floor_shares(per_round_budget, price).min(planned);
    if max_buyable == 0 {
        (0, 0.0, LineNote::Insufficient)
    } else if max_buyable == planned {
        (planned, estimated_cost, LineNote::Normal)
    } else {
        (max_buyable, price * max_buyable as f64, LineNote::Capped)
    }
}

/// Target-quantity ladder: the unit price at which each `q` spends the whole budget.
pub fn build_target_ladder(per_round_budget: f64, current_price: f64, quantities: &[u64]) -> Vec<OrderLine> {
    quantities
        .iter()
        .map(|&q| target_line(per_round_budget, current_price, q))
        .collect()
}

fn target_line(per_round_budget: f64, current_price: f64, q: u64) -> OrderLine {
    let label = share_label(q);
    if q == 0 || !is_positive(per_round_budget) {
        return OrderLine {
            label,
            drop_pct: 0.0,
            price: 0.0,
            planned_quantity: q,
            quantity: 0,
            est_cost: 0.0,
            note: LineNote::Insufficient,
            requirement: None,
        };
    }

    let unit_price = per_round_budget / q as f64;
    let (drop_pct, requirement) = if is_positive(current_price) {
        let change_pct = (unit_price - current_price) / current_price * 100.0;
        if change_pct >= 0.0 {
            (0.0, Some(DropRequirement::AlreadyBuyable))
        } else {
            (-change_pct / 100.0, Some(DropRequirement::FallBy { pct: change_pct }))
        }
    } else {
        (0.0, None)
    };

    OrderLine {
        label,
        drop_pct,
        price: unit_price,
        planned_quantity: q,
        quantity: q,
        est_cost: unit_price * q as f64,
        note: LineNote::Normal,
        requirement,
    }
}

fn drop_label(drop: f64) -> String {
    let pct = drop * 100.0;
    if (pct - pct.round()).abs() < 1e-6 {
        format!("-{}%", pct.round() as i64)
    } else {
        format!("-{:.1}%", pct)
    }
}

fn share_label(q: u64) -> String {
    if q == 1 {
        "1 share".to_string()
    } else {
        format!("{q} shares")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_ladder(budget: f64, price: f64, base: u64) -> Vec<OrderLine> {
        build_ladder(budget, price, base, &LadderScenarios::default())
    }

    #[test]
    fn test_capped_scenario() {
        // $4000 / 40 = $100 per round, $50 price → base 2.
        // -20%: $40, 2 + 2 = 4 shares = $160 > $100 → capped to 2 ($80).
        let lines = default_ladder(100.0, 50.0, 2);
        let line = &lines[2];
        assert_eq!(line.label, "-20%");
        assert!((line.price - 40.0).abs() < 1e-9);
        assert_eq!(line.planned_quantity, 4);
        assert_eq!(line.quantity, 2);
        assert!((line.est_cost - 80.0).abs() < 1e-9);
        assert_eq!(line.note, LineNote::Capped);
        assert_eq!(line.quantity_text(), "4 → 2");
    }

    #[test]
    fn test_normal_line_keeps_plan() {
        // $74 budget, $55.36 price, base 0: -10% → $49.82 * 1 = fits.
        let lines = default_ladder(74.0, 55.36, 0);
        assert_eq!(lines[0].note, LineNote::Normal);
        assert_eq!(lines[0].quantity, 1);
        assert!((lines[0].est_cost - 55.36 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_insufficient_when_one_share_does_not_fit() {
        let lines = default_ladder(30.0, 50.0, 1);
        // -10%: $45 > $30 budget
        assert_eq!(lines[0].note, LineNote::Insufficient);
        assert_eq!(lines[0].quantity, 0);
        assert_eq!(lines[0].est_cost, 0.0);
    }

    #[test]
    fn test_zero_budget_yields_zero_quantities() {
        let lines = default_ladder(0.0, 50.0, 0);
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| l.quantity == 0));
        assert!(lines.iter().all(|l| l.note == LineNote::Insufficient));
    }

    #[test]
    fn test_zero_price_is_insufficient() {
        let lines = default_ladder(100.0, 0.0, 0);
        assert!(lines.iter().all(|l| l.note == LineNote::Insufficient));
    }

    #[test]
    fn test_lines_follow_caller_order() {
        let scenarios = LadderScenarios::Drops {
            drops: vec![0.30, 0.10],
            step: Box::new(TableStep::default()),
        };
        let lines = build_ladder(1000.0, 50.0, 1, &scenarios);
        assert_eq!(lines[0].label, "-30%");
        assert_eq!(lines[1].label, "-10%");
    }

    #[test]
    fn test_panic_step_ladder() {
        let scenarios = LadderScenarios::Drops {
            drops: vec![0.10, 0.20, 0.30],
            step: Box::new(PanicStep::new(2).unwrap()),
        };
        let lines = build_ladder(1000.0, 10.0, 1, &scenarios);
        let planned: Vec<u64> = lines.iter().map(|l| l.planned_quantity).collect();
        assert_eq!(planned, vec![3, 5, 7]);
        assert!(lines.iter().all(|l| l.note == LineNote::Normal));
    }

    #[test]
    fn test_fractional_drop_label() {
        assert_eq!(drop_label(0.125), "-12.5%");
        assert_eq!(drop_label(0.15), "-15%");
    }

    #[test]
    fn test_target_mode_needs_fall() {
        // $100 budget, $50 price: 4 shares need $25 (-50%).
        let lines = build_target_ladder(100.0, 50.0, &[2, 4]);
        assert_eq!(lines[0].requirement, Some(DropRequirement::AlreadyBuyable));
        assert_eq!(lines[0].price, 50.0);
        assert_eq!(lines[1].price, 25.0);
        assert_eq!(lines[1].quantity, 4);
        assert_eq!(lines[1].est_cost, 100.0);
        match lines[1].requirement {
            Some(DropRequirement::FallBy { pct }) => assert!((pct + 50.0).abs() < 1e-9),
            other => panic!("expected FallBy, got {other:?}"),
        }
        assert!((lines[1].drop_pct - 0.5).abs() < 1e-9);
        assert_eq!(lines[1].label, "4 shares");
    }

    #[test]
    fn test_target_mode_guards() {
        let lines = build_target_ladder(100.0, 50.0, &[0]);
        assert_eq!(lines[0].note, LineNote::Insufficient);
        assert_eq!(lines[0].quantity, 0);

        let lines = build_target_ladder(100.0, 0.0, &[3]);
        assert!(lines[0].requirement.is_none());
        assert_eq!(lines[0].quantity, 3);
    }

    #[test]
    fn test_enforce_budget_cap_exact_fit() {
        let (qty, cost, note) = enforce_budget_cap(100.0, 25.0, 4);
        assert_eq!((qty, note), (4, LineNote::Normal));
        assert_eq!(cost, 100.0);
    }
}
