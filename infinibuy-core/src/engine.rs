//! Order plan engine: runs the four calculations over one market snapshot.
//!
//! ```text
//! StrategyConfig ─▶ Budget Allocator ─┬─▶ Base Quantity ─▶ Ladder
//!                                     └─▶ Progress ─▶ Aggression ─▶ Buy legs
//! MarketSnapshot ─────────────────────────────────────────▶ Exit Planner
//! ```
//!
//! The engine holds no mutable state: `evaluate` is a pure function of the
//! settings and the snapshot, so the same inputs always give the same plan.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{
    DailyLegs, ExitRule, ExitTier, LineNote, MarketSnapshot, OrderLine, ProgressState,
    StrategyConfig, Valuation,
};
use crate::exits::{assess_aggression, plan_exits, plan_legs, reference_price, AggressionState};
use crate::ladder::{build_ladder, LadderScenarios};
use crate::sizers::{base_quantity_with_floor, resolve_budget};

/// Everything the engine needs besides the market snapshot.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub strategy: StrategyConfig,
    pub ladder: LadderScenarios,
    pub exits: Vec<ExitRule>,
}

impl EngineSettings {
    pub fn new(strategy: StrategyConfig, ladder: LadderScenarios, exits: Vec<ExitRule>) -> Self {
        Self {
            strategy,
            ladder,
            exits,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            strategy: StrategyConfig::default(),
            ladder: LadderScenarios::default(),
            exits: ExitRule::default_tiers(),
        }
    }
}

/// Output of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlan {
    pub snapshot: MarketSnapshot,
    pub per_round_budget: f64,
    pub base_quantity: u64,
    pub progress: ProgressState,
    pub valuation: Valuation,
    pub aggression: AggressionState,
    pub legs: DailyLegs,
    pub ladder: Vec<OrderLine>,
    pub exits: Vec<ExitTier>,
}

impl OrderPlan {
    /// Sum of estimated ladder costs.
    pub fn ladder_cost(&self) -> f64 {
        self.ladder.iter().map(|l| l.est_cost).sum()
    }

    pub fn count_notes(&self, note: LineNote) -> usize {
        self.ladder.iter().filter(|l| l.note == note).count()
    }
}

/// Stateless evaluator bound to one set of settings.
#[derive(Debug, Clone)]
pub struct OrderPlanEngine {
    settings: EngineSettings,
    per_round_budget: f64,
}

impl OrderPlanEngine {
    pub fn new(settings: EngineSettings) -> Self {
        let per_round_budget = resolve_budget(&settings.strategy);
        Self {
            settings,
            per_round_budget,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn per_round_budget(&self) -> f64 {
        self.per_round_budget
    }

    /// Build the full plan for `snapshot`.
    pub fn evaluate(&self, snapshot: &MarketSnapshot) -> OrderPlan {
        let strategy = &self.settings.strategy;
        let budget = self.per_round_budget;

        let base_quantity =
            base_quantity_with_floor(budget, snapshot.current_price, strategy.min_quantity);
        let ladder = build_ladder(
            budget,
            snapshot.current_price,
            base_quantity,
            &self.settings.ladder,
        );

        let progress = ProgressState::compute(strategy.total_capital, budget, snapshot);
        let valuation = Valuation::compute(snapshot);

        let aggression = assess_aggression(
            strategy.base_aggressive_pct,
            strategy.split_count,
            progress.round_index,
            reference_price(snapshot),
            snapshot.current_price,
            strategy.safety_cap_multiplier,
        );
        let legs = plan_legs(
            snapshot,
            budget,
            base_quantity,
            aggression.final_price,
            strategy.aggressive_share,
        );

        let exits = plan_exits(snapshot.average_cost, snapshot.holdings, &self.settings.exits);

        trace!(
            price = snapshot.current_price,
            budget,
            base_quantity,
            round_index = progress.round_index,
            "plan evaluated"
        );

        OrderPlan {
            snapshot: *snapshot,
            per_round_budget: budget,
            base_quantity,
            progress,
            valuation,
            aggression,
            legs,
            ladder,
            exits,
        }
    }
}

impl Default for OrderPlanEngine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}
