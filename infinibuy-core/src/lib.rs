//! Infinibuy Core: order plan engine for the infinite buying method.
//!
//! This crate contains the pure calculation core:
//! - Domain records (market snapshot, order lines, exit tiers, progress)
//! - Budget allocator and base quantity calculator
//! - Contingency ladder with budget-cap enforcement
//! - Exit planner with phase-aware aggressiveness decay and price safety cap
//! - `OrderPlanEngine`, which runs all of the above over one snapshot
//!
//! Nothing here performs I/O or returns an error for bad market inputs:
//! divisions are guarded and fall back to 0.

pub mod domain;
pub mod engine;
pub mod exits;
pub mod ladder;
pub mod sizers;

pub use domain::{MarketSnapshot, StrategyConfig};
pub use engine::{EngineSettings, OrderPlan, OrderPlanEngine};
