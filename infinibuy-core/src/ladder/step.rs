//! Drop steps: how many extra shares a deeper drop adds to the base quantity.
//!
//! Two interchangeable shapes of the same mechanism:
//! - [`TableStep`]: a hand-authored threshold table (+1 / +1 / +2 / +3).
//! - [`PanicStep`]: `floor(drop / 10%) * panic_strength`.
//!
//! Both are monotonically non-decreasing in the drop fraction, which is what
//! keeps deeper ladder rungs from buying less than shallower ones.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::MONEY_EPSILON;

/// Drop-fraction width of one panic step (10%).
pub const PANIC_STEP_WIDTH: f64 = 0.10;

/// Errors from building a step function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepTableError {
    #[error("step table is empty")]
    Empty,

    #[error("threshold {0} is outside (0, 1)")]
    ThresholdOutOfRange(f64),

    #[error("thresholds must be strictly increasing ({prev} then {next})")]
    ThresholdsNotIncreasing { prev: f64, next: f64 },

    #[error("added quantity must not decrease ({prev} at lower drop, {next} at deeper drop)")]
    QuantityDecreasing { prev: u64, next: u64 },

    #[error("panic strength {0} is outside 1..=3")]
    PanicStrengthOutOfRange(u8),
}

/// Additional quantity for a given drop fraction.
///
/// # Contract
/// - `add_quantity(d)` is non-decreasing in `d`.
/// - Drops `<= 0` add nothing.
pub trait DropStep: Send + Sync + fmt::Debug {
    fn add_quantity(&self, drop: f64) -> u64;

    /// Step name for manifests and logging.
    fn name(&self) -> &str;

    fn clone_box(&self) -> Box<dyn DropStep>;
}

impl Clone for Box<dyn DropStep> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// One `(threshold, add)` row of a [`TableStep`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRow {
    /// Drop fraction at which this row starts to apply (0.20 = -20%).
    pub threshold: f64,
    /// Shares added on top of the base quantity.
    pub add: u64,
}

/// Threshold lookup table: the row with the largest threshold `<= drop` applies.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStep {
    rows: Vec<StepRow>,
}

impl TableStep {
    pub fn new(rows: Vec<StepRow>) -> Result<Self, StepTableError> {
        if rows.is_empty() {
            return Err(StepTableError::Empty);
        }
        for row in &rows {
            if row.threshold.is_nan() || row.threshold <= 0.0 || row.threshold >= 1.0 {
                return Err(StepTableError::ThresholdOutOfRange(row.threshold));
            }
        }
        for pair in rows.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if next.threshold <= prev.threshold {
                return Err(StepTableError::ThresholdsNotIncreasing {
                    prev: prev.threshold,
                    next: next.threshold,
                });
            }
            if next.add < prev.add {
                return Err(StepTableError::QuantityDecreasing {
                    prev: prev.add,
                    next: next.add,
                });
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[StepRow] {
        &self.rows
    }
}

impl Default for TableStep {
    /// -10% → +1, -15% → +1, -20% → +2, -30% → +3.
    fn default() -> Self {
        Self {
            rows: vec![
                StepRow { threshold: 0.10, add: 1 },
                StepRow { threshold: 0.15, add: 1 },
                StepRow { threshold: 0.20, add: 2 },
                StepRow { threshold: 0.30, add: 3 },
            ],
        }
    }
}

impl DropStep for TableStep {
    fn add_quantity(&self, drop: f64) -> u64 {
        self.rows
            .iter()
            .take_while(|row| row.threshold <= drop + MONEY_EPSILON)
            .last()
            .map_or(0, |row| row.add)
    }

    fn name(&self) -> &str {
        "Table"
    }

    fn clone_box(&self) -> Box<dyn DropStep> {
        Box::new(self.clone())
    }
}

/// `floor(drop / 10%) * strength`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanicStep {
    strength: u8,
}

impl PanicStep {
    pub fn new(strength: u8) -> Result<Self, StepTableError> {
        if !(1..=3).contains(&strength) {
            return Err(StepTableError::PanicStrengthOutOfRange(strength));
        }
        Ok(Self { strength })
    }

    pub fn strength(&self) -> u8 {
        self.strength
    }
}

impl DropStep for PanicStep {
    fn add_quantity(&self, drop: f64) -> u64 {
        if drop.is_nan() || drop <= 0.0 {
            return 0;
        }
        // 0.30 / 0.10 is 2.9999999999999996 in f64
        let steps = (drop / PANIC_STEP_WIDTH + MONEY_EPSILON).floor() as u64;
        steps.saturating_mul(u64::from(self.strength))
    }

    fn name(&self) -> &str {
        "Panic"
    }

    fn clone_box(&self) -> Box<dyn DropStep> {
        Box::new(*self)
    }
}
