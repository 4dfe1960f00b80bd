//! Serializable plan configuration.
//!
//! A `PlanConfig` is everything the engine needs besides the market
//! snapshot, loaded from TOML:
//!
//! ```toml
//! [strategy]
//! total_capital = 4000.0
//! split_count = 40
//! base_aggressive_pct = 10.0
//!
//! [ladder]
//! mode = "DROPS"
//! drops = [0.10, 0.15, 0.20, 0.30]
//!
//! [ladder.step]
//! type = "PANIC"
//! strength = 2
//!
//! [[exits.tiers]]
//! threshold_pct = 5.0
//! fraction = 0.25
//! ```
//!
//! Every section is optional and falls back to the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use infinibuy_core::domain::{ExitRule, StrategyConfig};
use infinibuy_core::ladder::{
    DropStep, LadderScenarios, PanicStep, StepRow, StepTableError, TableStep, DEFAULT_DROPS,
};
use infinibuy_core::exits::SAFETY_CAP_MULTIPLIER;
use infinibuy_core::EngineSettings;

/// Errors from loading or validating a plan configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("invalid step table: {0}")]
    Step(#[from] StepTableError),
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Complete plan configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanConfig {
    #[serde(default)]
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub ladder: LadderConfig,

    #[serde(default)]
    pub exits: ExitsConfig,

    /// Column names for the CSV position importer.
    #[serde(default)]
    pub import: ImportColumns,
}

/// Ladder configuration (serializable form of [`LadderScenarios`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LadderConfig {
    /// Fixed drop fractions sized by a step function.
    Drops {
        #[serde(default = "default_drops")]
        drops: Vec<f64>,
        #[serde(default)]
        step: StepConfig,
    },

    /// Share counts to solve the required price for.
    Targets { quantities: Vec<u64> },
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self::Drops {
            drops: default_drops(),
            step: StepConfig::default(),
        }
    }
}

fn default_drops() -> Vec<f64> {
    DEFAULT_DROPS.to_vec()
}

/// Step function configuration (serializable form of [`DropStep`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepConfig {
    /// Threshold lookup table.
    Table { rows: Vec<StepRow> },

    /// `floor(drop / 10%) * strength`; strength falls back to `strategy.panic_strength`.
    Panic {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        strength: Option<u8>,
    },
}

impl Default for StepConfig {
    fn default() -> Self {
        Self::Table {
            rows: TableStep::default().rows().to_vec(),
        }
    }
}

/// Profit-taking tiers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExitsConfig {
    pub tiers: Vec<ExitRule>,
}

impl Default for ExitsConfig {
    fn default() -> Self {
        Self {
            tiers: ExitRule::default_tiers(),
        }
    }
}

/// Accepted header names for each imported field, matched case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportColumns {
    #[serde(default = "default_date_columns")]
    pub date: Vec<String>,
    #[serde(default = "default_average_cost_columns")]
    pub average_cost: Vec<String>,
    #[serde(default = "default_holdings_columns")]
    pub holdings: Vec<String>,
}

fn default_date_columns() -> Vec<String> {
    vec!["date".into(), "day".into()]
}

fn default_average_cost_columns() -> Vec<String> {
    vec!["average_cost".into(), "avg_price".into(), "avg_cost".into()]
}

fn default_holdings_columns() -> Vec<String> {
    vec!["holdings".into(), "quantity".into(), "shares".into()]
}

impl Default for ImportColumns {
    fn default() -> Self {
        Self {
            date: default_date_columns(),
            average_cost: default_average_cost_columns(),
            holdings: default_holdings_columns(),
        }
    }
}

impl PlanConfig {
    /// Load and validate a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: PlanConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field the engine relies on.
    ///
    /// The engine itself never fails on odd inputs; this is where a typo in a
    /// config file gets reported instead of silently producing a 0 budget.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.strategy;
        if !s.total_capital.is_finite() || s.total_capital < 0.0 {
            return Err(ConfigError::invalid(
                "strategy.total_capital",
                format!("must be a non-negative amount, got {}", s.total_capital),
            ));
        }
        if s.split_count == 0 {
            return Err(ConfigError::invalid("strategy.split_count", "must be > 0"));
        }
        if !s.base_aggressive_pct.is_finite() || s.base_aggressive_pct < 0.0 {
            return Err(ConfigError::invalid(
                "strategy.base_aggressive_pct",
                format!("must be >= 0, got {}", s.base_aggressive_pct),
            ));
        }
        if let Some(strength) = s.panic_strength {
            PanicStep::new(strength)?;
        }
        if let Some(budget) = s.round_budget {
            if !budget.is_finite() || budget <= 0.0 {
                return Err(ConfigError::invalid(
                    "strategy.round_budget",
                    format!("must be > 0, got {budget}"),
                ));
            }
        }
        if !(0.0..=1.0).contains(&s.aggressive_share) {
            return Err(ConfigError::invalid(
                "strategy.aggressive_share",
                format!("must be within [0, 1], got {}", s.aggressive_share),
            ));
        }
        // Tighter caps are fine; a looser one would let the aggressive bid run
        // past 115% of the current price.
        let cap = s.safety_cap_multiplier;
        if !cap.is_finite() || cap <= 0.0 || cap > SAFETY_CAP_MULTIPLIER {
            return Err(ConfigError::invalid(
                "strategy.safety_cap_multiplier",
                format!("must be within (0, {SAFETY_CAP_MULTIPLIER}], got {cap}"),
            ));
        }

        match &self.ladder {
            LadderConfig::Drops { drops, step } => {
                if drops.is_empty() {
                    return Err(ConfigError::invalid("ladder.drops", "must not be empty"));
                }
                if let Some(bad) = drops.iter().find(|d| !(**d > 0.0 && **d < 1.0)) {
                    return Err(ConfigError::invalid(
                        "ladder.drops",
                        format!("drop {bad} is outside (0, 1)"),
                    ));
                }
                self.build_step(step)?;
            }
            LadderConfig::Targets { quantities } => {
                if quantities.is_empty() {
                    return Err(ConfigError::invalid("ladder.quantities", "must not be empty"));
                }
                if quantities.contains(&0) {
                    return Err(ConfigError::invalid("ladder.quantities", "must all be > 0"));
                }
            }
        }

        for tier in &self.exits.tiers {
            if !tier.threshold_pct.is_finite() || tier.threshold_pct < 0.0 {
                return Err(ConfigError::invalid(
                    "exits.tiers.threshold_pct",
                    format!("must be >= 0, got {}", tier.threshold_pct),
                ));
            }
            if !tier.fraction.is_finite() || tier.fraction <= 0.0 {
                return Err(ConfigError::invalid(
                    "exits.tiers.fraction",
                    format!("must be > 0, got {}", tier.fraction),
                ));
            }
        }

        Ok(())
    }

    /// Validate and convert into engine settings.
    pub fn to_engine_settings(&self) -> Result<EngineSettings, ConfigError> {
        self.validate()?;
        let ladder = match &self.ladder {
            LadderConfig::Drops { drops, step } => LadderScenarios::Drops {
                drops: drops.clone(),
                step: self.build_step(step)?,
            },
            LadderConfig::Targets { quantities } => LadderScenarios::Targets {
                quantities: quantities.clone(),
            },
        };
        Ok(EngineSettings::new(
            self.strategy.clone(),
            ladder,
            self.exits.tiers.clone(),
        ))
    }

    fn build_step(&self, step: &StepConfig) -> Result<Box<dyn DropStep>, ConfigError> {
        Ok(match step {
            StepConfig::Table { rows } => Box::new(TableStep::new(rows.clone())?),
            StepConfig::Panic { strength } => {
                let strength = strength.unwrap_or_else(|| self.strategy.panic_strength_or_default());
                Box::new(PanicStep::new(strength)?)
            }
        })
    }
}
