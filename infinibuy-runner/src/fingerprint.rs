//! Plan fingerprinting: a stable identity for (configuration, snapshot).
//!
//! Two runs with the same settings and the same market inputs produce the
//! same `PlanId`, so saved artifacts can be matched without diffing them.

use std::fmt;

use infinibuy_core::MarketSnapshot;
use serde::{Deserialize, Serialize};

use crate::config::PlanConfig;

/// BLAKE3 digest of the canonical plan inputs, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanId(String);

impl PlanId {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for directory names and table headers.
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize)]
struct CanonicalInputs<'a> {
    config: &'a PlanConfig,
    snapshot: &'a MarketSnapshot,
}

/// Hash the canonical JSON of `config` and `snapshot`.
///
/// Struct fields serialize in declaration order, so the JSON is deterministic.
pub fn plan_id(config: &PlanConfig, snapshot: &MarketSnapshot) -> Result<PlanId, serde_json::Error> {
    let json = serde_json::to_vec(&CanonicalInputs { config, snapshot })?;
    Ok(PlanId::from_bytes(&json))
}
