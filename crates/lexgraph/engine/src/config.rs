//! Engine configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for ingestion strictness and traversal ceilings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Ceiling applied to every caller-supplied traversal depth.
    pub max_traversal_depth: usize,
    /// Step budget for conflict queries when the caller passes none.
    pub default_step_budget: usize,
    /// Reject cases whose court is missing from the hierarchy instead of
    /// accepting them with a `HierarchyUnknown` warning.
    pub reject_unknown_court_on_case: bool,
    /// Require both endpoints of a citation to be ingested first.
    pub require_known_cases_for_citation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_traversal_depth: 32,
            default_step_budget: 100_000,
            reject_unknown_court_on_case: false,
            require_known_cases_for_citation: true,
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file, falling back to defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Clamp a caller-supplied depth to the configured ceiling.
    pub fn clamp_depth(&self, requested: usize) -> usize {
        requested.min(self.max_traversal_depth)
    }
}
