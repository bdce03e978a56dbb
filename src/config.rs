use crate::error::ConfigError;
use crate::limits::QuotaTable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// How the branch phase orders branch nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchOrdering {
    /// Breadth-first from the root. Every branch is visited after its parent, so
    /// chains of any depth convert in a single run.
    #[default]
    DepthOrdered,
    /// Submission order, single pass. A branch listed before its parent is
    /// skipped as unresolved.
    ListOrder,
}

/// Tunables for the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub branch_ordering: BranchOrdering,
    /// How long a conversion lease on a mind map stays valid.
    pub lock_ttl_ms: u64,
}

impl EngineConfig {
    pub fn lock_ttl(&self) -> Duration {
        Duration::from_millis(self.lock_ttl_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            branch_ordering: BranchOrdering::default(),
            lock_ttl_ms: 30_000,
        }
    }
}

/// Engine configuration plus plan quotas, as read from a settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineConfig,
    pub quotas: QuotaTable,
}

impl Settings {
    /// Parses settings from JSON. Missing sections fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }
}
