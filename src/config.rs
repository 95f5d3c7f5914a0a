//! Engine and store configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Numeric policy of the propagation engine.
///
/// Every field has a default, so a config file only needs to name what it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Efficiency used when neither the edge nor the driving gear supplies one.
    pub default_mesh_efficiency: f64,
    /// Upper bound (inclusive) of an accepted efficiency. The lower bound is
    /// exclusive zero.
    pub max_mesh_efficiency: f64,
    /// Root speed when the request carries no `rpmInput`.
    pub default_rpm: f64,
    /// Pitch-radius ratio above which a non-worm mesh is reported.
    pub ratio_warning_threshold: f64,
    /// Largest module difference still considered a match.
    pub module_tolerance: f64,
    /// Largest pressure or helix angle difference (degrees) still considered a match.
    pub angle_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_mesh_efficiency: 0.98,
            max_mesh_efficiency: 2.0,
            default_rpm: 1000.0,
            ratio_warning_threshold: 15.0,
            module_tolerance: 1e-6,
            angle_tolerance: 1e-6,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// `Some(efficiency)` when it lies in `(0, max_mesh_efficiency]`.
    pub fn accept_efficiency(&self, efficiency: f64) -> Option<f64> {
        (efficiency > 0.0 && efficiency <= self.max_mesh_efficiency).then_some(efficiency)
    }
}

/// Where saved request payloads live.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreConfig {
    /// In-memory (lost on exit)
    #[default]
    Memory,

    /// One pretty-printed JSON file per saved payload.
    Directory { path: PathBuf },
}
