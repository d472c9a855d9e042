//! Serializable pipeline configuration.
//!
//! One TOML document carries every knob of a run. All sections are optional
//! and fall back to their defaults, so an empty file is a valid config:
//!
//! ```toml
//! [forecast]
//! horizon_days = 30
//! backtest_days = 28
//!
//! [inventory]
//! lead_time_days = 3
//! service_level = 0.95
//!
//! [clean]
//! drop_items = ["unknown", "error"]
//!
//! [execution]
//! parallel = true
//! threads = 0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use demandlab_core::config::{ConfigError, ForecastConfig, InventoryConfig, InventoryParams};

/// Errors from loading or validating a pipeline configuration.
#[derive(Debug, Error)]
pub enum PipelineConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigError),
}

/// Transaction cleaning rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanConfig {
    /// Item names (after lower-casing and trimming) that are discarded.
    pub drop_items: Vec<String>,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            drop_items: vec!["unknown".into(), "error".into()],
        }
    }
}

/// How per-item work is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Fan items out over a rayon pool.
    pub parallel: bool,
    /// Worker threads for the pool; 0 lets rayon decide.
    pub threads: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: 0,
        }
    }
}

/// Complete configuration of a pipeline run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub forecast: ForecastConfig,
    pub inventory: InventoryConfig,
    pub clean: CleanConfig,
    pub execution: ExecutionConfig,
}

impl PipelineConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, PipelineConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| PipelineConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, PipelineConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize the configuration to TOML.
    pub fn to_toml(&self) -> Result<String, PipelineConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate both parameter bundles before any per-item work.
    pub fn validate(&self) -> Result<InventoryParams, PipelineConfigError> {
        self.forecast.validate()?;
        Ok(self.inventory.validate()?)
    }

    /// Content hash of the configuration, stable across runs.
    ///
    /// Two runs with identical settings share the same id.
    pub fn run_id(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}
