//! Engine configuration loaded from YAML.

use crate::complexity::ComplexityWeights;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Scoring weights for the complexity estimator.
    #[serde(default)]
    pub complexity: ComplexityWeights,

    /// Directory snapshot files are written to and read from.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("task-graph")
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            complexity: ComplexityWeights::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration through the tier order. An explicitly named
    /// file (argument or `TASK_ENGINE_CONFIG`) must load cleanly and its
    /// error propagates; the discovery tiers fall through to the next
    /// candidate and finally to the built-in defaults.
    pub fn load_or_default(explicit: Option<&str>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(path) = std::env::var("TASK_ENGINE_CONFIG") {
            return Self::load(&path);
        }

        if let Ok(config) = Self::load("task-graph/engine.yaml") {
            return Ok(config);
        }

        if let Some(dir) = dirs::config_dir()
            && let Ok(config) = Self::load(dir.join("task-graph-engine/engine.yaml"))
        {
            return Ok(config);
        }

        Ok(Self::default())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.complexity.validate()
    }
}
