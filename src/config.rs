//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! field has a default, so a partial (or missing) file is fine.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::analysis::AnalyzerConfig;
use crate::types::WheelError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Highest stake of the bet series.
    pub max_stake: u32,
    /// Spins of absence before a value becomes a signal.
    pub min_absence: usize,
    /// Alternation window of the no-repetition flag.
    pub no_repetition_window: usize,
    /// Length of a generated random history.
    pub random_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_stake: 8,
            min_absence: 5,
            no_repetition_window: 5,
            random_count: 10,
        }
    }
}

impl EngineConfig {
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            min_absence: self.min_absence,
            no_repetition_window: self.no_repetition_window,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        config
            .validate()
            .with_context(|| format!("Invalid config file: {path}"))?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            info!(path, "No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), WheelError> {
        if self.engine.max_stake < 1 {
            return Err(WheelError::Config("engine.max_stake must be at least 1".into()));
        }
        if self.engine.no_repetition_window < 1 {
            return Err(WheelError::Config(
                "engine.no_repetition_window must be at least 1".into(),
            ));
        }
        if self.engine.random_count < 1 {
            return Err(WheelError::Config("engine.random_count must be at least 1".into()));
        }
        Ok(())
    }
}
