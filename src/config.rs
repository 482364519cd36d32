//! Engine configuration with validation and defaults
//!
//! Configuration is fixed once an engine is constructed. It can be built in
//! code, loaded from a TOML file, or parsed from JSON.

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Limits and tuning for a single Coin Toss engine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Display name of the game
    pub name: String,
    pub max_number_of_coins: u32,
    pub max_wager: f64,
    /// Fraction kept by the house, e.g. 0.02
    pub house_margin: f64,
    pub simulation: SimulationConfig,
    /// Capacity of the broadcast channel used by `subscribe_channel`
    pub event_channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "Coin Toss".to_string(),
            max_number_of_coins: 10,
            max_wager: 1000.0,
            house_margin: 0.02,
            simulation: SimulationConfig::default(),
            event_channel_capacity: 1024,
        }
    }
}

/// Pretend-oracle latency and randomness source
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SimulationConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Fixed seed for reproducible tosses; entropy-seeded when absent
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 1000,
            max_delay_ms: 3000,
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// No artificial latency and a fixed seed, for tests and tooling
    pub fn instant(seed: u64) -> Self {
        Self {
            simulation: SimulationConfig {
                min_delay_ms: 0,
                max_delay_ms: 0,
                rng_seed: Some(seed),
            },
            ..Default::default()
        }
    }

    /// Load and validate a TOML configuration file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: EngineConfig = toml::from_str(&content)?;
        config
            .validate()
            .map_err(|e| ConfigurationError::ValidationFailed(e.to_string()))?;
        Ok(config)
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config
            .validate()
            .map_err(|e| ConfigurationError::ValidationFailed(e.to_string()))?;
        Ok(config)
    }

    /// Validate configuration for logical consistency
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.max_number_of_coins == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "max_number_of_coins must be > 0".to_string(),
            ));
        }

        if !self.max_wager.is_finite() || self.max_wager <= 0.0 {
            return Err(ConfigValidationError::InvalidValue(format!(
                "max_wager must be a positive finite amount, got {}",
                self.max_wager
            )));
        }

        if !(0.0..1.0).contains(&self.house_margin) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "house_margin must be in [0, 1), got {}",
                self.house_margin
            )));
        }

        if self.simulation.min_delay_ms > self.simulation.max_delay_ms {
            return Err(ConfigValidationError::LogicalInconsistency(format!(
                "min_delay_ms ({}) exceeds max_delay_ms ({})",
                self.simulation.min_delay_ms, self.simulation.max_delay_ms
            )));
        }

        if self.event_channel_capacity == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "event_channel_capacity must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.simulation.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.simulation.max_delay_ms)
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    InvalidValue(String),
    LogicalInconsistency(String),
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigValidationError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
            ConfigValidationError::LogicalInconsistency(msg) => write!(f, "Configuration logical inconsistency: {}", msg),
        }
    }
}

impl std::error::Error for ConfigValidationError {}
