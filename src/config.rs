use std::path::Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::{MAX_PLAYERS, MIN_PLAYERS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("default_player_count must be between 2 and 6, got {0}")]
    PlayerCount(usize),
}

/// Engine settings. Every field has a default, so `{}` is a valid config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Players dealt in when `create_match` is not told how many.
    pub default_player_count: usize,
    /// Fixed RNG seed for reproducible matches; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_player_count: 4,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.default_player_count) {
            return Err(ConfigError::PlayerCount(self.default_player_count));
        }
        Ok(())
    }
}
