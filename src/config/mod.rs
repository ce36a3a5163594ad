//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::models::POINT_PALETTE;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Estimation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationConfig {
    /// Minutes of work per story point; time is hidden while unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes_per_point: Option<u64>,

    /// Point values offered when estimating
    #[serde(default = "default_point_palette")]
    pub point_palette: Vec<u32>,
}

fn default_point_palette() -> Vec<u32> {
    POINT_PALETTE.to_vec()
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            minutes_per_point: None,
            point_palette: default_point_palette(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub estimation: EstimationConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            estimation: EstimationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.estimation.minutes_per_point == Some(0) {
            return Err(ConfigError::ValidationError(
                "minutes_per_point must be greater than 0".to_string(),
            ));
        }

        let palette = &self.estimation.point_palette;
        if palette.is_empty() {
            return Err(ConfigError::ValidationError(
                "point_palette must not be empty".to_string(),
            ));
        }

        if palette.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ConfigError::ValidationError(
                "point_palette must be strictly ascending".to_string(),
            ));
        }

        Ok(())
    }
}
