//! Application configuration.
//!
//! One TOML file configures logging plus both controller feeds. Every
//! field has a default, so an empty file (or no file at all) yields a
//! working configuration pointed at `localhost:8000`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::feeds::{DEFAULT_TANK_ENDPOINT, DEFAULT_WATERING_ENDPOINT};
use crate::logging::LogConfig;
use crate::ws::FeedConfig;

/// Top-level configuration for the monitor.
///
/// # Example
///
/// ```toml
/// [logging]
/// level = "debug"
/// format = "json"
///
/// [tank]
/// url = "ws://controller.local:8000/ws/tanklevel"
///
/// [watering]
/// url = "ws://controller.local:8000/watering"
/// max_reconnect_attempts = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrolinkConfig {
    /// Logging configuration.
    pub logging: LogConfig,
    /// Tank level feed configuration.
    pub tank: FeedConfig,
    /// Watering feed configuration.
    pub watering: FeedConfig,
}

impl Default for HydrolinkConfig {
    fn default() -> Self {
        Self {
            logging: LogConfig::default(),
            tank: FeedConfig::builder()
                .url(DEFAULT_TANK_ENDPOINT)
                .feed("tank")
                .build(),
            watering: FeedConfig::builder()
                .url(DEFAULT_WATERING_ENDPOINT)
                .feed("watering")
                .build(),
        }
    }
}

impl HydrolinkConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFailed` if the file cannot be read,
    /// `ConfigError::Parse` if it is not valid TOML, or
    /// `ConfigError::InvalidEndpoint` if a feed URL fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` or `ConfigError::InvalidEndpoint`.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates both feed endpoints.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEndpoint` for a non-WebSocket URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tank.validate()?;
        self.watering.validate()
    }
}
