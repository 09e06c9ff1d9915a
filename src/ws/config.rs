//! Telemetry feed connection configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Configuration for a telemetry feed connection.
///
/// Contains the endpoint, connection timeout, and reconnection policy.
/// The default backoff schedule is 1s, 2s, 4s, 8s, then capped at 10s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// WebSocket endpoint URL.
    pub url: String,

    /// Feed identifier for logging (e.g. "tank", "watering").
    #[serde(default)]
    pub feed: String,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Whether automatic reconnection is enabled.
    #[serde(default = "default_reconnect_enabled")]
    pub reconnect_enabled: bool,

    /// Maximum number of reconnection attempts (0 = unlimited).
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Initial reconnection delay in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Maximum reconnection delay in milliseconds (backoff cap).
    #[serde(default = "default_max_reconnect_delay_ms")]
    pub max_reconnect_delay_ms: u64,

    /// Backoff multiplier for exponential backoff.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_reconnect_enabled() -> bool {
    true
}

fn default_max_reconnect_attempts() -> u32 {
    0 // unlimited
}

fn default_reconnect_delay_ms() -> u64 {
    1_000
}

fn default_max_reconnect_delay_ms() -> u64 {
    10_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            feed: String::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
            reconnect_enabled: default_reconnect_enabled(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_delay_ms: default_max_reconnect_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl FeedConfig {
    /// Creates a new builder for `FeedConfig`.
    #[must_use]
    pub fn builder() -> FeedConfigBuilder {
        FeedConfigBuilder::default()
    }

    /// Validates the endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEndpoint` unless the URL carries a
    /// `ws://` or `wss://` scheme.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.starts_with("ws://") || self.url.starts_with("wss://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidEndpoint {
                url: self.url.clone(),
            })
        }
    }

    /// Returns the connection timeout as a Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Calculates the reconnect delay for a given attempt count.
    ///
    /// `attempt` is the number of retries already scheduled, read before
    /// the counter is incremented for the new timer, giving the sequence
    /// 1s, 2s, 4s, 8s, 10s, 10s, ... with the default settings.
    #[must_use]
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    pub fn reconnect_delay_for(&self, attempt: u32) -> Duration {
        let delay = self.reconnect_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        let capped = delay.min(self.max_reconnect_delay_ms as f64) as u64;
        Duration::from_millis(capped)
    }

    /// Returns whether another reconnection should be attempted after
    /// `attempt` retries.
    #[must_use]
    pub fn should_reconnect(&self, attempt: u32) -> bool {
        self.reconnect_enabled
            && (self.max_reconnect_attempts == 0 || attempt < self.max_reconnect_attempts)
    }
}

/// Builder for `FeedConfig`.
#[derive(Debug, Default)]
pub struct FeedConfigBuilder {
    url: Option<String>,
    feed: Option<String>,
    connect_timeout_ms: Option<u64>,
    reconnect_enabled: Option<bool>,
    max_reconnect_attempts: Option<u32>,
    reconnect_delay_ms: Option<u64>,
    max_reconnect_delay_ms: Option<u64>,
    backoff_multiplier: Option<f64>,
}

impl FeedConfigBuilder {
    /// Sets the WebSocket URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the feed identifier used in logging.
    #[must_use]
    pub fn feed(mut self, feed: impl Into<String>) -> Self {
        self.feed = Some(feed.into());
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Sets whether reconnection is enabled.
    #[must_use]
    pub fn reconnect_enabled(mut self, enabled: bool) -> Self {
        self.reconnect_enabled = Some(enabled);
        self
    }

    /// Sets the maximum reconnection attempts (0 = unlimited).
    #[must_use]
    pub fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = Some(attempts);
        self
    }

    /// Sets the initial reconnection delay.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay_ms = Some(delay.as_millis() as u64);
        self
    }

    /// Sets the maximum reconnection delay.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn max_reconnect_delay(mut self, delay: Duration) -> Self {
        self.max_reconnect_delay_ms = Some(delay.as_millis() as u64);
        self
    }

    /// Sets the backoff multiplier.
    #[must_use]
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = Some(multiplier);
        self
    }

    /// Builds the `FeedConfig`.
    #[must_use]
    pub fn build(self) -> FeedConfig {
        FeedConfig {
            url: self.url.unwrap_or_default(),
            feed: self.feed.unwrap_or_default(),
            connect_timeout_ms: self
                .connect_timeout_ms
                .unwrap_or_else(default_connect_timeout_ms),
            reconnect_enabled: self
                .reconnect_enabled
                .unwrap_or_else(default_reconnect_enabled),
            max_reconnect_attempts: self
                .max_reconnect_attempts
                .unwrap_or_else(default_max_reconnect_attempts),
            reconnect_delay_ms: self
                .reconnect_delay_ms
                .unwrap_or_else(default_reconnect_delay_ms),
            max_reconnect_delay_ms: self
                .max_reconnect_delay_ms
                .unwrap_or_else(default_max_reconnect_delay_ms),
            backoff_multiplier: self
                .backoff_multiplier
                .unwrap_or_else(default_backoff_multiplier),
        }
    }
}
