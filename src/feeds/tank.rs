//! Water tank level feed.
//!
//! The controller publishes `{ "amount": <number> }` frames on
//! `/ws/tanklevel`, where `amount` is the fill level as a percentage.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::{Reading, TankStatus};
use crate::ws::{ConnectionState, FeedConfig, TelemetryCallback, TelemetryClient, TelemetryDecoder};

/// Default tank level endpoint on the irrigation controller.
pub const DEFAULT_TANK_ENDPOINT: &str = "ws://localhost:8000/ws/tanklevel";

/// Wire frame published by the tank level endpoint.
#[derive(Debug, Deserialize)]
struct TankFrame {
    amount: Option<f64>,
}

/// Decoder for tank level frames.
///
/// Frames without a finite `amount` are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct TankDecoder;

impl TelemetryDecoder for TankDecoder {
    fn decode(&self, payload: &str) -> Option<f64> {
        let frame: TankFrame = serde_json::from_str(payload).ok()?;
        frame.amount.filter(|v| v.is_finite())
    }
}

/// Tank level feed adapter.
///
/// Owns a [`TelemetryClient`] configured against the tank endpoint and
/// exposes the cached level and its classification.
pub struct TankLevelFeed {
    client: TelemetryClient,
}

impl TankLevelFeed {
    /// Creates a tank feed with the given configuration and callback.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEndpoint` for a non-WebSocket URL.
    pub fn new(
        config: FeedConfig,
        callback: Arc<dyn TelemetryCallback>,
    ) -> Result<Self, ConfigError> {
        let client = TelemetryClient::new(config, Arc::new(TankDecoder), callback)?;
        Ok(Self { client })
    }

    /// Creates a tank feed against the default controller endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the default configuration is invalid.
    pub fn with_defaults(callback: Arc<dyn TelemetryCallback>) -> Result<Self, ConfigError> {
        let config = FeedConfig::builder()
            .url(DEFAULT_TANK_ENDPOINT)
            .feed("tank")
            .build();
        Self::new(config, callback)
    }

    /// Starts the feed.
    pub fn start(&self) {
        self.client.start();
    }

    /// Shuts the feed down. Idempotent.
    pub async fn shutdown(&self) {
        self.client.shutdown().await;
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.client.state()
    }

    /// Returns the most recent tank level reading, if any.
    #[must_use]
    pub fn level(&self) -> Option<Reading> {
        self.client.last_reading()
    }

    /// Classifies the most recent tank level reading.
    #[must_use]
    pub fn status(&self) -> Option<TankStatus> {
        self.level().map(|r| TankStatus::classify(r.value))
    }

    /// Returns the underlying client, for status inspection.
    #[must_use]
    pub fn client(&self) -> &TelemetryClient {
        &self.client
    }
}
