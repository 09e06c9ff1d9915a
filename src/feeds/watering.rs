//! Watering system feed.
//!
//! The controller publishes partial state frames on `/watering`:
//! `{ "moisture": n, "temperature": n, "watering": bool,
//! "waterAmount": n }`, all fields optional. Absent fields leave the
//! cached snapshot unchanged. The same socket accepts
//! `{ "command": "START"|"STOP", "amount": n }` to drive the pump.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DataError};
use crate::types::{MoistureStatus, Reading};
use crate::ws::{ConnectionState, FeedConfig, TelemetryCallback, TelemetryClient, TelemetryDecoder};

/// Default watering endpoint on the irrigation controller.
pub const DEFAULT_WATERING_ENDPOINT: &str = "ws://localhost:8000/watering";

/// Wire frame published by the watering endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WateringFrame {
    moisture: Option<f64>,
    temperature: Option<f64>,
    watering: Option<bool>,
    water_amount: Option<f64>,
}

/// Outbound pump command.
///
/// Serialized as `{ "command": "START", "amount": 250.0 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WateringCommand {
    /// Pump action: `START` or `STOP`.
    pub command: PumpAction,
    /// Water amount in milliliters.
    pub amount: f64,
}

/// Pump action verb for [`WateringCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PumpAction {
    /// Start the pump.
    Start,
    /// Stop the pump.
    Stop,
}

impl WateringCommand {
    /// Start command for the given amount of water in milliliters.
    #[must_use]
    pub fn start(amount: f64) -> Self {
        Self {
            command: PumpAction::Start,
            amount,
        }
    }

    /// Stop command.
    #[must_use]
    pub fn stop() -> Self {
        Self {
            command: PumpAction::Stop,
            amount: 0.0,
        }
    }
}

/// Cached view of the watering system state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WateringSnapshot {
    /// Soil moisture percentage, if a frame carried one.
    pub moisture: Option<f64>,
    /// Air temperature in degrees Celsius.
    pub temperature: Option<f64>,
    /// Whether the pump is currently running.
    pub watering: bool,
    /// Last reported water amount in milliliters.
    pub water_amount: Option<f64>,
}

impl WateringSnapshot {
    /// Classifies the cached moisture value.
    #[must_use]
    pub fn moisture_status(&self) -> Option<MoistureStatus> {
        self.moisture.map(MoistureStatus::classify)
    }
}

/// Decoder for watering frames.
///
/// Merges each frame into a shared snapshot and reports the moisture
/// field as the feed's primary reading. Frames that carry no finite
/// moisture still update the snapshot; they just produce no reading.
#[derive(Debug, Clone, Default)]
pub struct WateringDecoder {
    snapshot: Arc<RwLock<WateringSnapshot>>,
}

impl WateringDecoder {
    fn new(snapshot: Arc<RwLock<WateringSnapshot>>) -> Self {
        Self { snapshot }
    }
}

impl TelemetryDecoder for WateringDecoder {
    fn decode(&self, payload: &str) -> Option<f64> {
        let frame: WateringFrame = serde_json::from_str(payload).ok()?;
        let moisture = frame.moisture.filter(|v| v.is_finite());
        {
            let mut snap = self.snapshot.write();
            if moisture.is_some() {
                snap.moisture = moisture;
            }
            if let Some(t) = frame.temperature.filter(|v| v.is_finite()) {
                snap.temperature = Some(t);
            }
            if let Some(w) = frame.watering {
                snap.watering = w;
            }
            if let Some(a) = frame.water_amount.filter(|v| v.is_finite()) {
                snap.water_amount = Some(a);
            }
        }
        moisture
    }
}

/// Watering feed adapter.
///
/// Owns a [`TelemetryClient`] against the watering endpoint, keeps a
/// merged snapshot of the system state, and sends pump commands while
/// the connection is open.
pub struct WateringFeed {
    client: TelemetryClient,
    snapshot: Arc<RwLock<WateringSnapshot>>,
}

impl WateringFeed {
    /// Creates a watering feed with the given configuration and callback.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEndpoint` for a non-WebSocket URL.
    pub fn new(
        config: FeedConfig,
        callback: Arc<dyn TelemetryCallback>,
    ) -> Result<Self, ConfigError> {
        let snapshot = Arc::new(RwLock::new(WateringSnapshot::default()));
        let decoder = Arc::new(WateringDecoder::new(Arc::clone(&snapshot)));
        let client = TelemetryClient::new(config, decoder, callback)?;
        Ok(Self { client, snapshot })
    }

    /// Creates a watering feed against the default controller endpoint.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the default configuration is invalid.
    pub fn with_defaults(callback: Arc<dyn TelemetryCallback>) -> Result<Self, ConfigError> {
        let config = FeedConfig::builder()
            .url(DEFAULT_WATERING_ENDPOINT)
            .feed("watering")
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

    /// Returns the most recent moisture reading, if any.
    #[must_use]
    pub fn moisture(&self) -> Option<Reading> {
        self.client.last_reading()
    }

    /// Returns the merged watering system snapshot.
    #[must_use]
    pub fn snapshot(&self) -> WateringSnapshot {
        *self.snapshot.read()
    }

    /// Sends a pump command if the connection is open.
    ///
    /// Returns false when the command was dropped because the connection
    /// is not open.
    ///
    /// # Errors
    ///
    /// Returns `DataError::Encode` only if serialization fails.
    pub fn send_command(&self, command: WateringCommand) -> Result<bool, DataError> {
        self.client.try_send_json(&command)
    }

    /// Returns the underlying client, for status inspection.
    #[must_use]
    pub fn client(&self) -> &TelemetryClient {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder() -> (WateringDecoder, Arc<RwLock<WateringSnapshot>>) {
        let snapshot = Arc::new(RwLock::new(WateringSnapshot::default()));
        (WateringDecoder::new(Arc::clone(&snapshot)), snapshot)
    }

    #[test]
    fn test_decodes_moisture_and_updates_snapshot() {
        let (decoder, snapshot) = decoder();
        let value = decoder.decode(
            r#"{"moisture": 41.5, "temperature": 22.0, "watering": true, "waterAmount": 250}"#,
        );
        assert_eq!(value, Some(41.5));

        let snap = *snapshot.read();
        assert_eq!(snap.moisture, Some(41.5));
        assert_eq!(snap.temperature, Some(22.0));
        assert!(snap.watering);
        assert_eq!(snap.water_amount, Some(250.0));
        assert_eq!(snap.moisture_status(), Some(MoistureStatus::Moderate));
    }

    #[test]
    fn test_absent_fields_leave_snapshot_unchanged() {
        let (decoder, snapshot) = decoder();
        decoder.decode(r#"{"moisture": 25.0, "temperature": 19.5}"#);
        let value = decoder.decode(r#"{"watering": true}"#);

        assert_eq!(value, None);
        let snap = *snapshot.read();
        assert_eq!(snap.moisture, Some(25.0));
        assert_eq!(snap.temperature, Some(19.5));
        assert!(snap.watering);
        assert_eq!(snap.moisture_status(), Some(MoistureStatus::Dry));
    }

    #[test]
    fn test_malformed_payload_is_discarded() {
        let (decoder, snapshot) = decoder();
        assert_eq!(decoder.decode("not json"), None);
        assert_eq!(decoder.decode(r#"{"moisture": "wet"}"#), None);
        assert_eq!(*snapshot.read(), WateringSnapshot::default());
    }

    #[test]
    fn test_command_wire_format() {
        let start = serde_json::to_string(&WateringCommand::start(250.0)).unwrap();
        assert_eq!(start, r#"{"command":"START","amount":250.0}"#);

        let stop = serde_json::to_string(&WateringCommand::stop()).unwrap();
        assert_eq!(stop, r#"{"command":"STOP","amount":0.0}"#);
    }
}
