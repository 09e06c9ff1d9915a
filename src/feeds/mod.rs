//! Feed adapters for the irrigation controller endpoints.
//!
//! Each adapter pairs a [`TelemetryClient`](crate::ws::TelemetryClient)
//! with the decoder for one endpoint's wire schema and exposes a typed
//! view of the cached telemetry.

mod tank;
mod watering;

pub use tank::{TankDecoder, TankLevelFeed, DEFAULT_TANK_ENDPOINT};
pub use watering::{
    PumpAction, WateringCommand, WateringDecoder, WateringFeed, WateringSnapshot,
    DEFAULT_WATERING_ENDPOINT,
};
