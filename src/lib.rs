//! # Hydrolink
//!
//! Reconnecting WebSocket telemetry ingestion for home irrigation controllers.
//!
//! This crate provides:
//! - [`TelemetryClient`](ws::TelemetryClient) - a WebSocket client with
//!   automatic reconnection and capped exponential backoff
//! - Feed adapters for the tank-level and watering telemetry streams
//! - Newtype wrappers for telemetry values (`Percent`, `Reading`, `Timestamp`)
//! - Error types and handling framework
//! - Structured logging and TOML configuration
//!
//! # Architecture
//!
//! The crate is organized into:
//! - `ws` - WebSocket client infrastructure (config, state machine, client)
//! - `feeds` - Feed-specific adapters (tank level, watering system)
//! - `types` - Core value types
//! - `error` - Error types and handling
//!
//! # Example
//!
//! ```ignore
//! use hydrolink::feeds::TankLevelFeed;
//! use hydrolink::ws::FeedConfig;
//!
//! let config = FeedConfig::builder()
//!     .url("ws://controller.local:8000/ws/tanklevel")
//!     .feed("tank")
//!     .build();
//!
//! let feed = TankLevelFeed::new(config, callback)?;
//! feed.start();
//! // ... readings arrive on the callback; latest is cached:
//! let level = feed.level();
//! feed.shutdown().await;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]

/// Core value types and newtype wrappers
pub mod types;

/// Error types and handling
pub mod error;

/// WebSocket client infrastructure
pub mod ws;

/// Feed-specific adapters
pub mod feeds;

/// Structured logging setup
pub mod logging;

/// Application configuration
pub mod config;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::HydrolinkConfig;
    pub use crate::error::{ConfigError, DataError, HydrolinkError, NetworkError};
    pub use crate::feeds::{TankLevelFeed, WateringCommand, WateringFeed};
    pub use crate::types::{MoistureStatus, Percent, Reading, TankStatus, Timestamp};
    pub use crate::ws::{
        ConnectionState, FeedConfig, FeedConfigBuilder, TelemetryCallback, TelemetryClient,
        TelemetryDecoder,
    };
}
