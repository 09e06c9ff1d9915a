//! WebSocket client infrastructure.
//!
//! This module provides the reconnecting telemetry client:
//! - Automatic reconnection with capped exponential backoff
//! - At most one pending reconnect timer per client
//! - Last-value reading cache
//! - Connection state management
//!
//! # Example
//!
//! ```ignore
//! use hydrolink::ws::{FeedConfig, TelemetryClient};
//!
//! let config = FeedConfig::builder()
//!     .url("ws://controller.local:8000/ws/tanklevel")
//!     .feed("tank")
//!     .build();
//!
//! let client = TelemetryClient::new(config, decoder, callback)?;
//! client.start();
//! // ...
//! client.shutdown().await;
//! ```

mod client;
mod config;
mod state;

pub use client::{TelemetryCallback, TelemetryClient, TelemetryDecoder};
pub use config::{FeedConfig, FeedConfigBuilder};
pub use state::ConnectionState;
