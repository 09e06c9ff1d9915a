//! Error types and handling framework.
//!
//! Hierarchical error types mirroring the failure taxonomy of the
//! telemetry client:
//! - [`NetworkError`] - transport establishment and runtime failures
//! - [`DataError`] - payload decode/encode failures
//! - [`ConfigError`] - configuration loading and validation failures
//!
//! Transport and payload failures are absorbed inside the client (logged
//! and converted to retries or discards); these types surface through the
//! callback interface and through fallible construction paths only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod config;
mod data;
mod network;

pub use config::ConfigError;
pub use data::DataError;
pub use network::NetworkError;

/// Top-level error type for hydrolink operations.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HydrolinkError {
    /// Network-related error.
    #[error("{0}")]
    Network(#[from] NetworkError),

    /// Payload encode/decode error.
    #[error("{0}")]
    Data(#[from] DataError),

    /// Configuration error.
    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl HydrolinkError {
    /// Returns true if this error is recoverable through retry.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_recoverable(),
            // A payload that failed to decode is skipped, not retried;
            // a bad config never fixes itself.
            Self::Data(_) | Self::Config(_) => false,
        }
    }

    /// Returns the error category as a string.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Data(_) => "data",
            Self::Config(_) => "config",
        }
    }
}

/// A specialized Result type for hydrolink operations.
pub type Result<T> = std::result::Result<T, HydrolinkError>;
