//! Configuration error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error for loading and validating hydrolink settings.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("[Config] Failed to read {path}: {reason}")]
    ReadFailed {
        /// Path that failed to load.
        path: String,
        /// Underlying I/O error description.
        reason: String,
    },

    /// Configuration file could not be parsed.
    #[error("[Config] Parse error: {reason}")]
    Parse {
        /// Parser error description.
        reason: String,
    },

    /// Endpoint URL is not a WebSocket URL.
    #[error("[Config] Invalid endpoint (expected ws:// or wss://): {url}")]
    InvalidEndpoint {
        /// The rejected URL.
        url: String,
    },
}
