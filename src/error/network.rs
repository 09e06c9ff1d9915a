//! Network-related error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Network error covering connection establishment, TLS, and WebSocket
/// runtime failures.
///
/// Every variant except [`NetworkError::Tls`] is recoverable: the client
/// absorbs it and schedules a reconnect rather than propagating it to the
/// host.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkError {
    /// Connection to the telemetry endpoint failed.
    #[error("[Network] Connection failed: {reason}")]
    ConnectionFailed {
        /// Reason for the connection failure.
        reason: String,
    },

    /// Connection attempt timed out.
    #[error("[Network] Connection timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// TLS/SSL error occurred.
    #[error("[Network] TLS error: {reason}")]
    Tls {
        /// Reason for the TLS error.
        reason: String,
    },

    /// WebSocket protocol or I/O error occurred.
    #[error("[Network] WebSocket error: {reason}")]
    WebSocket {
        /// Reason for the WebSocket error.
        reason: String,
    },

    /// Connection was closed.
    #[error("[Network] Connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for the connection closure.
        reason: String,
    },
}

impl NetworkError {
    /// Returns true if this error is recoverable (can be retried).
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Tls { .. })
    }

    /// Maps a tungstenite error into the hydrolink taxonomy.
    #[must_use]
    pub fn from_ws(err: &tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::Tls(e) => Self::Tls {
                reason: e.to_string(),
            },
            WsError::ConnectionClosed | WsError::AlreadyClosed => Self::ConnectionClosed {
                reason: err.to_string(),
            },
            _ => Self::WebSocket {
                reason: err.to_string(),
            },
        }
    }
}
