//! Payload decode/encode error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Data error for telemetry payload handling.
///
/// Malformed inbound payloads are non-fatal: the decoder logs them and the
/// message is discarded with the connection left open.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataError {
    /// Inbound payload could not be parsed.
    #[error("[Data] Malformed payload: {reason}")]
    MalformedPayload {
        /// Parser error description.
        reason: String,
    },

    /// Outbound value could not be serialized.
    #[error("[Data] Failed to encode message: {reason}")]
    Encode {
        /// Serializer error description.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_payload_display() {
        let error = DataError::MalformedPayload {
            reason: "expected value at line 1".to_string(),
        };
        assert!(error.to_string().contains("Malformed payload"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let error = DataError::Encode {
            reason: "key must be a string".to_string(),
        };
        let json = serde_json::to_string(&error).unwrap();
        let parsed: DataError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, parsed);
    }
}
