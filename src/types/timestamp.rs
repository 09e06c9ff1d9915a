//! Timestamp type for representing Unix millisecond timestamps.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use super::ValidationError;

/// Timestamp type - milliseconds since Unix epoch.
///
/// # Examples
///
/// ```
/// use hydrolink::types::Timestamp;
///
/// let ts = Timestamp::now();
/// assert!(ts.as_millis() > 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Zero timestamp constant.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Timestamp` from milliseconds since Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidTimestamp` if the value is negative.
    pub fn new(millis: i64) -> Result<Self, ValidationError> {
        if millis < 0 {
            return Err(ValidationError::InvalidTimestamp(millis));
        }
        Ok(Self(millis))
    }

    /// Returns the current wall-clock timestamp.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("System time before Unix epoch");
        Self(duration.as_millis() as i64)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    #[must_use]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Returns the timestamp as seconds since Unix epoch.
    #[must_use]
    pub const fn as_secs(&self) -> i64 {
        self.0 / 1000
    }

    /// Milliseconds elapsed from this timestamp to `other`.
    ///
    /// Saturates at zero when `other` is earlier.
    #[must_use]
    pub fn millis_until(&self, other: Timestamp) -> i64 {
        (other.0 - self.0).max(0)
    }

    /// Converts to a `DateTime<Utc>`.
    #[must_use]
    pub fn to_datetime(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.0)
            .single()
            .unwrap_or_else(|| Utc.timestamp_millis_opt(0).unwrap())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_new_valid() {
        let ts = Timestamp::new(1_704_067_200_000).unwrap();
        assert_eq!(ts.as_millis(), 1_704_067_200_000);
        assert_eq!(ts.as_secs(), 1_704_067_200);
    }

    #[test]
    fn test_timestamp_new_negative() {
        let result = Timestamp::new(-1);
        assert!(matches!(result, Err(ValidationError::InvalidTimestamp(_))));
    }

    #[test]
    fn test_timestamp_now() {
        let ts = Timestamp::now();
        assert!(ts.as_millis() > 0);
    }

    #[test]
    fn test_timestamp_millis_until() {
        let a = Timestamp::new(1000).unwrap();
        let b = Timestamp::new(3500).unwrap();
        assert_eq!(a.millis_until(b), 2500);
        assert_eq!(b.millis_until(a), 0);
    }

    #[test]
    fn test_timestamp_to_datetime() {
        let ts = Timestamp::new(1_704_067_200_000).unwrap();
        assert_eq!(ts.to_datetime().timestamp_millis(), 1_704_067_200_000);
    }

    #[test]
    fn test_timestamp_serde_roundtrip() {
        let ts = Timestamp::new(1_704_067_200_000).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }
}
