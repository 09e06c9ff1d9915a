//! Telemetry reading - the last-value cache entry.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Percent, Timestamp};

/// A single accepted telemetry reading.
///
/// Produced only from successfully decoded inbound messages. The client is
/// a last-value cache: newer readings overwrite older ones, nothing is
/// queued. Across a disconnect the previous reading is retained and served
/// as stale data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Clamped value in `[0, 100]`.
    pub value: Percent,
    /// Wall-clock time the reading was received.
    pub received_at: Timestamp,
}

impl Reading {
    /// Creates a reading with an explicit receipt time.
    #[must_use]
    pub fn new(value: Percent, received_at: Timestamp) -> Self {
        Self { value, received_at }
    }

    /// Creates a reading stamped with the current wall-clock time.
    #[must_use]
    pub fn now(value: Percent) -> Self {
        Self::new(value, Timestamp::now())
    }

    /// Age of this reading in milliseconds, relative to `now`.
    #[must_use]
    pub fn age_millis(&self, now: Timestamp) -> i64 {
        self.received_at.millis_until(now)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.value, self.received_at)
    }
}
