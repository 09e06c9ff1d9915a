//! Core value types for irrigation telemetry.
//!
//! All telemetry values flowing through the client are wrapped in small
//! newtypes so that a raw wire number cannot be confused with a validated
//! display value.

use thiserror::Error;

mod percent;
mod reading;
mod status;
mod timestamp;

pub use percent::Percent;
pub use reading::Reading;
pub use status::{MoistureStatus, TankStatus};
pub use timestamp::Timestamp;

/// Validation error for value type construction.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ValidationError {
    /// Value is outside the `[0, 100]` percent range.
    #[error("value {0} is outside the 0..=100 percent range")]
    OutOfRange(f64),

    /// Timestamp is negative.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}
