//! Percent type for representing fill levels and moisture readings.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Percent type - a value in `[0, 100]`.
///
/// Wraps an `f64` to ensure readings exposed to the host are always within
/// the displayable range. Wire values are clamped, never rejected, so a
/// misbehaving sensor cannot push the UI out of range.
///
/// # Examples
///
/// ```
/// use hydrolink::types::Percent;
///
/// let level = Percent::clamped(150.0);
/// assert_eq!(level.as_f64(), 100.0);
///
/// let level = Percent::new(42.5).unwrap();
/// assert_eq!(level.as_f64(), 42.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Percent(f64);

impl Percent {
    /// Zero percent constant.
    pub const ZERO: Self = Self(0.0);

    /// Hundred percent constant.
    pub const FULL: Self = Self(100.0);

    /// Creates a new `Percent`, rejecting values outside `[0, 100]`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::OutOfRange` if the value is not within
    /// `[0, 100]` or is not finite.
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(ValidationError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    /// Creates a `Percent` by clamping the value into `[0, 100]`.
    ///
    /// Non-finite input maps to zero.
    #[must_use]
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 100.0))
    }

    /// Returns the underlying `f64` value.
    #[must_use]
    pub const fn as_f64(&self) -> f64 {
        self.0
    }

    /// Returns true if the value is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Scales the percentage against a capacity (e.g. milliliters).
    #[must_use]
    pub fn of(&self, capacity: f64) -> f64 {
        self.0 / 100.0 * capacity
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl From<Percent> for f64 {
    fn from(p: Percent) -> Self {
        p.0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Self::ZERO
    }
}
