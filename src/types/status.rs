//! Derived status classifications.
//!
//! Pure policy over the last reading; recomputed by the host on every
//! accepted value, never stored by the client.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Percent;

/// Tank fill-level classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TankStatus {
    /// Below 20% - refill soon.
    Low,
    /// Between 20% and 90% inclusive.
    Normal,
    /// Above 90%.
    Full,
}

impl TankStatus {
    /// Classifies a tank level: `Low` below 20%, `Full` above 90%.
    #[must_use]
    pub fn classify(level: Percent) -> Self {
        let v = level.as_f64();
        if v < 20.0 {
            Self::Low
        } else if v > 90.0 {
            Self::Full
        } else {
            Self::Normal
        }
    }

    /// Returns true if the tank is running low.
    #[must_use]
    pub fn is_low(&self) -> bool {
        matches!(self, Self::Low)
    }

    /// Returns the status as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for TankStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Soil moisture classification for the watering feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoistureStatus {
    /// Below 30% - soil is dry.
    Dry,
    /// Between 30% and 70% inclusive.
    Moderate,
    /// Above 70% - soil is saturated.
    Wet,
}

impl MoistureStatus {
    /// Classifies a soil moisture percentage: `Dry` below 30%, `Wet` above 70%.
    #[must_use]
    pub fn classify(moisture: f64) -> Self {
        if moisture < 30.0 {
            Self::Dry
        } else if moisture > 70.0 {
            Self::Wet
        } else {
            Self::Moderate
        }
    }

    /// Returns the status as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Dry => "dry",
            Self::Moderate => "moderate",
            Self::Wet => "wet",
        }
    }
}

impl fmt::Display for MoistureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
