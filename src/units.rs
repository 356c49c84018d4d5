//! Unit conversion between metric and imperial display systems.
//!
//! All weather values are stored canonically in metric units; these
//! conversions are applied only at the display boundary so that repeated
//! toggles never compound rounding error.

use serde::{Deserialize, Serialize};

const MPH_PER_KMH: f64 = 0.621371;
const INCHES_PER_MM: f64 = 0.0393701;

/// Display unit system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Celsius, km/h, millimetres
    #[default]
    Metric,
    /// Fahrenheit, mph, inches
    Imperial,
}

/// Convert a temperature between unit systems (°C ↔ °F).
#[must_use]
pub fn convert_temperature(value: f64, from: UnitSystem, to: UnitSystem) -> f64 {
    match (from, to) {
        (UnitSystem::Metric, UnitSystem::Imperial) => value * 9.0 / 5.0 + 32.0,
        (UnitSystem::Imperial, UnitSystem::Metric) => (value - 32.0) * 5.0 / 9.0,
        _ => value,
    }
}

/// Convert a wind speed between unit systems (km/h ↔ mph).
#[must_use]
pub fn convert_wind_speed(value: f64, from: UnitSystem, to: UnitSystem) -> f64 {
    match (from, to) {
        (UnitSystem::Metric, UnitSystem::Imperial) => value * MPH_PER_KMH,
        (UnitSystem::Imperial, UnitSystem::Metric) => value / MPH_PER_KMH,
        _ => value,
    }
}

/// Convert a precipitation amount between unit systems (mm ↔ in).
#[must_use]
pub fn convert_precipitation(value: f64, from: UnitSystem, to: UnitSystem) -> f64 {
    match (from, to) {
        (UnitSystem::Metric, UnitSystem::Imperial) => value * INCHES_PER_MM,
        (UnitSystem::Imperial, UnitSystem::Metric) => value / INCHES_PER_MM,
        _ => value,
    }
}

impl UnitSystem {
    /// Temperature suffix for display
    #[must_use]
    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    /// Wind speed suffix for display
    #[must_use]
    pub fn wind_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "km/h",
            UnitSystem::Imperial => "mph",
        }
    }

    /// Precipitation suffix for display
    #[must_use]
    pub fn precipitation_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "mm",
            UnitSystem::Imperial => "in",
        }
    }
}
