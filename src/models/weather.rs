//! Current conditions and the WMO weather-code mapping

use crate::units::{self, UnitSystem};
use serde::{Deserialize, Serialize};

/// Semantic weather condition derived from the upstream WMO code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Clear,
    PartlyCloudy,
    Cloudy,
    LightRain,
    Rainy,
    HeavyRain,
    Snow,
    Thunderstorm,
}

impl Condition {
    /// Map a WMO weather code to its semantic condition.
    ///
    /// Unrecognized codes fall back to `Cloudy`.
    #[must_use]
    pub fn from_weather_code(code: u16) -> Self {
        match code {
            0 => Condition::Clear,
            1 | 2 => Condition::PartlyCloudy,
            3 | 45 | 48 => Condition::Cloudy,
            51 | 53 | 56 | 61 | 66 | 80 => Condition::LightRain,
            55 | 57 | 63 | 67 | 81 => Condition::Rainy,
            65 | 82 => Condition::HeavyRain,
            71 | 73 | 75 | 77 | 85 | 86 => Condition::Snow,
            95 | 96 | 99 => Condition::Thunderstorm,
            _ => Condition::Cloudy,
        }
    }

    /// Lowercase label used by condition-keyed display assets
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Clear => "clear",
            Condition::PartlyCloudy => "partly cloudy",
            Condition::Cloudy => "cloudy",
            Condition::LightRain => "light rain",
            Condition::Rainy => "rainy",
            Condition::HeavyRain => "heavy rain",
            Condition::Snow => "snow",
            Condition::Thunderstorm => "thunderstorm",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Human-readable description for a WMO weather code
#[must_use]
pub fn weather_code_description(code: u16) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// US AQI category (EPA breakpoints)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirQualityCategory {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

impl AirQualityCategory {
    /// Categorize a US AQI value
    #[must_use]
    pub fn from_us_aqi(aqi: f64) -> Self {
        match aqi {
            a if a <= 50.0 => AirQualityCategory::Good,
            a if a <= 100.0 => AirQualityCategory::Moderate,
            a if a <= 150.0 => AirQualityCategory::UnhealthyForSensitiveGroups,
            a if a <= 200.0 => AirQualityCategory::Unhealthy,
            a if a <= 300.0 => AirQualityCategory::VeryUnhealthy,
            _ => AirQualityCategory::Hazardous,
        }
    }

    /// Display label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            AirQualityCategory::Good => "Good",
            AirQualityCategory::Moderate => "Moderate",
            AirQualityCategory::UnhealthyForSensitiveGroups => "Unhealthy for sensitive groups",
            AirQualityCategory::Unhealthy => "Unhealthy",
            AirQualityCategory::VeryUnhealthy => "Very unhealthy",
            AirQualityCategory::Hazardous => "Hazardous",
        }
    }
}

/// A snapshot of current conditions at one location.
///
/// Temperature, feels-like, wind speed, and precipitation are canonical
/// metric values; `in_units` converts a copy for display.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CurrentWeather {
    /// Display label for the location
    pub location: String,
    /// Temperature in °C
    pub temperature: f64,
    /// Semantic condition
    pub condition: Condition,
    /// Human-readable condition description
    pub description: String,
    /// Apparent temperature in °C
    pub feels_like: f64,
    /// Relative humidity percentage
    pub humidity: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// Precipitation amount in mm
    pub precipitation: f64,
    /// UV index
    pub uv_index: f64,
    /// Visibility in km
    pub visibility: f64,
    /// Surface pressure in hPa
    pub pressure: f64,
    /// Raw upstream weather code
    pub weather_code: u16,
    /// US AQI, absent when the air-quality sub-request failed
    pub air_quality_index: Option<f64>,
}

impl CurrentWeather {
    /// Copy with temperature, feels-like, wind, and precipitation
    /// converted from canonical metric into `system`.
    #[must_use]
    pub fn in_units(&self, system: UnitSystem) -> Self {
        let from = UnitSystem::Metric;
        Self {
            temperature: units::convert_temperature(self.temperature, from, system),
            feels_like: units::convert_temperature(self.feels_like, from, system),
            wind_speed: units::convert_wind_speed(self.wind_speed, from, system),
            precipitation: units::convert_precipitation(self.precipitation, from, system),
            ..self.clone()
        }
    }

    /// AQI category, when an index is present
    #[must_use]
    pub fn air_quality_category(&self) -> Option<AirQualityCategory> {
        self.air_quality_index.map(AirQualityCategory::from_us_aqi)
    }
}
