//! Daily and hourly forecast records

use crate::models::weather::Condition;
use crate::units::{self, UnitSystem};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One calendar day's forecast summary
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayForecast {
    /// Calendar date
    pub date: NaiveDate,
    /// Human label ("Today", "Tomorrow", weekday short name)
    pub day: String,
    /// High temperature in °C
    pub high: f64,
    /// Low temperature in °C
    pub low: f64,
    /// Semantic condition
    pub condition: Condition,
    /// Maximum precipitation probability percentage
    pub precipitation: f64,
    /// Mean relative humidity percentage
    pub humidity: f64,
    /// Raw upstream weather code
    pub weather_code: u16,
}

impl DayForecast {
    /// Copy with the temperature range converted into `system`
    #[must_use]
    pub fn in_units(&self, system: UnitSystem) -> Self {
        let from = UnitSystem::Metric;
        Self {
            high: units::convert_temperature(self.high, from, system),
            low: units::convert_temperature(self.low, from, system),
            ..self.clone()
        }
    }
}

/// One hour's forecast reading.
///
/// Carries the absolute timestamp the reading belongs to; windowing slices
/// the series by timestamp, never by raw position.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HourlyRecord {
    /// Start of the hour, in the location's local time
    pub timestamp: NaiveDateTime,
    /// 12-hour clock label ("12 AM", "2 PM")
    pub time: String,
    /// Temperature in °C
    pub temperature: f64,
    /// Semantic condition
    pub condition: Condition,
    /// Precipitation probability percentage
    pub precipitation: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// Raw upstream weather code
    pub weather_code: u16,
}

impl HourlyRecord {
    /// Copy with temperature and wind speed converted into `system`
    #[must_use]
    pub fn in_units(&self, system: UnitSystem) -> Self {
        let from = UnitSystem::Metric;
        Self {
            temperature: units::convert_temperature(self.temperature, from, system),
            wind_speed: units::convert_wind_speed(self.wind_speed, from, system),
            ..self.clone()
        }
    }
}

/// Label for the day at `index` in a forecast sequence starting today.
#[must_use]
pub fn day_label(index: usize, date: NaiveDate) -> String {
    match index {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a").to_string(),
    }
}

/// 12-hour clock label for an hour of day
#[must_use]
pub fn hour_label(hour: u32) -> String {
    match hour {
        0 => "12 AM".to_string(),
        12 => "12 PM".to_string(),
        h if h > 12 => format!("{} PM", h - 12),
        h => format!("{h} AM"),
    }
}
