//! Canonical data models for weather information
//!
//! All numeric weather fields are stored in metric units; conversion to the
//! display system happens at the read boundary only.

pub mod forecast;
pub mod location;
pub mod weather;

pub use forecast::{DayForecast, HourlyRecord, day_label, hour_label};
pub use location::Location;
pub use weather::{AirQualityCategory, Condition, CurrentWeather};
