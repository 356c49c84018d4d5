//! `AeroForecast` - weather data acquisition and caching core
//!
//! This library provides the data layer of a weather client: fetching and
//! normalizing geocoding, current-conditions, forecast, and air-quality
//! data, TTL caching over a persistent store, concurrent multi-location
//! aggregation, and unit conversion at the display boundary.

pub mod aggregator;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod favorites;
pub mod gateway;
pub mod geolocate;
pub mod hourly;
pub mod models;
pub mod store;
pub mod units;

// Re-export core types for public API
pub use aggregator::{LocationConditions, MultiLocationAggregator};
pub use api::OpenMeteoClient;
pub use cache::{CacheKey, DataKind, TtlCache};
pub use config::AeroForecastConfig;
pub use error::{AeroForecastError, FetchError};
pub use favorites::FavoritesStore;
pub use gateway::WeatherGateway;
pub use geolocate::{Coordinates, FixedGeolocator, GeolocationError, Geolocator};
pub use models::{
    AirQualityCategory, Condition, CurrentWeather, DayForecast, HourlyRecord, Location,
};
pub use store::{FjallStore, KeyValueStore, MemoryStore};
pub use units::UnitSystem;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AeroForecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
