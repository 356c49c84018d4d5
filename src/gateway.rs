//! Cache-aware weather gateway
//!
//! The gateway is the single entry point for remote weather data: each
//! operation builds a structured cache key, serves a fresh cached value
//! when one exists, and otherwise fetches, normalizes into canonical
//! records, and populates the cache on the way out.

use crate::api::{OpenMeteoClient, response};
use crate::cache::{CacheKey, DataKind, TtlCache};
use crate::error::{AeroForecastError, FetchError};
use crate::models::location::disambiguate_identities;
use crate::models::weather::weather_code_description;
use crate::models::{
    Condition, CurrentWeather, DayForecast, HourlyRecord, Location, day_label, hour_label,
};
use crate::store::KeyValueStore;
use crate::Result;
use chrono::{NaiveDateTime, Timelike};
use tracing::{debug, warn};

/// Queries shorter than this return an empty result without any network
/// traffic; single-character lookups are noise.
const MIN_SEARCH_CHARS: usize = 2;

/// Factor from the requested upstream wind unit (m/s) to canonical km/h
const MS_TO_KMH: f64 = 3.6;

/// Open-Meteo omits visibility; the canonical record carries this default.
const DEFAULT_VISIBILITY_KM: f64 = 10.0;

/// Placeholder label until a caller attaches a real location name
const UNNAMED_LOCATION: &str = "Current Location";

/// Cache-aware gateway over the Open-Meteo endpoints
pub struct WeatherGateway<S> {
    api: OpenMeteoClient,
    cache: TtlCache<S>,
}

impl<S: KeyValueStore> WeatherGateway<S> {
    /// Create a gateway from an API client and a cache
    pub fn new(api: OpenMeteoClient, cache: TtlCache<S>) -> Self {
        Self { api, cache }
    }

    /// Search for locations matching a free-text query.
    ///
    /// Queries below the minimum length return an empty list immediately.
    pub async fn search_locations(&self, query: &str) -> Result<Vec<Location>> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_CHARS {
            return Ok(Vec::new());
        }

        let key = CacheKey::search(query);
        if let Some(cached) = self.cache.get::<Vec<Location>>(&key) {
            return Ok(cached);
        }

        let response = self
            .api
            .search(query)
            .await
            .map_err(AeroForecastError::search)?;

        let mut locations: Vec<Location> = response
            .results
            .unwrap_or_default()
            .into_iter()
            .map(map_location)
            .collect();
        disambiguate_identities(&mut locations);

        debug!(query, count = locations.len(), "location search completed");
        self.cache.set(&key, &locations);
        Ok(locations)
    }

    /// Current conditions for a coordinate pair.
    ///
    /// The meteorological query and the air-quality query are issued
    /// concurrently; both are resolved before the merge. Air quality is
    /// best-effort: any failure there degrades the field to `None` and
    /// never fails the call.
    pub async fn current_weather(&self, lat: f64, lon: f64) -> Result<CurrentWeather> {
        let key = CacheKey::point(DataKind::CurrentWeather, lat, lon);
        if let Some(cached) = self.cache.get::<CurrentWeather>(&key) {
            return Ok(cached);
        }

        let (weather, air) = tokio::join!(self.api.current(lat, lon), self.api.air_quality(lat, lon));

        let response = weather.map_err(AeroForecastError::current_weather)?;
        let current = response.current.ok_or_else(|| {
            AeroForecastError::current_weather(FetchError::Malformed {
                message: "response has no current block".to_string(),
            })
        })?;

        let air_quality_index = match air {
            Ok(air) => air.current.and_then(|c| c.us_aqi),
            Err(e) => {
                warn!(error = %e, "air quality fetch failed, continuing without it");
                None
            }
        };

        let weather = build_current(&current, air_quality_index);
        self.cache.set(&key, &weather);
        Ok(weather)
    }

    /// Seven-day forecast, one summary per calendar day, dates ascending.
    pub async fn weekly_forecast(&self, lat: f64, lon: f64) -> Result<Vec<DayForecast>> {
        let key = CacheKey::point(DataKind::WeeklyForecast, lat, lon);
        if let Some(cached) = self.cache.get::<Vec<DayForecast>>(&key) {
            return Ok(cached);
        }

        let response = self
            .api
            .daily(lat, lon)
            .await
            .map_err(AeroForecastError::forecast)?;
        let daily = response.daily.ok_or_else(|| {
            AeroForecastError::forecast(FetchError::Malformed {
                message: "response has no daily block".to_string(),
            })
        })?;

        let forecast = map_daily(&daily);
        self.cache.set(&key, &forecast);
        Ok(forecast)
    }

    /// Seven-day hourly series, one record per upstream hour, starting at
    /// hour 0 of "today" in the location's local time.
    pub async fn hourly_forecast(&self, lat: f64, lon: f64) -> Result<Vec<HourlyRecord>> {
        let key = CacheKey::point(DataKind::HourlyForecast, lat, lon);
        if let Some(cached) = self.cache.get::<Vec<HourlyRecord>>(&key) {
            return Ok(cached);
        }

        let response = self
            .api
            .hourly(lat, lon)
            .await
            .map_err(AeroForecastError::hourly)?;
        let hourly = response.hourly.ok_or_else(|| {
            AeroForecastError::hourly(FetchError::Malformed {
                message: "response has no hourly block".to_string(),
            })
        })?;

        let series = map_hourly(&hourly);
        self.cache.set(&key, &series);
        Ok(series)
    }
}

fn map_location(result: response::GeocodingResult) -> Location {
    let mut location = Location::new(
        result.latitude,
        result.longitude,
        result.name,
        result.country.unwrap_or_else(|| "Unknown".to_string()),
    );
    location.admin1 = result.admin1;
    location
}

fn build_current(current: &response::CurrentData, air_quality_index: Option<f64>) -> CurrentWeather {
    let condition = Condition::from_weather_code(current.weather_code);
    CurrentWeather {
        location: UNNAMED_LOCATION.to_string(),
        temperature: current.temperature_2m.round(),
        condition,
        description: weather_code_description(current.weather_code).to_string(),
        feels_like: current.apparent_temperature.round(),
        humidity: current.relative_humidity_2m,
        wind_speed: (current.wind_speed_10m * MS_TO_KMH).round(),
        precipitation: current.precipitation.unwrap_or(0.0),
        uv_index: current.uv_index.unwrap_or(0.0),
        visibility: DEFAULT_VISIBILITY_KM,
        pressure: current.surface_pressure.round(),
        weather_code: current.weather_code,
        air_quality_index,
    }
}

fn map_daily(daily: &response::DailyData) -> Vec<DayForecast> {
    daily
        .time
        .iter()
        .enumerate()
        .map(|(index, &date)| {
            let weather_code = daily.weather_code.get(index).copied().unwrap_or_default();
            DayForecast {
                date,
                day: day_label(index, date),
                high: daily
                    .temperature_2m_max
                    .get(index)
                    .copied()
                    .unwrap_or_default()
                    .round(),
                low: daily
                    .temperature_2m_min
                    .get(index)
                    .copied()
                    .unwrap_or_default()
                    .round(),
                condition: Condition::from_weather_code(weather_code),
                precipitation: daily
                    .precipitation_probability_max
                    .get(index)
                    .copied()
                    .flatten()
                    .unwrap_or(0.0),
                humidity: daily
                    .relative_humidity_2m_mean
                    .get(index)
                    .copied()
                    .flatten()
                    .unwrap_or(0.0),
                weather_code,
            }
        })
        .collect()
}

fn map_hourly(hourly: &response::HourlyData) -> Vec<HourlyRecord> {
    hourly
        .time
        .iter()
        .enumerate()
        .filter_map(|(index, time)| {
            let timestamp = match NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M") {
                Ok(timestamp) => timestamp,
                Err(e) => {
                    warn!(time, error = %e, "skipping hour with unparseable timestamp");
                    return None;
                }
            };
            let weather_code = hourly.weather_code.get(index).copied().unwrap_or_default();
            Some(HourlyRecord {
                timestamp,
                time: hour_label(timestamp.hour()),
                temperature: hourly
                    .temperature_2m
                    .get(index)
                    .copied()
                    .unwrap_or_default()
                    .round(),
                condition: Condition::from_weather_code(weather_code),
                precipitation: hourly
                    .precipitation_probability
                    .get(index)
                    .copied()
                    .flatten()
                    .unwrap_or(0.0),
                wind_speed: (hourly.wind_speed_10m.get(index).copied().unwrap_or_default()
                    * MS_TO_KMH)
                    .round(),
                weather_code,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_current() -> response::CurrentData {
        response::CurrentData {
            temperature_2m: 21.6,
            relative_humidity_2m: 54.0,
            apparent_temperature: 20.2,
            precipitation: Some(0.3),
            weather_code: 61,
            surface_pressure: 1013.4,
            wind_speed_10m: 5.0,
            uv_index: Some(3.0),
        }
    }

    #[test]
    fn test_build_current_rounds_and_converts() {
        let weather = build_current(&sample_current(), Some(42.0));
        assert_eq!(weather.temperature, 22.0);
        assert_eq!(weather.feels_like, 20.0);
        // 5 m/s → 18 km/h
        assert_eq!(weather.wind_speed, 18.0);
        assert_eq!(weather.pressure, 1013.0);
        // Humidity and precipitation keep their fractional values
        assert_eq!(weather.humidity, 54.0);
        assert_eq!(weather.precipitation, 0.3);
        assert_eq!(weather.condition, Condition::LightRain);
        assert_eq!(weather.description, "Slight rain");
        assert_eq!(weather.visibility, DEFAULT_VISIBILITY_KM);
        assert_eq!(weather.air_quality_index, Some(42.0));
    }

    #[test]
    fn test_build_current_without_air_quality() {
        let weather = build_current(&sample_current(), None);
        assert_eq!(weather.air_quality_index, None);
        // Mandatory fields are untouched by the missing AQI
        assert_eq!(weather.temperature, 22.0);
    }

    #[test]
    fn test_build_current_defaults_optional_fields() {
        let mut current = sample_current();
        current.precipitation = None;
        current.uv_index = None;
        let weather = build_current(&current, None);
        assert_eq!(weather.precipitation, 0.0);
        assert_eq!(weather.uv_index, 0.0);
    }

    #[test]
    fn test_map_daily() {
        let daily = response::DailyData {
            time: vec![
                NaiveDate::from_ymd_opt(2024, 3, 6).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            ],
            weather_code: vec![0, 61, 95],
            temperature_2m_max: vec![10.4, 12.6, 8.0],
            temperature_2m_min: vec![2.4, 3.5, -1.2],
            precipitation_probability_max: vec![Some(5.0), None, Some(90.0)],
            relative_humidity_2m_mean: vec![Some(60.0), Some(70.0), None],
        };

        let forecast = map_daily(&daily);
        assert_eq!(forecast.len(), 3);
        assert_eq!(forecast[0].day, "Today");
        assert_eq!(forecast[1].day, "Tomorrow");
        assert_eq!(forecast[2].day, "Fri");
        assert_eq!(forecast[0].high, 10.0);
        assert_eq!(forecast[1].low, 4.0);
        // Missing probabilities and humidity default to zero
        assert_eq!(forecast[1].precipitation, 0.0);
        assert_eq!(forecast[2].humidity, 0.0);
        assert_eq!(forecast[2].condition, Condition::Thunderstorm);
    }

    #[test]
    fn test_map_hourly() {
        let hourly = response::HourlyData {
            time: vec![
                "2024-03-06T00:00".to_string(),
                "2024-03-06T01:00".to_string(),
                "not-a-time".to_string(),
                "2024-03-06T14:00".to_string(),
            ],
            temperature_2m: vec![3.4, 2.8, 2.0, 9.6],
            precipitation_probability: vec![Some(10.0), None, Some(0.0), Some(35.0)],
            weather_code: vec![0, 2, 3, 61],
            wind_speed_10m: vec![2.0, 2.5, 3.0, 10.0],
        };

        let series = map_hourly(&hourly);
        // The unparseable entry is skipped
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].time, "12 AM");
        assert_eq!(series[2].time, "2 PM");
        assert_eq!(series[0].temperature, 3.0);
        // 2 m/s → 7 km/h after rounding
        assert_eq!(series[0].wind_speed, 7.0);
        assert_eq!(series[1].precipitation, 0.0);
        assert_eq!(series[2].condition, Condition::LightRain);
    }

    #[test]
    fn test_map_location() {
        let result = response::GeocodingResult {
            name: "Berlin".to_string(),
            latitude: 52.52437,
            longitude: 13.41053,
            country: Some("Germany".to_string()),
            admin1: Some("Land Berlin".to_string()),
        };
        let location = map_location(result);
        assert_eq!(location.id, "52.52437_13.41053");
        assert_eq!(location.display_name(), "Berlin, Land Berlin");
    }
}
