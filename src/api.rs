//! Open-Meteo API client
//!
//! Thin HTTP layer over the three upstream endpoints (geocoding, forecast,
//! air quality). No caching, no normalization, no retries; a non-success
//! status and a transport failure are the same [`FetchError`] to callers.

use crate::config::WeatherConfig;
use crate::error::FetchError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Field selections for the forecast endpoint
const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weather_code,surface_pressure,wind_speed_10m,uv_index";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max,relative_humidity_2m_mean";
const HOURLY_FIELDS: &str =
    "temperature_2m,precipitation_probability,weather_code,wind_speed_10m";

/// HTTP client for the Open-Meteo endpoints
pub struct OpenMeteoClient {
    client: Client,
    forecast_url: String,
    geocoding_url: String,
    air_quality_url: String,
}

impl OpenMeteoClient {
    /// Create a new client from endpoint configuration
    pub fn new(config: &WeatherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent("AeroForecast/0.1.0")
            .build()?;

        Ok(Self {
            client,
            forecast_url: config.forecast_url.clone(),
            geocoding_url: config.geocoding_url.clone(),
            air_quality_url: config.air_quality_url.clone(),
        })
    }

    /// Free-text place search
    pub async fn search(&self, query: &str) -> Result<response::GeocodingResponse, FetchError> {
        let url = format!(
            "{}/v1/search?name={}&count=10&language=en&format=json",
            self.geocoding_url,
            urlencoding::encode(query)
        );
        self.get_json(&url).await
    }

    /// Current conditions for a coordinate pair.
    ///
    /// Wind speed is requested in m/s so ingestion applies one fixed
    /// factor to reach the canonical km/h.
    pub async fn current(&self, lat: f64, lon: f64) -> Result<response::ForecastResponse, FetchError> {
        let url = format!(
            "{}/v1/forecast?latitude={lat}&longitude={lon}&current={CURRENT_FIELDS}&wind_speed_unit=ms&timezone=auto",
            self.forecast_url
        );
        self.get_json(&url).await
    }

    /// Seven-day daily forecast
    pub async fn daily(&self, lat: f64, lon: f64) -> Result<response::ForecastResponse, FetchError> {
        let url = format!(
            "{}/v1/forecast?latitude={lat}&longitude={lon}&daily={DAILY_FIELDS}&timezone=auto",
            self.forecast_url
        );
        self.get_json(&url).await
    }

    /// Seven-day hourly forecast
    pub async fn hourly(&self, lat: f64, lon: f64) -> Result<response::ForecastResponse, FetchError> {
        let url = format!(
            "{}/v1/forecast?latitude={lat}&longitude={lon}&hourly={HOURLY_FIELDS}&wind_speed_unit=ms&timezone=auto&forecast_days=7",
            self.forecast_url
        );
        self.get_json(&url).await
    }

    /// Current US AQI for a coordinate pair
    pub async fn air_quality(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<response::AirQualityResponse, FetchError> {
        let url = format!(
            "{}/v1/air-quality?latitude={lat}&longitude={lon}&current=us_aqi",
            self.air_quality_url
        );
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!(%url, "issuing request");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        Ok(response.json().await?)
    }
}

/// Raw Open-Meteo response shapes.
///
/// Forecast data arrives as parallel arrays, one per field, index-aligned
/// by time step.
pub mod response {
    use chrono::NaiveDate;
    use serde::Deserialize;

    /// Geocoding search response
    #[derive(Debug, Deserialize)]
    pub struct GeocodingResponse {
        pub results: Option<Vec<GeocodingResult>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct GeocodingResult {
        pub name: String,
        pub latitude: f64,
        pub longitude: f64,
        pub country: Option<String>,
        pub admin1: Option<String>,
    }

    /// Forecast endpoint response; only the requested section is present
    #[derive(Debug, Deserialize)]
    pub struct ForecastResponse {
        pub timezone: Option<String>,
        pub current: Option<CurrentData>,
        pub daily: Option<DailyData>,
        pub hourly: Option<HourlyData>,
    }

    /// Current conditions block
    #[derive(Debug, Deserialize)]
    pub struct CurrentData {
        pub temperature_2m: f64,
        pub relative_humidity_2m: f64,
        pub apparent_temperature: f64,
        pub precipitation: Option<f64>,
        pub weather_code: u16,
        pub surface_pressure: f64,
        pub wind_speed_10m: f64,
        pub uv_index: Option<f64>,
    }

    /// Daily block, parallel arrays indexed by day
    #[derive(Debug, Deserialize)]
    pub struct DailyData {
        pub time: Vec<NaiveDate>,
        pub weather_code: Vec<u16>,
        pub temperature_2m_max: Vec<f64>,
        pub temperature_2m_min: Vec<f64>,
        pub precipitation_probability_max: Vec<Option<f64>>,
        pub relative_humidity_2m_mean: Vec<Option<f64>>,
    }

    /// Hourly block, parallel arrays indexed by hour
    #[derive(Debug, Deserialize)]
    pub struct HourlyData {
        pub time: Vec<String>,
        pub temperature_2m: Vec<f64>,
        pub precipitation_probability: Vec<Option<f64>>,
        pub weather_code: Vec<u16>,
        pub wind_speed_10m: Vec<f64>,
    }

    /// Air-quality endpoint response
    #[derive(Debug, Deserialize)]
    pub struct AirQualityResponse {
        pub current: Option<AirQualityCurrent>,
    }

    #[derive(Debug, Deserialize)]
    pub struct AirQualityCurrent {
        pub us_aqi: Option<f64>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AeroForecastConfig;

    #[test]
    fn test_client_creation() {
        let config = AeroForecastConfig::default();
        let client = OpenMeteoClient::new(&config.weather).unwrap();
        assert_eq!(client.forecast_url, "https://api.open-meteo.com");
        assert_eq!(client.geocoding_url, "https://geocoding-api.open-meteo.com");
    }

    #[test]
    fn test_geocoding_response_parsing() {
        let body = r#"{"results":[{"name":"Berlin","latitude":52.52437,"longitude":13.41053,"country":"Germany","admin1":"Land Berlin"}]}"#;
        let parsed: response::GeocodingResponse = serde_json::from_str(body).unwrap();
        let results = parsed.results.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Berlin");
        assert_eq!(results[0].admin1.as_deref(), Some("Land Berlin"));
    }

    #[test]
    fn test_empty_geocoding_response_parsing() {
        let parsed: response::GeocodingResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.results.is_none());
    }

    #[test]
    fn test_air_quality_response_parsing() {
        let body = r#"{"current":{"us_aqi":57.0}}"#;
        let parsed: response::AirQualityResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.current.unwrap().us_aqi, Some(57.0));
    }
}
