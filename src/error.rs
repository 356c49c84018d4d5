//! Error types and handling for the `AeroForecast` application

use crate::cache::DataKind;
use crate::geolocate::GeolocationError;
use thiserror::Error;

/// Low-level failure of a single remote request.
///
/// A non-success HTTP status is treated exactly like a transport failure:
/// an offline cache worker in front of the gateway may answer with a
/// synthetic error response, and the gateway must not distinguish the two.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request never completed (DNS, connect, timeout, body read)
    #[error("request failed: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-success status
    #[error("unexpected status {status}")]
    Status { status: reqwest::StatusCode },

    /// The response body did not match the expected shape
    #[error("malformed response: {message}")]
    Malformed { message: String },
}

/// Main error type for the `AeroForecast` application
#[derive(Error, Debug)]
pub enum AeroForecastError {
    /// Location search (geocoding) did not complete
    #[error("location search failed")]
    SearchFailed {
        #[source]
        source: FetchError,
    },

    /// Current-conditions fetch did not complete
    #[error("current weather fetch failed")]
    CurrentWeatherFailed {
        #[source]
        source: FetchError,
    },

    /// Weekly forecast fetch did not complete
    #[error("weekly forecast fetch failed")]
    ForecastFailed {
        #[source]
        source: FetchError,
    },

    /// Hourly forecast fetch did not complete
    #[error("hourly forecast fetch failed")]
    HourlyFailed {
        #[source]
        source: FetchError,
    },

    /// Device geolocation denied, unavailable, or timed out
    #[error("device location unavailable: {source}")]
    LocationUnavailable {
        #[from]
        source: GeolocationError,
    },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Cache/persistence errors that must surface (favorites writes)
    #[error("Cache error: {message}")]
    Cache { message: String },
}

impl AeroForecastError {
    /// Wrap a failed geocoding request
    pub fn search(source: FetchError) -> Self {
        Self::SearchFailed { source }
    }

    /// Wrap a failed current-conditions request
    pub fn current_weather(source: FetchError) -> Self {
        Self::CurrentWeatherFailed { source }
    }

    /// Wrap a failed weekly-forecast request
    pub fn forecast(source: FetchError) -> Self {
        Self::ForecastFailed { source }
    }

    /// Wrap a failed hourly-forecast request
    pub fn hourly(source: FetchError) -> Self {
        Self::HourlyFailed { source }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// The kind of remote data a fetch failure refers to, if any.
    ///
    /// Callers use this to decide which cached view may still be shown.
    #[must_use]
    pub fn data_kind(&self) -> Option<DataKind> {
        match self {
            AeroForecastError::SearchFailed { .. } => Some(DataKind::LocationSearch),
            AeroForecastError::CurrentWeatherFailed { .. } => Some(DataKind::CurrentWeather),
            AeroForecastError::ForecastFailed { .. } => Some(DataKind::WeeklyForecast),
            AeroForecastError::HourlyFailed { .. } => Some(DataKind::HourlyForecast),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AeroForecastError::SearchFailed { .. } => {
                "Unable to search for locations. Please check your internet connection."
                    .to_string()
            }
            AeroForecastError::CurrentWeatherFailed { .. }
            | AeroForecastError::ForecastFailed { .. }
            | AeroForecastError::HourlyFailed { .. } => {
                "Weather data unavailable. Please retry.".to_string()
            }
            AeroForecastError::LocationUnavailable { source } => source.to_string(),
            AeroForecastError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            AeroForecastError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error() -> FetchError {
        FetchError::Status {
            status: reqwest::StatusCode::BAD_GATEWAY,
        }
    }

    #[test]
    fn test_error_creation() {
        let search_err = AeroForecastError::search(status_error());
        assert!(matches!(search_err, AeroForecastError::SearchFailed { .. }));

        let weather_err = AeroForecastError::current_weather(status_error());
        assert!(matches!(
            weather_err,
            AeroForecastError::CurrentWeatherFailed { .. }
        ));

        let config_err = AeroForecastError::config("missing cache directory");
        assert!(matches!(config_err, AeroForecastError::Config { .. }));
    }

    #[test]
    fn test_data_kind() {
        assert_eq!(
            AeroForecastError::forecast(status_error()).data_kind(),
            Some(DataKind::WeeklyForecast)
        );
        assert_eq!(
            AeroForecastError::hourly(status_error()).data_kind(),
            Some(DataKind::HourlyForecast)
        );
        assert_eq!(AeroForecastError::config("x").data_kind(), None);
    }

    #[test]
    fn test_user_messages() {
        let weather_err = AeroForecastError::current_weather(status_error());
        assert!(weather_err.user_message().contains("retry"));

        let location_err: AeroForecastError = GeolocationError::PermissionDenied.into();
        assert!(location_err.user_message().contains("denied"));
    }
}
