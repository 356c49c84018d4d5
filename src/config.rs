//! Configuration management for the `AeroForecast` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AeroForecastError;
use crate::units::UnitSystem;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `AeroForecast` application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AeroForecastConfig {
    /// Weather endpoint configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Display unit settings
    #[serde(default)]
    pub units: UnitsConfig,
}

/// Weather endpoint configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL for the forecast API
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    /// Base URL for the geocoding API
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// Base URL for the air-quality API
    #[serde(default = "default_air_quality_url")]
    pub air_quality_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
    /// TTL for current-conditions entries, in minutes
    #[serde(default = "default_current_ttl")]
    pub current_ttl_minutes: u32,
    /// TTL for hourly-forecast entries, in minutes
    #[serde(default = "default_hourly_ttl")]
    pub hourly_ttl_minutes: u32,
    /// TTL for weekly-forecast entries, in minutes
    #[serde(default = "default_weekly_ttl")]
    pub weekly_ttl_minutes: u32,
    /// TTL for geocoding entries, in hours
    #[serde(default = "default_search_ttl")]
    pub search_ttl_hours: u32,
    /// Age ceiling for the last-resort eviction sweep, in hours
    #[serde(default = "default_sweep_ceiling")]
    pub sweep_ceiling_hours: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Display unit settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UnitsConfig {
    /// Unit system applied at the display boundary
    #[serde(default)]
    pub system: UnitSystem,
}

// Default value functions
fn default_forecast_url() -> String {
    "https://api.open-meteo.com".to_string()
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com".to_string()
}

fn default_air_quality_url() -> String {
    "https://air-quality-api.open-meteo.com".to_string()
}

fn default_weather_timeout() -> u32 {
    10
}

fn default_cache_location() -> String {
    "~/.cache/aeroforecast".to_string()
}

fn default_current_ttl() -> u32 {
    10
}

fn default_hourly_ttl() -> u32 {
    15
}

fn default_weekly_ttl() -> u32 {
    30
}

fn default_search_ttl() -> u32 {
    24
}

fn default_sweep_ceiling() -> u32 {
    24
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for AeroForecastConfig {
    fn default() -> Self {
        Self {
            weather: WeatherConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
            units: UnitsConfig::default(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_url: default_forecast_url(),
            geocoding_url: default_geocoding_url(),
            air_quality_url: default_air_quality_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            location: default_cache_location(),
            current_ttl_minutes: default_current_ttl(),
            hourly_ttl_minutes: default_hourly_ttl(),
            weekly_ttl_minutes: default_weekly_ttl(),
            search_ttl_hours: default_search_ttl(),
            sweep_ceiling_hours: default_sweep_ceiling(),
        }
    }
}

impl AeroForecastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment variable overrides with AEROFORECAST_ prefix
        builder = builder.add_source(
            Environment::with_prefix("AEROFORECAST")
                .separator("_")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: AeroForecastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("aeroforecast").join("config.toml"))
    }

    /// Resolve the cache directory, expanding a leading `~`
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        if let Some(rest) = self.cache.location.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(&self.cache.location)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds == 0 || self.weather.timeout_seconds > 300 {
            return Err(AeroForecastError::config(
                "Weather API timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if self.cache.sweep_ceiling_hours == 0 || self.cache.sweep_ceiling_hours > 168 {
            return Err(AeroForecastError::config(
                "Cache sweep ceiling must be between 1 and 168 hours (1 week)",
            )
            .into());
        }

        if self.cache.search_ttl_hours > 168 {
            return Err(
                AeroForecastError::config("Geocoding cache TTL cannot exceed 168 hours").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AeroForecastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AeroForecastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for url in [
            &self.weather.forecast_url,
            &self.weather.geocoding_url,
            &self.weather.air_quality_url,
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AeroForecastError::config(
                    "Weather endpoint URLs must be valid HTTP or HTTPS URLs",
                )
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AeroForecastConfig::default();
        assert_eq!(config.weather.forecast_url, "https://api.open-meteo.com");
        assert_eq!(config.weather.timeout_seconds, 10);
        assert_eq!(config.cache.current_ttl_minutes, 10);
        assert_eq!(config.cache.search_ttl_hours, 24);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.units.system, UnitSystem::Metric);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = AeroForecastConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = AeroForecastConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = AeroForecastConfig::default();
        config.weather.geocoding_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_path_generation() {
        let path = AeroForecastConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("aeroforecast"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_cache_dir_expands_home() {
        let config = AeroForecastConfig::default();
        let dir = config.cache_dir();
        assert!(!dir.to_string_lossy().starts_with('~'));
        assert!(dir.to_string_lossy().contains("aeroforecast"));
    }
}
