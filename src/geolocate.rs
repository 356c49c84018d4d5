//! Geolocation provider boundary.
//!
//! The device position source is an external collaborator; only its
//! contract and error taxonomy live here so callers can compose its
//! failures into the application error surface.

use async_trait::async_trait;
use thiserror::Error;

/// A raw coordinate pair from the position provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// The closed set of reasons a position request can fail
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("Location access denied by user")]
    PermissionDenied,

    #[error("Location information is unavailable")]
    PositionUnavailable,

    #[error("Location request timed out")]
    TimedOut,
}

/// Single-shot "where am I" provider
#[async_trait]
pub trait Geolocator: Send + Sync {
    /// Resolve the device's current coordinates
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Provider pinned to fixed coordinates, for the CLI and tests
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    coordinates: Coordinates,
}

impl FixedGeolocator {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            coordinates: Coordinates {
                latitude,
                longitude,
            },
        }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(self.coordinates)
    }
}
