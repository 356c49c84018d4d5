//! Location model for geographic coordinates and metadata

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named point on Earth
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Stable identity derived from the coordinates
    pub id: String,
    /// Display name (city, region, etc.)
    pub name: String,
    /// Country name or code
    pub country: String,
    /// Admin region (state, canton), when the geocoder provides one
    pub admin1: Option<String>,
    /// Latitude in decimal degrees (WGS84)
    pub latitude: f64,
    /// Longitude in decimal degrees (WGS84)
    pub longitude: f64,
}

impl Location {
    /// Create a new location; identity is synthesized from the coordinates
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, name: String, country: String) -> Self {
        Self {
            id: Self::identity(latitude, longitude),
            name,
            country,
            admin1: None,
            latitude,
            longitude,
        }
    }

    /// Location for a raw coordinate pair, named by its coordinates.
    ///
    /// Used for geolocated points until a proper name is known.
    #[must_use]
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self::new(
            latitude,
            longitude,
            format!("{latitude:.4}, {longitude:.4}"),
            "Unknown".to_string(),
        )
    }

    /// Deterministic identity for a coordinate pair
    #[must_use]
    pub fn identity(latitude: f64, longitude: f64) -> String {
        format!("{latitude}_{longitude}")
    }

    /// Full display label (`name, admin1` when the region is known)
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.admin1 {
            Some(admin1) => format!("{}, {}", self.name, admin1),
            None => self.name.clone(),
        }
    }
}

/// Make identities unique within one result list.
///
/// Two search results can share rounded coordinates (a town and its
/// district, say); later duplicates get a positional suffix so list
/// consumers can key on `id` safely.
pub(crate) fn disambiguate_identities(locations: &mut [Location]) {
    let mut seen = HashSet::new();
    for (index, location) in locations.iter_mut().enumerate() {
        if !seen.insert(location.id.clone()) {
            location.id = format!("{}_{}", location.id, index);
            seen.insert(location.id.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_deterministic() {
        let a = Location::new(46.8182, 8.2275, "Interlaken".into(), "CH".into());
        let b = Location::new(46.8182, 8.2275, "Other".into(), "CH".into());
        assert_eq!(a.id, b.id);
        assert_eq!(a.id, "46.8182_8.2275");
    }

    #[test]
    fn test_coordinate_fallback_name() {
        let location = Location::from_coordinates(46.8182, 8.2275);
        assert_eq!(location.name, "46.8182, 8.2275");
        assert_eq!(location.country, "Unknown");
    }

    #[test]
    fn test_display_name_with_region() {
        let mut location = Location::new(47.37, 8.54, "Zürich".into(), "CH".into());
        assert_eq!(location.display_name(), "Zürich");
        location.admin1 = Some("ZH".into());
        assert_eq!(location.display_name(), "Zürich, ZH");
    }

    #[test]
    fn test_disambiguate_identities() {
        let mut locations = vec![
            Location::new(1.0, 2.0, "A".into(), "X".into()),
            Location::new(1.0, 2.0, "B".into(), "X".into()),
            Location::new(3.0, 4.0, "C".into(), "X".into()),
        ];
        disambiguate_identities(&mut locations);
        assert_eq!(locations[0].id, "1_2");
        assert_eq!(locations[1].id, "1_2_1");
        assert_eq!(locations[2].id, "3_4");

        let unique: std::collections::HashSet<_> =
            locations.iter().map(|l| l.id.clone()).collect();
        assert_eq!(unique.len(), 3);
    }
}
