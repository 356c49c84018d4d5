//! Persisted set of starred locations

use crate::error::AeroForecastError;
use crate::models::Location;
use crate::store::KeyValueStore;
use crate::Result;
use tracing::warn;

const FAVORITES_KEY: &str = "favorites";

/// Ordered, identity-unique set of locations, written through to the
/// substrate on every mutation so a cold start recovers the same set.
pub struct FavoritesStore<S> {
    store: S,
    entries: Vec<Location>,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// Open the favorites set, recovering any persisted entries.
    ///
    /// An unreadable or undecodable persisted set degrades to empty
    /// rather than failing startup.
    pub fn open(store: S) -> Self {
        let entries = match store.get(FAVORITES_KEY) {
            Ok(Some(bytes)) => match postcard::from_bytes(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(error = %e, "discarding undecodable favorites");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "could not read favorites");
                Vec::new()
            }
        };
        Self { store, entries }
    }

    /// Add a location; a duplicate identity is a no-op.
    pub fn add(&mut self, location: Location) -> Result<()> {
        if self.is_favorite(&location.id) {
            return Ok(());
        }
        self.entries.push(location);
        self.persist()
    }

    /// Remove a location by identity; unknown identities are a no-op.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        let before = self.entries.len();
        self.entries.retain(|location| location.id != id);
        if self.entries.len() == before {
            return Ok(());
        }
        self.persist()
    }

    /// The favorites, in insertion order
    #[must_use]
    pub fn list(&self) -> &[Location] {
        &self.entries
    }

    /// Whether an identity is starred
    #[must_use]
    pub fn is_favorite(&self, id: &str) -> bool {
        self.entries.iter().any(|location| location.id == id)
    }

    fn persist(&self) -> Result<()> {
        let bytes = postcard::to_stdvec(&self.entries)
            .map_err(|e| AeroForecastError::cache(format!("favorites encoding failed: {e}")))?;
        self.store
            .set(FAVORITES_KEY, &bytes)
            .map_err(|e| AeroForecastError::cache(format!("favorites write failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn location(lat: f64, lon: f64, name: &str) -> Location {
        Location::new(lat, lon, name.to_string(), "CH".to_string())
    }

    #[test]
    fn test_add_and_list() {
        let mut favorites = FavoritesStore::open(MemoryStore::new());
        favorites.add(location(46.8, 8.2, "Interlaken")).unwrap();
        favorites.add(location(47.4, 8.5, "Zürich")).unwrap();

        let names: Vec<&str> = favorites.list().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Interlaken", "Zürich"]);
        assert!(favorites.is_favorite(&Location::identity(46.8, 8.2)));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut favorites = FavoritesStore::open(MemoryStore::new());
        favorites.add(location(46.8, 8.2, "Interlaken")).unwrap();
        favorites.add(location(46.8, 8.2, "Interlaken")).unwrap();
        assert_eq!(favorites.list().len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut favorites = FavoritesStore::open(MemoryStore::new());
        favorites.add(location(46.8, 8.2, "Interlaken")).unwrap();
        favorites.remove(&Location::identity(46.8, 8.2)).unwrap();
        assert!(favorites.list().is_empty());
        // Removing again is a no-op
        favorites.remove(&Location::identity(46.8, 8.2)).unwrap();
    }

    #[test]
    fn test_cold_start_recovers_persisted_set() {
        let store = Arc::new(MemoryStore::new());

        let mut favorites = FavoritesStore::open(Arc::clone(&store));
        favorites.add(location(46.8, 8.2, "Interlaken")).unwrap();
        drop(favorites);

        let recovered = FavoritesStore::open(Arc::clone(&store));
        assert_eq!(recovered.list().len(), 1);
        assert_eq!(recovered.list()[0].name, "Interlaken");
    }

    #[test]
    fn test_corrupt_persisted_set_degrades_to_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(FAVORITES_KEY, b"\xff\xff not postcard").unwrap();
        let favorites = FavoritesStore::open(Arc::clone(&store));
        assert!(favorites.list().is_empty());
    }
}
