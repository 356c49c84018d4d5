//! Time-bounded cache over the persistent key-value substrate.
//!
//! Every entry is stamped at capture time and considered absent once its
//! kind-specific TTL has elapsed. A write rejected for lack of space
//! triggers a last-resort sweep of entries older than a fixed ceiling,
//! then one retry; a still-failing write is dropped, which only costs a
//! refetch, never correctness.

use crate::config::CacheConfig;
use crate::store::{KeyValueStore, StoreError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// The kinds of remote data the cache distinguishes.
///
/// Each kind carries its own TTL, reflecting how often that data
/// realistically changes upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    CurrentWeather,
    WeeklyForecast,
    HourlyForecast,
    LocationSearch,
}

impl DataKind {
    pub(crate) fn namespace(self) -> &'static str {
        match self {
            DataKind::CurrentWeather => "current",
            DataKind::WeeklyForecast => "weekly",
            DataKind::HourlyForecast => "hourly",
            DataKind::LocationSearch => "search",
        }
    }

    fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            "current" => Some(DataKind::CurrentWeather),
            "weekly" => Some(DataKind::WeeklyForecast),
            "hourly" => Some(DataKind::HourlyForecast),
            "search" => Some(DataKind::LocationSearch),
            _ => None,
        }
    }
}

/// Structured cache key: a data kind plus normalized request parameters.
///
/// Coordinates are rounded to two decimal places (scaled integers, so two
/// nearby requests share an entry and float formatting can never produce
/// colliding keys for distinct queries); search text is trimmed and
/// lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: DataKind,
    params: KeyParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyParams {
    Point { lat_centi: i32, lon_centi: i32 },
    Text(String),
}

impl CacheKey {
    /// Key for coordinate-based data
    #[must_use]
    pub fn point(kind: DataKind, latitude: f64, longitude: f64) -> Self {
        Self {
            kind,
            params: KeyParams::Point {
                lat_centi: (latitude * 100.0).round() as i32,
                lon_centi: (longitude * 100.0).round() as i32,
            },
        }
    }

    /// Key for a location search query
    #[must_use]
    pub fn search(query: &str) -> Self {
        Self {
            kind: DataKind::LocationSearch,
            params: KeyParams::Text(query.trim().to_lowercase()),
        }
    }

    /// The data kind this key belongs to
    #[must_use]
    pub fn kind(&self) -> DataKind {
        self.kind
    }

    fn storage_key(&self) -> String {
        match &self.params {
            KeyParams::Point {
                lat_centi,
                lon_centi,
            } => format!(
                "{}:{:.2},{:.2}",
                self.kind.namespace(),
                f64::from(*lat_centi) / 100.0,
                f64::from(*lon_centi) / 100.0
            ),
            KeyParams::Text(text) => format!("{}:{}", self.kind.namespace(), text),
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}

/// Stored envelope: the capture stamp leads so a sweep can read it
/// without knowing the payload type.
#[derive(Serialize, Deserialize)]
struct StoredEntry<V> {
    stored_at: u64,
    value: V,
}

/// Per-kind time-to-live values
#[derive(Debug, Clone)]
struct CacheTtls {
    current: Duration,
    hourly: Duration,
    weekly: Duration,
    search: Duration,
}

impl CacheTtls {
    fn from_config(config: &CacheConfig) -> Self {
        Self {
            current: Duration::from_secs(u64::from(config.current_ttl_minutes) * 60),
            hourly: Duration::from_secs(u64::from(config.hourly_ttl_minutes) * 60),
            weekly: Duration::from_secs(u64::from(config.weekly_ttl_minutes) * 60),
            search: Duration::from_secs(u64::from(config.search_ttl_hours) * 3600),
        }
    }

    fn for_kind(&self, kind: DataKind) -> Duration {
        match kind {
            DataKind::CurrentWeather => self.current,
            DataKind::HourlyForecast => self.hourly,
            DataKind::WeeklyForecast => self.weekly,
            DataKind::LocationSearch => self.search,
        }
    }
}

/// TTL cache over a [`KeyValueStore`]
pub struct TtlCache<S> {
    store: S,
    ttls: CacheTtls,
    sweep_ceiling: Duration,
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl<S: KeyValueStore> TtlCache<S> {
    /// Create a cache over `store` with TTLs taken from `config`
    pub fn new(store: S, config: &CacheConfig) -> Self {
        Self {
            store,
            ttls: CacheTtls::from_config(config),
            sweep_ceiling: Duration::from_secs(u64::from(config.sweep_ceiling_hours) * 3600),
        }
    }

    /// Retrieve a value if present and not expired.
    ///
    /// A stale entry found here is deleted on the spot. Substrate or
    /// decode failures are logged and reported as a miss.
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        self.get_at(key, now_unix())
    }

    /// Store a value stamped with the current time, overwriting any prior
    /// entry for the key. Never fails: an unrecoverable write is dropped.
    pub fn set<T: Serialize>(&self, key: &CacheKey, value: &T) {
        self.set_at(key, value, now_unix());
    }

    /// Remove every entry whose kind-specific TTL has elapsed.
    pub fn evict_stale(&self) {
        let now = now_unix();
        self.sweep(now, |kind, age| age > self.ttls.for_kind(kind).as_secs());
    }

    fn get_at<T: DeserializeOwned>(&self, key: &CacheKey, now: u64) -> Option<T> {
        let storage_key = key.storage_key();
        let bytes = match self.store.get(&storage_key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key = %storage_key, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(key = %storage_key, error = %e, "cache read failed");
                return None;
            }
        };

        let entry: StoredEntry<T> = match postcard::from_bytes(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %storage_key, error = %e, "discarding undecodable cache entry");
                let _ = self.store.remove(&storage_key);
                return None;
            }
        };

        let ttl = self.ttls.for_kind(key.kind()).as_secs();
        if now.saturating_sub(entry.stored_at) <= ttl {
            debug!(key = %storage_key, "cache hit");
            Some(entry.value)
        } else {
            debug!(key = %storage_key, "cache entry expired");
            let _ = self.store.remove(&storage_key);
            None
        }
    }

    fn set_at<T: Serialize>(&self, key: &CacheKey, value: &T, now: u64) {
        let entry = StoredEntry {
            stored_at: now,
            value,
        };
        let bytes = match postcard::to_stdvec(&entry) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(key = %key, error = %e, "cache entry serialization failed");
                return;
            }
        };

        let storage_key = key.storage_key();
        match self.store.set(&storage_key, &bytes) {
            Ok(()) => {}
            Err(StoreError::Full) => {
                warn!(key = %storage_key, "store full, sweeping old cache entries");
                let ceiling = self.sweep_ceiling.as_secs();
                self.sweep(now, |_, age| age > ceiling);
                if let Err(e) = self.store.set(&storage_key, &bytes) {
                    warn!(key = %storage_key, error = %e, "cache write dropped after sweep");
                }
            }
            Err(e) => {
                warn!(key = %storage_key, error = %e, "cache write failed");
            }
        }
    }

    /// Remove cache entries selected by `expired(kind, age_seconds)`.
    ///
    /// Only keys in a recognized cache namespace are touched; other data
    /// sharing the substrate (favorites) is left alone. Undecodable
    /// entries are removed.
    fn sweep<F: Fn(DataKind, u64) -> bool>(&self, now: u64, expired: F) {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "cache sweep could not enumerate keys");
                return;
            }
        };

        let mut removed = 0usize;
        for storage_key in keys {
            let Some(kind) = storage_key
                .split_once(':')
                .and_then(|(namespace, _)| DataKind::from_namespace(namespace))
            else {
                continue;
            };

            let stale = match self.store.get(&storage_key) {
                Ok(Some(bytes)) => match postcard::take_from_bytes::<u64>(&bytes) {
                    Ok((stored_at, _)) => expired(kind, now.saturating_sub(stored_at)),
                    Err(_) => true,
                },
                Ok(None) => false,
                Err(_) => false,
            };

            if stale && self.store.remove(&storage_key).is_ok() {
                removed += 1;
            }
        }

        if removed > 0 {
            debug!(removed, "cache sweep finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn test_cache(store: MemoryStore) -> TtlCache<MemoryStore> {
        TtlCache::new(store, &CacheConfig::default())
    }

    fn current_key(lat: f64, lon: f64) -> CacheKey {
        CacheKey::point(DataKind::CurrentWeather, lat, lon)
    }

    #[test]
    fn test_storage_key_format() {
        let key = current_key(46.8182, 8.2275);
        assert_eq!(key.to_string(), "current:46.82,8.23");

        let key = CacheKey::point(DataKind::WeeklyForecast, -33.8688, 151.2093);
        assert_eq!(key.to_string(), "weekly:-33.87,151.21");

        let key = CacheKey::search("  Berlin ");
        assert_eq!(key.to_string(), "search:berlin");
    }

    #[test]
    fn test_nearby_coordinates_share_a_key() {
        assert_eq!(current_key(46.818_21, 8.227_46), current_key(46.82, 8.23));
        assert_ne!(current_key(46.82, 8.23), current_key(46.83, 8.23));
    }

    #[test]
    fn test_round_trip() {
        let cache = test_cache(MemoryStore::new());
        let key = current_key(10.0, 20.0);
        cache.set(&key, &"payload".to_string());
        assert_eq!(cache.get::<String>(&key), Some("payload".to_string()));
    }

    #[test]
    fn test_expiry_boundary() {
        let cache = test_cache(MemoryStore::new());
        let key = current_key(10.0, 20.0);
        let ttl = CacheConfig::default().current_ttl_minutes as u64 * 60;

        let t0 = 1_700_000_000;
        cache.set_at(&key, &42u32, t0);
        assert_eq!(cache.get_at::<u32>(&key, t0 + ttl - 1), Some(42));
        assert_eq!(cache.get_at::<u32>(&key, t0 + ttl + 1), None);
        // The stale entry was deleted during the miss
        assert!(cache.store.get("current:10.00,20.00").unwrap().is_none());
    }

    #[test]
    fn test_key_isolation() {
        let cache = test_cache(MemoryStore::new());
        cache.set(&current_key(10.0, 20.0), &"a".to_string());
        cache.set(&current_key(30.0, 40.0), &"b".to_string());
        assert_eq!(
            cache.get::<String>(&current_key(10.0, 20.0)),
            Some("a".to_string())
        );
    }

    #[test]
    fn test_kind_isolation() {
        let cache = test_cache(MemoryStore::new());
        cache.set(&current_key(10.0, 20.0), &"now".to_string());
        assert_eq!(
            cache.get::<String>(&CacheKey::point(DataKind::HourlyForecast, 10.0, 20.0)),
            None
        );
    }

    #[test]
    fn test_overwrite() {
        let cache = test_cache(MemoryStore::new());
        let key = current_key(10.0, 20.0);
        cache.set(&key, &1u32);
        cache.set(&key, &2u32);
        assert_eq!(cache.get::<u32>(&key), Some(2));
    }

    #[test]
    fn test_full_store_sweeps_and_retries() {
        let cache = test_cache(MemoryStore::with_capacity(2));
        let ceiling = CacheConfig::default().sweep_ceiling_hours as u64 * 3600;
        let t0 = 1_700_000_000;

        cache.set_at(&current_key(1.0, 1.0), &"old".to_string(), t0);
        cache.set_at(&current_key(2.0, 2.0), &"old".to_string(), t0);

        // Store is full; the entries above are beyond the sweep ceiling,
        // so the write reclaims space and succeeds on retry.
        let now = t0 + ceiling + 1;
        cache.set_at(&current_key(3.0, 3.0), &"new".to_string(), now);
        assert_eq!(
            cache.get_at::<String>(&current_key(3.0, 3.0), now),
            Some("new".to_string())
        );
        assert!(cache.store.get("current:1.00,1.00").unwrap().is_none());
    }

    #[test]
    fn test_full_store_with_fresh_entries_drops_write() {
        let cache = test_cache(MemoryStore::with_capacity(1));
        let t0 = 1_700_000_000;

        cache.set_at(&current_key(1.0, 1.0), &"fresh".to_string(), t0);
        // Nothing is older than the ceiling, so the write is silently dropped
        cache.set_at(&current_key(2.0, 2.0), &"extra".to_string(), t0 + 5);
        assert_eq!(cache.get_at::<String>(&current_key(2.0, 2.0), t0 + 5), None);
        assert_eq!(
            cache.get_at::<String>(&current_key(1.0, 1.0), t0 + 5),
            Some("fresh".to_string())
        );
    }

    #[test]
    fn test_sweep_leaves_foreign_keys_alone() {
        let store = MemoryStore::new();
        store.set("favorites", b"untouchable").unwrap();
        let cache = test_cache(store);
        let t0 = 1_700_000_000;
        cache.set_at(&current_key(1.0, 1.0), &"x".to_string(), t0);

        cache.sweep(t0 + 10 * 365 * 24 * 3600, |_, _| true);
        assert_eq!(
            cache.store.get("favorites").unwrap(),
            Some(b"untouchable".to_vec())
        );
        assert!(cache.store.get("current:1.00,1.00").unwrap().is_none());
    }

    #[test]
    fn test_evict_stale_respects_per_kind_ttl() {
        let cache = test_cache(MemoryStore::new());
        let config = CacheConfig::default();
        let t0 = now_unix();

        // Old enough to expire the current-conditions entry but not the
        // geocoding entry, whose TTL is measured in hours.
        let age = config.current_ttl_minutes as u64 * 60 + 60;
        cache.set_at(&current_key(1.0, 1.0), &"x".to_string(), t0 - age);
        cache.set_at(&CacheKey::search("berlin"), &"y".to_string(), t0 - age);

        cache.evict_stale();
        assert!(cache.store.get("current:1.00,1.00").unwrap().is_none());
        assert!(cache.store.get("search:berlin").unwrap().is_some());
    }
}
