//! Persistent key-value substrate behind the cache and favorites.
//!
//! The substrate has finite capacity and may reject writes when full; that
//! condition is reported as [`StoreError::Full`] so callers can reclaim
//! space and retry.

use fjall::Keyspace;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Substrate-level failure
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store rejected a write because capacity is exhausted
    #[error("store is full")]
    Full,

    /// Any other backend failure
    #[error("store backend error: {message}")]
    Backend { message: String },
}

impl StoreError {
    fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend {
            message: err.to_string(),
        }
    }
}

/// Synchronous key-value store with enumerable keys.
///
/// Writes are single synchronous steps; under the cooperative async model
/// no two mutations interleave mid-write.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        (**self).keys()
    }
}

/// Disk-backed store on an fjall keyspace
pub struct FjallStore {
    store: Keyspace,
}

impl FjallStore {
    /// Open (or create) the store under the given directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = fjall::Database::builder(&path)
            .open()
            .map_err(StoreError::backend)?;
        let store = db
            .keyspace("store", fjall::KeyspaceCreateOptions::default)
            .map_err(StoreError::backend)?;
        Ok(Self { store })
    }
}

impl KeyValueStore for FjallStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let value = self
            .store
            .get(key.as_bytes())
            .map_err(StoreError::backend)?;
        Ok(value.map(|v| v.to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.store
            .insert(key.as_bytes(), value)
            .map_err(StoreError::backend)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.store
            .remove(key.as_bytes())
            .map_err(StoreError::backend)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut out = Vec::new();
        for guard in self.store.iter() {
            let key = guard.key().map_err(StoreError::backend)?;
            out.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(out)
    }
}

/// In-memory store with an optional entry-count capacity.
///
/// Used by tests and as a model of the bounded substrate: inserting a new
/// key past capacity fails with [`StoreError::Full`], while overwriting an
/// existing key always succeeds.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    capacity: Option<usize>,
}

impl MemoryStore {
    /// Unbounded store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects new keys once `capacity` entries exist
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: Some(capacity),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut entries = self.lock();
        if let Some(capacity) = self.capacity {
            if !entries.contains_key(key) && entries.len() >= capacity {
                return Err(StoreError::Full);
            }
        }
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock().keys().cloned().collect())
    }
}
