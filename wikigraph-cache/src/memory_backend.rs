//! In-process external cache with per-entry expiry.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use wikigraph_core::CacheBackendError;

use crate::traits::ExternalCache;

struct StoredEntry {
    bytes: Vec<u8>,
    expires_at: Option<DateTime<Utc>>,
}

impl StoredEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// `HashMap`-backed [`ExternalCache`]. Thread-safe; expired entries read as
/// absent and are dropped on access.
#[derive(Default)]
pub struct MemoryExternalCache {
    entries: RwLock<HashMap<String, StoredEntry>>,
}

impl MemoryExternalCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_at(&self, key: &str, now: DateTime<Utc>) -> Result<Option<Vec<u8>>, CacheBackendError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CacheBackendError::LockPoisoned)?;
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.bytes.clone())),
            None => Ok(None),
        }
    }

    fn set_at(
        &self,
        key: &str,
        value: &[u8],
        ttl_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<(), CacheBackendError> {
        let expires_at = match ttl_secs {
            0 => None,
            secs => {
                let secs = i64::try_from(secs).unwrap_or(i64::MAX);
                Duration::try_seconds(secs).and_then(|d| now.checked_add_signed(d))
            }
        };
        self.entries
            .write()
            .map_err(|_| CacheBackendError::LockPoisoned)?
            .insert(
                key.to_string(),
                StoredEntry {
                    bytes: value.to_vec(),
                    expires_at,
                },
            );
        Ok(())
    }
}

impl ExternalCache for MemoryExternalCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheBackendError> {
        self.get_at(key, Utc::now())
    }

    fn set(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<(), CacheBackendError> {
        self.set_at(key, value, ttl_secs, Utc::now())
    }

    fn delete(&self, key: &str) -> Result<(), CacheBackendError> {
        self.entries
            .write()
            .map_err(|_| CacheBackendError::LockPoisoned)?
            .remove(key);
        Ok(())
    }
}
