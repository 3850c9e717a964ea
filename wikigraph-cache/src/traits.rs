//! External cache backend trait and cache statistics.
//!
//! This module defines the byte-level contract an external cache must satisfy
//! to sit behind a [`ProxyCachePolicy`](crate::ProxyCachePolicy).

use std::rc::Rc;
use std::sync::Arc;

use wikigraph_core::CacheBackendError;

/// Byte-oriented key/value cache with per-entry lifespans.
///
/// This is the conventional shape of general-purpose caching backends
/// (memcached clients, LMDB stores, ...). Implementations decide their own
/// thread-safety; the proxy policy inherits it.
///
/// # TTL
///
/// `ttl_secs` is the lifespan of the entry in seconds. `0` means the entry
/// never expires.
pub trait ExternalCache {
    /// Get the raw bytes stored under `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheBackendError>;

    /// Store `value` under `key`, replacing any previous entry.
    fn set(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<(), CacheBackendError>;

    /// Remove the entry for `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheBackendError>;
}

impl<T: ExternalCache + ?Sized> ExternalCache for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheBackendError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<(), CacheBackendError> {
        (**self).set(key, value, ttl_secs)
    }

    fn delete(&self, key: &str) -> Result<(), CacheBackendError> {
        (**self).delete(key)
    }
}

impl<T: ExternalCache + ?Sized> ExternalCache for Rc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheBackendError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<(), CacheBackendError> {
        (**self).set(key, value, ttl_secs)
    }

    fn delete(&self, key: &str) -> Result<(), CacheBackendError> {
        (**self).delete(key)
    }
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently in cache.
    pub entry_count: u64,
    /// Number of evictions due to capacity or expiry.
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }
}
