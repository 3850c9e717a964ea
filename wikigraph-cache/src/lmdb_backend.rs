//! LMDB-backed external cache.
//!
//! Uses the heed crate (Rust bindings for LMDB) to provide a persistent,
//! memory-mapped key-value store that survives process restarts. It plugs
//! into [`ProxyCachePolicy`](crate::ProxyCachePolicy) like any other
//! [`ExternalCache`].
//!
//! # Value Format
//!
//! `[expires_at: i64 millis LE][payload]`, where `expires_at == 0` means the
//! entry never expires. Expired entries read as absent and are removed on the
//! read that discovers them.
//!
//! # Thread Safety
//!
//! LMDB provides ACID transactions. The backend uses:
//! - Read transactions for lookups
//! - Write transactions for `set`, `delete` and expiry removal
//! - Statistics are kept behind an `RwLock`

use std::path::Path;
use std::sync::RwLock;

use chrono::Utc;
use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use tracing::debug;
use wikigraph_core::CacheBackendError;

use crate::traits::{CacheStats, ExternalCache};

const HEADER_LEN: usize = 8;

fn txn_error(e: heed::Error) -> CacheBackendError {
    CacheBackendError::Backend {
        reason: format!("LMDB transaction error: {e}"),
    }
}

/// LMDB-backed [`ExternalCache`].
///
/// # Example
///
/// ```ignore
/// use wikigraph_cache::{LmdbExternalCache, ProxyCachePolicy};
///
/// let backend = LmdbExternalCache::new("/tmp/wikigraph-cache", 100)?;
/// let policy = ProxyCachePolicy::new(backend, 3600).with_property_timeout(86_400);
/// ```
pub struct LmdbExternalCache {
    /// The LMDB environment.
    env: Env,
    /// The main database (single unnamed database).
    db: Database<Bytes, Bytes>,
    stats: RwLock<CacheStats>,
}

impl LmdbExternalCache {
    /// Create a new LMDB cache backend.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory where LMDB files will be stored
    /// * `max_size_mb` - Maximum size of the database in megabytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be created
    /// - LMDB environment cannot be opened
    /// - Database cannot be created
    pub fn new<P: AsRef<Path>>(path: P, max_size_mb: usize) -> Result<Self, CacheBackendError> {
        std::fs::create_dir_all(&path).map_err(|e| CacheBackendError::Backend {
            reason: format!("Failed to create cache directory: {e}"),
        })?;

        // SAFETY: the environment is opened once per directory by this
        // process; callers must not open the same path twice concurrently.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(max_size_mb * 1024 * 1024)
                .max_dbs(1)
                .open(path.as_ref())
        }
        .map_err(|e| CacheBackendError::Backend {
            reason: format!("Failed to open LMDB environment: {e}"),
        })?;

        let mut wtxn = env.write_txn().map_err(txn_error)?;
        let db: Database<Bytes, Bytes> = env
            .create_database(&mut wtxn, None)
            .map_err(|e| CacheBackendError::Backend {
                reason: format!("Failed to open database: {e}"),
            })?;
        wtxn.commit().map_err(txn_error)?;

        let entry_count = {
            let rtxn = env.read_txn().map_err(txn_error)?;
            db.len(&rtxn).map_err(txn_error)?
        };

        Ok(Self {
            env,
            db,
            stats: RwLock::new(CacheStats {
                entry_count,
                ..CacheStats::default()
            }),
        })
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    fn update_stats(&self, f: impl FnOnce(&mut CacheStats)) {
        if let Ok(mut stats) = self.stats.write() {
            f(&mut stats);
        }
    }

    fn encode_entry(value: &[u8], ttl_secs: u64, now_millis: i64) -> Vec<u8> {
        let expires_at = match ttl_secs {
            0 => 0,
            secs => {
                let ttl_millis = i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX);
                now_millis.saturating_add(ttl_millis)
            }
        };
        let mut bytes = Vec::with_capacity(HEADER_LEN + value.len());
        bytes.extend_from_slice(&expires_at.to_le_bytes());
        bytes.extend_from_slice(value);
        bytes
    }

    /// Split a stored entry into its payload, or `None` when it has expired.
    fn decode_entry(bytes: &[u8], now_millis: i64) -> Result<Option<&[u8]>, CacheBackendError> {
        if bytes.len() < HEADER_LEN {
            return Err(CacheBackendError::Serialization {
                reason: "stored entry is shorter than its header".to_string(),
            });
        }
        let mut header = [0u8; HEADER_LEN];
        header.copy_from_slice(&bytes[..HEADER_LEN]);
        let expires_at = i64::from_le_bytes(header);
        if expires_at != 0 && expires_at <= now_millis {
            return Ok(None);
        }
        Ok(Some(&bytes[HEADER_LEN..]))
    }

    fn get_at(&self, key: &str, now_millis: i64) -> Result<Option<Vec<u8>>, CacheBackendError> {
        let lookup = {
            let rtxn = self.env.read_txn().map_err(txn_error)?;
            match self.db.get(&rtxn, key.as_bytes()).map_err(txn_error)? {
                Some(bytes) => Some(Self::decode_entry(bytes, now_millis)?.map(<[u8]>::to_vec)),
                None => None,
            }
        };

        match lookup {
            Some(Some(payload)) => {
                self.update_stats(|s| s.hits += 1);
                Ok(Some(payload))
            }
            Some(None) => {
                debug!(key, "expired LMDB cache entry");
                self.remove(key)?;
                self.update_stats(|s| {
                    s.misses += 1;
                    s.evictions += 1;
                });
                Ok(None)
            }
            None => {
                self.update_stats(|s| s.misses += 1);
                Ok(None)
            }
        }
    }

    fn set_at(
        &self,
        key: &str,
        value: &[u8],
        ttl_secs: u64,
        now_millis: i64,
    ) -> Result<(), CacheBackendError> {
        let entry = Self::encode_entry(value, ttl_secs, now_millis);

        let mut wtxn = self.env.write_txn().map_err(txn_error)?;
        let is_new = self
            .db
            .get(&wtxn, key.as_bytes())
            .map_err(txn_error)?
            .is_none();
        self.db
            .put(&mut wtxn, key.as_bytes(), &entry)
            .map_err(txn_error)?;
        wtxn.commit().map_err(txn_error)?;

        if is_new {
            self.update_stats(|s| s.entry_count += 1);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, CacheBackendError> {
        let mut wtxn = self.env.write_txn().map_err(txn_error)?;
        let deleted = self
            .db
            .delete(&mut wtxn, key.as_bytes())
            .map_err(txn_error)?;
        wtxn.commit().map_err(txn_error)?;

        if deleted {
            self.update_stats(|s| s.entry_count = s.entry_count.saturating_sub(1));
        }
        Ok(deleted)
    }
}

impl ExternalCache for LmdbExternalCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheBackendError> {
        self.get_at(key, Utc::now().timestamp_millis())
    }

    fn set(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<(), CacheBackendError> {
        self.set_at(key, value, ttl_secs, Utc::now().timestamp_millis())
    }

    fn delete(&self, key: &str) -> Result<(), CacheBackendError> {
        self.remove(key).map(|_| ())
    }
}
