//! Bounded in-memory LRU cache policy.

use lru::LruCache;
use tracing::trace;
use wikigraph_core::CacheBackendError;

use crate::policy::{CacheKey, CachePolicy, CacheValue};
use crate::traits::CacheStats;

/// Default number of documents kept by [`MemoryCachePolicy::default`].
pub const DEFAULT_MAX_SIZE: usize = 128;

/// LRU (least recently used) cache in memory.
///
/// Hits move the entry to the most-recently-used end; inserts evict from the
/// least-recently-used end while more than `max_size` entries are held. Every
/// operation is O(1).
pub struct MemoryCachePolicy {
    max_size: usize,
    values: LruCache<CacheKey, CacheValue>,
    stats: CacheStats,
}

impl MemoryCachePolicy {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            values: LruCache::unbounded(),
            stats: CacheStats::default(),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `key` is cached, without touching its recency.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.values.contains(key)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.values.len() as u64,
            ..self.stats.clone()
        }
    }
}

impl Default for MemoryCachePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

impl CachePolicy for MemoryCachePolicy {
    fn get(&mut self, key: &CacheKey) -> Result<Option<CacheValue>, CacheBackendError> {
        match self.values.get(key) {
            Some(value) => {
                self.stats.hits += 1;
                Ok(Some(value.clone()))
            }
            None => {
                self.stats.misses += 1;
                Ok(None)
            }
        }
    }

    fn set(
        &mut self,
        key: &CacheKey,
        value: Option<CacheValue>,
    ) -> Result<(), CacheBackendError> {
        self.values.pop(key);
        let Some(value) = value else {
            return Ok(());
        };
        self.values.push(key.clone(), value);
        while self.values.len() > self.max_size {
            if let Some((evicted, _)) = self.values.pop_lru() {
                trace!(key = %evicted, "evicted least recently used entry");
                self.stats.evictions += 1;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for MemoryCachePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCachePolicy")
            .field("max_size", &self.max_size)
            .field("len", &self.values.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn key(k: &str) -> CacheKey {
        CacheKey::from(k)
    }

    #[test]
    fn test_memory_cache_policy_lru_eviction() {
        let mut m = MemoryCachePolicy::new(5);
        assert_eq!(m.get(&key("a")).unwrap(), None);
        m.set(&key("a"), Some(json!(1))).unwrap();
        assert_eq!(m.get(&key("a")).unwrap(), Some(json!(1)));
        for (k, v) in [("b", 2), ("c", 3), ("d", 4), ("e", 5), ("f", 6)] {
            m.set(&key(k), Some(json!(v))).unwrap();
        }
        assert_eq!(m.get(&key("a")).unwrap(), None);
        assert_eq!(m.len(), 5);

        m.get(&key("b")).unwrap();
        m.set(&key("g"), Some(json!(7))).unwrap();
        assert_eq!(m.get(&key("b")).unwrap(), Some(json!(2)));
        assert_eq!(m.get(&key("c")).unwrap(), None);
        assert!(m.contains(&key("d")));
    }

    #[test]
    fn test_set_none_deletes() {
        let mut m = MemoryCachePolicy::new(3);
        m.set(&key("a"), Some(json!({"nested": [1, 2, {"x": null}]})))
            .unwrap();
        m.set(&key("a"), None).unwrap();
        assert!(m.is_empty());
        // Deleting an absent key is a no-op.
        m.set(&key("missing"), None).unwrap();
        assert!(m.is_empty());
    }

    #[test]
    fn test_reinsert_moves_to_most_recent() {
        let mut m = MemoryCachePolicy::new(2);
        m.set(&key("a"), Some(json!(1))).unwrap();
        m.set(&key("b"), Some(json!(2))).unwrap();
        m.set(&key("a"), Some(json!(10))).unwrap();
        m.set(&key("c"), Some(json!(3))).unwrap();
        assert!(!m.contains(&key("b")));
        assert_eq!(m.get(&key("a")).unwrap(), Some(json!(10)));
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let mut m = MemoryCachePolicy::new(0);
        m.set(&key("a"), Some(json!(1))).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.stats().evictions, 1);
    }

    #[test]
    fn test_stats_track_hits_and_misses() {
        let mut m = MemoryCachePolicy::default();
        assert_eq!(m.max_size(), DEFAULT_MAX_SIZE);
        m.set(&key("a"), Some(json!(1))).unwrap();
        m.get(&key("a")).unwrap();
        m.get(&key("b")).unwrap();
        let stats = m.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entry_count, 1);
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_max_size(
            max_size in 1usize..8,
            ops in proptest::collection::vec((0u8..12, any::<bool>()), 0..64)
        ) {
            let mut m = MemoryCachePolicy::new(max_size);
            for (k, insert) in ops {
                let k = key(&k.to_string());
                if insert {
                    m.set(&k, Some(json!(k.as_str()))).unwrap();
                    prop_assert!(m.contains(&k));
                } else {
                    m.get(&k).unwrap();
                }
                prop_assert!(m.len() <= max_size);
            }
        }
    }
}
