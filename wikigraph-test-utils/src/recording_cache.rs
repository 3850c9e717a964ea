//! External cache that records every call it receives.

use std::cell::RefCell;

use wikigraph_cache::{ExternalCache, MemoryExternalCache};
use wikigraph_core::CacheBackendError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOp {
    Get(String),
    Set { key: String, ttl_secs: u64 },
    Delete(String),
}

/// A [`MemoryExternalCache`] that logs each operation before performing it.
#[derive(Default)]
pub struct RecordingExternalCache {
    inner: MemoryExternalCache,
    ops: RefCell<Vec<CacheOp>>,
}

impl RecordingExternalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<CacheOp> {
        self.ops.borrow().clone()
    }

    /// Keys written so far, in order.
    pub fn set_keys(&self) -> Vec<String> {
        self.ops
            .borrow()
            .iter()
            .filter_map(|op| match op {
                CacheOp::Set { key, .. } => Some(key.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl ExternalCache for RecordingExternalCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheBackendError> {
        self.ops.borrow_mut().push(CacheOp::Get(key.to_string()));
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<(), CacheBackendError> {
        self.ops.borrow_mut().push(CacheOp::Set {
            key: key.to_string(),
            ttl_secs,
        });
        self.inner.set(key, value, ttl_secs)
    }

    fn delete(&self, key: &str) -> Result<(), CacheBackendError> {
        self.ops.borrow_mut().push(CacheOp::Delete(key.to_string()));
        self.inner.delete(key)
    }
}
