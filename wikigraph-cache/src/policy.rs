//! The cache policy interface and the no-op policy.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use wikigraph_core::CacheBackendError;

/// Key to look up cached values: the absolute URL of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for CacheKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Cached payload: an arbitrary parsed JSON document.
pub type CacheValue = serde_json::Value;

/// Interface for caching policies.
pub trait CachePolicy {
    /// Look up a cached value by its `key`.
    fn get(&mut self, key: &CacheKey) -> Result<Option<CacheValue>, CacheBackendError>;

    /// Create or update a cache entry. `None` removes the entry.
    fn set(&mut self, key: &CacheKey, value: Option<CacheValue>)
        -> Result<(), CacheBackendError>;
}

impl<P: CachePolicy + ?Sized> CachePolicy for Box<P> {
    fn get(&mut self, key: &CacheKey) -> Result<Option<CacheValue>, CacheBackendError> {
        (**self).get(key)
    }

    fn set(
        &mut self,
        key: &CacheKey,
        value: Option<CacheValue>,
    ) -> Result<(), CacheBackendError> {
        (**self).set(key, value)
    }
}

/// A policy shared by several sessions on the same thread.
pub type SharedCachePolicy<P> = Rc<RefCell<P>>;

impl<P: CachePolicy + ?Sized> CachePolicy for Rc<RefCell<P>> {
    fn get(&mut self, key: &CacheKey) -> Result<Option<CacheValue>, CacheBackendError> {
        self.borrow_mut().get(key)
    }

    fn set(
        &mut self,
        key: &CacheKey,
        value: Option<CacheValue>,
    ) -> Result<(), CacheBackendError> {
        self.borrow_mut().set(key, value)
    }
}

/// No-op cache policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCachePolicy;

impl CachePolicy for NullCachePolicy {
    fn get(&mut self, _key: &CacheKey) -> Result<Option<CacheValue>, CacheBackendError> {
        Ok(None)
    }

    fn set(
        &mut self,
        _key: &CacheKey,
        _value: Option<CacheValue>,
    ) -> Result<(), CacheBackendError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryCachePolicy;
    use serde_json::json;

    #[test]
    fn test_null_policy_never_caches() {
        let mut policy = NullCachePolicy;
        let key = CacheKey::from("https://www.wikidata.org/wiki/Special:EntityData/Q1.json");
        policy.set(&key, Some(json!({"entities": {}}))).unwrap();
        assert_eq!(policy.get(&key).unwrap(), None);
    }

    #[test]
    fn test_shared_policy_sees_same_entries() {
        let shared: SharedCachePolicy<MemoryCachePolicy> =
            Rc::new(RefCell::new(MemoryCachePolicy::new(4)));
        let mut a = Rc::clone(&shared);
        let mut b = Rc::clone(&shared);
        a.set(&CacheKey::from("k"), Some(json!(1))).unwrap();
        assert_eq!(b.get(&CacheKey::from("k")).unwrap(), Some(json!(1)));
    }

    #[test]
    fn test_boxed_policy_delegates() {
        let mut boxed: Box<dyn CachePolicy> = Box::new(MemoryCachePolicy::new(2));
        boxed.set(&CacheKey::from("k"), Some(json!("v"))).unwrap();
        assert_eq!(boxed.get(&CacheKey::from("k")).unwrap(), Some(json!("v")));
        boxed.set(&CacheKey::from("k"), None).unwrap();
        assert_eq!(boxed.get(&CacheKey::from("k")).unwrap(), None);
    }
}
