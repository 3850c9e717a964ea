//! Adapter from [`CachePolicy`] onto an [`ExternalCache`].

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;
use wikigraph_core::CacheBackendError;

use crate::policy::{CacheKey, CachePolicy, CacheValue};
use crate::traits::ExternalCache;

/// Default prefix attached to every encoded key.
pub const DEFAULT_NAMESPACE: &str = "wd_";

/// Property data documents end with `/P<digits>.json`.
static PROPERTY_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)] // literal pattern, checked by tests
    Regex::new(r"/P\d+\.json$").expect("valid property key regex")
});

/// Proxy policy over an external byte-oriented cache.
///
/// Keys are encoded as `namespace + hex(sha256(key))`: fixed-length and
/// namespaced. The digest is not a security boundary. Values are stored as
/// JSON bytes, which round-trips any cached document exactly.
///
/// Property documents change far less often than item data, so they can be
/// given a longer lifespan with [`with_property_timeout`](Self::with_property_timeout).
pub struct ProxyCachePolicy<E> {
    cache: E,
    /// Lifespan of every entry in seconds. 0 means no expiration.
    timeout: u64,
    /// Lifespan of property entries in seconds. 0 means no expiration.
    property_timeout: u64,
    namespace: String,
}

impl<E: ExternalCache> ProxyCachePolicy<E> {
    /// Create a proxy with one lifespan for every entry and the default
    /// namespace.
    pub fn new(cache: E, timeout: u64) -> Self {
        Self {
            cache,
            timeout,
            property_timeout: timeout,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Set the lifespan of property documents.
    pub fn with_property_timeout(mut self, property_timeout: u64) -> Self {
        self.property_timeout = property_timeout;
        self
    }

    /// Set the prefix attached to every encoded key.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn backend(&self) -> &E {
        &self.cache
    }

    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    pub fn property_timeout(&self) -> u64 {
        self.property_timeout
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn encode_key(&self, key: &CacheKey) -> String {
        let digest = Sha256::digest(key.as_str().as_bytes());
        let encoded = format!("{}{}", self.namespace, hex::encode(digest));
        debug!(key = %key, encoded = %encoded, "encoded cache key");
        encoded
    }

    pub fn is_property(key: &CacheKey) -> bool {
        PROPERTY_KEY_RE.is_match(key.as_str())
    }

    fn ttl_for(&self, key: &CacheKey) -> u64 {
        if Self::is_property(key) {
            self.property_timeout
        } else {
            self.timeout
        }
    }
}

impl<E: ExternalCache> CachePolicy for ProxyCachePolicy<E> {
    fn get(&mut self, key: &CacheKey) -> Result<Option<CacheValue>, CacheBackendError> {
        let encoded = self.encode_key(key);
        let Some(bytes) = self.cache.get(&encoded)? else {
            return Ok(None);
        };
        let value = serde_json::from_slice(&bytes).map_err(|e| {
            CacheBackendError::Serialization {
                reason: e.to_string(),
            }
        })?;
        Ok(Some(value))
    }

    fn set(
        &mut self,
        key: &CacheKey,
        value: Option<CacheValue>,
    ) -> Result<(), CacheBackendError> {
        let encoded = self.encode_key(key);
        let Some(value) = value else {
            return self.cache.delete(&encoded);
        };
        let bytes = serde_json::to_vec(&value).map_err(|e| CacheBackendError::Serialization {
            reason: e.to_string(),
        })?;
        self.cache.set(&encoded, &bytes, self.ttl_for(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Get(String),
        Set(String, Vec<u8>, u64),
        Delete(String),
    }

    #[derive(Default)]
    struct MockCache {
        records: RefCell<Vec<Op>>,
        stored: RefCell<Option<(String, Vec<u8>)>>,
    }

    impl ExternalCache for MockCache {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheBackendError> {
            self.records.borrow_mut().push(Op::Get(key.to_string()));
            Ok(self
                .stored
                .borrow()
                .as_ref()
                .filter(|(k, _)| k == key)
                .map(|(_, v)| v.clone()))
        }

        fn set(&self, key: &str, value: &[u8], ttl_secs: u64) -> Result<(), CacheBackendError> {
            self.records
                .borrow_mut()
                .push(Op::Set(key.to_string(), value.to_vec(), ttl_secs));
            Ok(())
        }

        fn delete(&self, key: &str) -> Result<(), CacheBackendError> {
            self.records.borrow_mut().push(Op::Delete(key.to_string()));
            Ok(())
        }
    }

    fn expected_key(namespace: &str, raw: &str) -> String {
        format!("{}{}", namespace, hex::encode(Sha256::digest(raw.as_bytes())))
    }

    fn proxy(mock: &Rc<MockCache>) -> ProxyCachePolicy<Rc<MockCache>> {
        ProxyCachePolicy::new(Rc::clone(mock), 123)
            .with_property_timeout(456)
            .with_namespace("wd/")
    }

    #[test]
    fn test_encode_key_is_stable_and_namespaced() {
        let mock = Rc::new(MockCache::default());
        let p = proxy(&mock);
        let a = p.encode_key(&CacheKey::from("foo"));
        let b = p.encode_key(&CacheKey::from("foo"));
        assert_eq!(a, b);
        assert_eq!(a, expected_key("wd/", "foo"));
        assert_eq!(a.len(), "wd/".len() + 64);
        assert_ne!(a, p.encode_key(&CacheKey::from("bar")));
    }

    #[test]
    fn test_get_miss_and_hit() {
        let mock = Rc::new(MockCache::default());
        let mut p = proxy(&mock);
        assert_eq!(p.get(&CacheKey::from("foo")).unwrap(), None);
        assert_eq!(
            mock.records.borrow()[0],
            Op::Get(expected_key("wd/", "foo"))
        );

        *mock.stored.borrow_mut() = Some((
            expected_key("wd/", "bar"),
            serde_json::to_vec(&json!("cached value")).unwrap(),
        ));
        assert_eq!(
            p.get(&CacheKey::from("bar")).unwrap(),
            Some(json!("cached value"))
        );
    }

    #[test]
    fn test_set_uses_item_timeout() {
        let mock = Rc::new(MockCache::default());
        let mut p = proxy(&mock);
        let value = json!({"entities": {"Q1": {"labels": {}, "claims": {"P31": []}}}});
        p.set(&CacheKey::from("baz"), Some(value.clone())).unwrap();
        let records = mock.records.borrow();
        match &records[0] {
            Op::Set(key, bytes, ttl) => {
                assert_eq!(key, &expected_key("wd/", "baz"));
                assert_eq!(serde_json::from_slice::<CacheValue>(bytes).unwrap(), value);
                assert_eq!(*ttl, 123);
            }
            other => panic!("expected set, got {other:?}"),
        }
    }

    #[test]
    fn test_set_none_deletes() {
        let mock = Rc::new(MockCache::default());
        let mut p = proxy(&mock);
        p.set(&CacheKey::from("qux"), None).unwrap();
        assert_eq!(
            *mock.records.borrow(),
            vec![Op::Delete(expected_key("wd/", "qux"))]
        );
    }

    #[test]
    fn test_property_documents_use_property_timeout() {
        let mock = Rc::new(MockCache::default());
        let mut p = proxy(&mock);
        let url = "https://www.wikidata.org/wiki/Special:EntityData/P18.json";
        p.set(&CacheKey::from(url), Some(json!("foo"))).unwrap();
        let item = "https://www.wikidata.org/wiki/Special:EntityData/Q18.json";
        p.set(&CacheKey::from(item), Some(json!("bar"))).unwrap();
        let records = mock.records.borrow();
        assert!(matches!(&records[0], Op::Set(k, _, 456) if k == &expected_key("wd/", url)));
        assert!(matches!(&records[1], Op::Set(_, _, 123)));
    }

    #[test]
    fn test_is_property() {
        let is = |k: &str| ProxyCachePolicy::<Rc<MockCache>>::is_property(&CacheKey::from(k));
        assert!(is("https://www.wikidata.org/wiki/Special:EntityData/P18.json"));
        assert!(is("/P1.json"));
        assert!(!is("https://www.wikidata.org/wiki/Special:EntityData/Q18.json"));
        assert!(!is("https://www.wikidata.org/wiki/Special:EntityData/P18.json?x=1"));
        assert!(!is("/PX1.json"));
    }

    #[test]
    fn test_default_namespace_and_timeouts() {
        let p = ProxyCachePolicy::new(MockCache::default(), 60);
        assert_eq!(p.namespace(), DEFAULT_NAMESPACE);
        assert_eq!(p.timeout(), 60);
        assert_eq!(p.property_timeout(), 60);
    }

    #[test]
    fn test_corrupt_payload_is_serialization_error() {
        let mock = Rc::new(MockCache::default());
        let mut p = proxy(&mock);
        *mock.stored.borrow_mut() = Some((expected_key("wd/", "bad"), b"not json".to_vec()));
        let err = p.get(&CacheKey::from("bad")).unwrap_err();
        assert!(matches!(err, CacheBackendError::Serialization { .. }));
    }

    #[test]
    fn test_extreme_floats_round_trip_exactly() {
        let mut p = ProxyCachePolicy::new(crate::memory_backend::MemoryExternalCache::new(), 0);
        let key = CacheKey::from("floats");
        let value = json!({
            "a": [1.0715660391465826e-75, 2.2250738585072014e-308, 1.7976931348623157e308],
            "b": 0.1,
        });
        p.set(&key, Some(value.clone())).unwrap();
        let back = p.get(&key).unwrap().unwrap();
        assert_eq!(back, value);
        assert_eq!(
            back["a"][0].as_f64().unwrap().to_bits(),
            1.0715660391465826e-75_f64.to_bits()
        );
    }
}
