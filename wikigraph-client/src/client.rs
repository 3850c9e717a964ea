//! Client session: identity map, cached requests and decoder dispatch.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace};
use url::Url;
use wikigraph_cache::{
    CacheKey, CachePolicy, LmdbExternalCache, MemoryCachePolicy, NullCachePolicy,
    ProxyCachePolicy,
};
use wikigraph_core::{
    CacheSettings, ClientConfig, ConfigError, DecodeError, EntityId, EntityType, GraphResult,
    TransportError, DEFAULT_BASE_URL,
};

use crate::datavalue::{DecodedValue, Decoder};
use crate::entity::{Entity, EntityInner};
use crate::transport::{HttpTransport, Transport};

pub(crate) struct ClientInner {
    base_url: Url,
    transport: Box<dyn Transport>,
    decoder: Decoder,
    entity_type_guess: bool,
    cache_policy: RefCell<Box<dyn CachePolicy>>,
    identity_map: RefCell<HashMap<EntityId, Weak<EntityInner>>>,
    aliases: RefCell<HashMap<EntityId, EntityId>>,
    repr_string: Option<String>,
}

/// A session against one Wikibase service.
///
/// Cloning is cheap and yields a handle to the same session: the same
/// identity map, cache policy and decoder. Handles are `!Send`; a session
/// lives on one thread.
#[derive(Clone)]
pub struct Client {
    inner: Rc<ClientInner>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Build a session from a validated configuration, talking HTTP.
    pub fn from_config(config: &ClientConfig) -> GraphResult<Self> {
        ClientBuilder::from_config(config)?.build()
    }

    pub(crate) fn from_inner(inner: Rc<ClientInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<ClientInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn ptr_eq(&self, other: &Client) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn entity_type_guess(&self) -> bool {
        self.inner.entity_type_guess
    }

    /// The live handle for `id`, or a new unloaded one. Never fetches.
    pub fn entity(&self, id: impl Into<EntityId>) -> Entity {
        let id = id.into();
        let mut map = self.inner.identity_map.borrow_mut();
        if let Some(entity) = map.get(&id).and_then(Weak::upgrade) {
            return Entity::from_inner(entity);
        }
        trace!(id = %id, "new entity handle");
        let entity = Entity::new(id.clone(), self.downgrade());
        map.insert(id, entity.downgrade());
        entity
    }

    /// Like [`entity`](Self::entity), loading the handle first when `load`
    /// is set.
    pub fn get(&self, id: impl Into<EntityId>, load: bool) -> GraphResult<Entity> {
        let entity = self.entity(id);
        if load {
            entity.load()?;
        }
        Ok(entity)
    }

    /// `Q…` is an item, `P…` a property. Always `None` with guessing off.
    pub fn guess_entity_type(&self, id: &EntityId) -> Option<EntityType> {
        if !self.inner.entity_type_guess {
            return None;
        }
        match id.prefix() {
            Some('Q') => Some(EntityType::Item),
            Some('P') => Some(EntityType::Property),
            _ => None,
        }
    }

    /// Fetch the JSON document at `path` (relative to the base URL) through
    /// the cache policy.
    ///
    /// A not-found answer is `Ok(None)` and is not cached. Other failures
    /// propagate and are not cached either.
    pub fn request(&self, path: &str) -> GraphResult<Option<Value>> {
        let url = self
            .inner
            .base_url
            .join(path)
            .map_err(|e| TransportError::InvalidUrl {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        let key = CacheKey::new(url.as_str());

        let cached = self.inner.cache_policy.borrow_mut().get(&key)?;
        if let Some(value) = cached {
            debug!(url = %url, "cache hit");
            return Ok(Some(value));
        }

        debug!(url = %url, "no cache; making a request");
        let response = self.inner.transport.fetch(&url)?;
        if response.is_not_found() {
            debug!(url = %url, status = response.status, "not found");
            return Ok(None);
        }
        if !response.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: response.status,
            }
            .into());
        }
        let value: Value =
            serde_json::from_slice(&response.body).map_err(|e| TransportError::InvalidBody {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        self.inner
            .cache_policy
            .borrow_mut()
            .set(&key, Some(value.clone()))?;
        Ok(Some(value))
    }

    pub fn decode_datavalue(
        &self,
        datatype: &str,
        datavalue: &Value,
    ) -> Result<DecodedValue, DecodeError> {
        self.inner.decoder.decode(self, datatype, datavalue)
    }

    /// The id `id` redirects to, if a load has discovered one and the
    /// canonical entity has not been swept since.
    pub fn canonical_id(&self, id: &EntityId) -> Option<EntityId> {
        self.inner.aliases.borrow().get(id).cloned()
    }

    pub(crate) fn record_alias(&self, alias: EntityId, canonical: EntityId) {
        debug!(alias = %alias, canonical = %canonical, "recorded redirect");
        self.inner.aliases.borrow_mut().insert(alias, canonical);
    }

    /// Drop identity map slots whose entity is gone, and the recorded
    /// redirects into them. Returns how many slots were dropped.
    pub fn sweep(&self) -> usize {
        let mut map = self.inner.identity_map.borrow_mut();
        let before = map.len();
        map.retain(|_, entity| entity.strong_count() > 0);
        let swept = before - map.len();
        let mut aliases = self.inner.aliases.borrow_mut();
        let aliases_before = aliases.len();
        aliases.retain(|_, canonical| map.contains_key(canonical));
        trace!(swept, aliases = aliases_before - aliases.len(), "swept identity map");
        swept
    }

    /// Number of entities currently held alive outside the registry.
    pub fn len_live(&self) -> usize {
        self.inner
            .identity_map
            .borrow()
            .values()
            .filter(|entity| entity.strong_count() > 0)
            .count()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.repr_string {
            Some(repr) => f.write_str(repr),
            None => write!(f, "Client({:?})", self.inner.base_url.as_str()),
        }
    }
}

/// Builder for [`Client`].
///
/// Defaults: the public Wikidata base URL, type guessing on, no caching, the
/// built-in decoder and an HTTP transport.
pub struct ClientBuilder {
    base_url: String,
    transport: Option<Box<dyn Transport>>,
    decoder: Decoder,
    entity_type_guess: bool,
    cache_policy: Box<dyn CachePolicy>,
    repr_string: Option<String>,
    user_agent: String,
    request_timeout_ms: u64,
}

impl ClientBuilder {
    pub fn new() -> Self {
        let defaults = ClientConfig::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: None,
            decoder: Decoder::new(),
            entity_type_guess: defaults.entity_type_guess,
            cache_policy: Box::new(NullCachePolicy),
            repr_string: None,
            user_agent: defaults.user_agent,
            request_timeout_ms: defaults.request_timeout_ms,
        }
    }

    /// Start from a configuration file's settings. The cache backend is
    /// opened here.
    pub fn from_config(config: &ClientConfig) -> GraphResult<Self> {
        config.validate()?;
        let cache_policy: Box<dyn CachePolicy> = match &config.cache {
            CacheSettings::None => Box::new(NullCachePolicy),
            CacheSettings::Memory { max_size } => Box::new(MemoryCachePolicy::new(*max_size)),
            CacheSettings::Lmdb {
                path,
                max_size_mb,
                timeout_secs,
                property_timeout_secs,
                namespace,
            } => {
                let backend = LmdbExternalCache::new(path, *max_size_mb)?;
                Box::new(
                    ProxyCachePolicy::new(backend, *timeout_secs)
                        .with_property_timeout(property_timeout_secs.unwrap_or(*timeout_secs))
                        .with_namespace(namespace.clone()),
                )
            }
        };
        Ok(Self {
            base_url: config.base_url.clone(),
            entity_type_guess: config.entity_type_guess,
            cache_policy,
            user_agent: config.user_agent.clone(),
            request_timeout_ms: config.request_timeout_ms,
            ..Self::new()
        })
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn entity_type_guess(mut self, guess: bool) -> Self {
        self.entity_type_guess = guess;
        self
    }

    /// Share a policy between sessions by passing a
    /// [`SharedCachePolicy`](wikigraph_cache::SharedCachePolicy) clone.
    pub fn cache_policy(mut self, policy: impl CachePolicy + 'static) -> Self {
        self.cache_policy = Box::new(policy);
        self
    }

    /// Text the session's `Debug` output is replaced with.
    pub fn with_repr(mut self, repr: impl Into<String>) -> Self {
        self.repr_string = Some(repr.into());
        self
    }

    pub fn build(self) -> GraphResult<Client> {
        let base_url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "base_url",
            reason: e.to_string(),
        })?;
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(
                &self.user_agent,
                Duration::from_millis(self.request_timeout_ms),
            )?),
        };
        Ok(Client::from_inner(Rc::new(ClientInner {
            base_url,
            transport,
            decoder: self.decoder,
            entity_type_guess: self.entity_type_guess,
            cache_policy: RefCell::new(self.cache_policy),
            identity_map: RefCell::new(HashMap::new()),
            aliases: RefCell::new(HashMap::new()),
            repr_string: self.repr_string,
        })))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
