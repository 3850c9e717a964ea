//! Lazily loaded entity handles.
//!
//! An [`Entity`] is created unloaded by the [`Client`] registry and fetches
//! its data document the first time any attribute is read. Handles are shared
//! (`Rc`) so every holder of the same id in one session sees the same state.
//!
//! # Redirects
//!
//! Loading an alias id yields the data of its canonical entity. The handle
//! keeps its requested id, reports the canonical one from [`Entity::id`],
//! and stays `NotLoaded` so a later `load()` fetches the canonical document.
//! The canonical handle in the same session receives the data too, unless it
//! already has some, and the alias handle keeps it alive.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};
use wikigraph_core::{
    ranked_value_snaks, Claim, EntityError, EntityId, EntityState, EntityType, GraphError,
    GraphResult, MultilingualText,
};

use crate::client::{Client, ClientInner};
use crate::datavalue::DecodedValue;

pub(crate) struct EntityInner {
    requested_id: EntityId,
    client: Weak<ClientInner>,
    state: RefCell<EntityData>,
}

#[derive(Default)]
struct EntityData {
    canonical_id: Option<EntityId>,
    data: Option<Rc<Value>>,
    state: EntityState,
    label: Option<MultilingualText>,
    description: Option<MultilingualText>,
    redirect_target: Option<Entity>,
}

/// An item or property of the remote graph.
#[derive(Clone)]
pub struct Entity {
    inner: Rc<EntityInner>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, client: Weak<ClientInner>) -> Self {
        Self {
            inner: Rc::new(EntityInner {
                requested_id: id,
                client,
                state: RefCell::new(EntityData::default()),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<EntityInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<EntityInner> {
        Rc::downgrade(&self.inner)
    }

    /// Whether both handles are the very same instance.
    pub fn ptr_eq(&self, other: &Entity) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// The canonical id once a redirect is known, else the requested id.
    pub fn id(&self) -> EntityId {
        self.inner
            .state
            .borrow()
            .canonical_id
            .clone()
            .unwrap_or_else(|| self.inner.requested_id.clone())
    }

    /// The id this handle was created for. Never changes.
    pub fn requested_id(&self) -> &EntityId {
        &self.inner.requested_id
    }

    pub fn state(&self) -> EntityState {
        self.inner.state.borrow().state
    }

    /// The data record if one is attached, without loading.
    pub fn data(&self) -> Option<Rc<Value>> {
        self.inner.state.borrow().data.clone()
    }

    /// The canonical handle a redirect resolved to.
    pub fn redirect_target(&self) -> Option<Entity> {
        self.inner.state.borrow().redirect_target.clone()
    }

    pub fn client(&self) -> GraphResult<Client> {
        self.inner
            .client
            .upgrade()
            .map(Client::from_inner)
            .ok_or_else(|| {
                EntityError::SessionClosed {
                    id: self.inner.requested_id.clone(),
                }
                .into()
            })
    }

    /// Fetch the data document. No-op once the entity is known not to exist.
    pub fn load(&self) -> GraphResult<()> {
        if self.state() == EntityState::NonExistent {
            return Ok(());
        }
        let client = self.client()?;
        let id = self.id();

        let Some(result) = client.request(&id.data_path())? else {
            debug!(id = %id, "entity does not exist");
            self.inner.state.borrow_mut().state = EntityState::NonExistent;
            return Ok(());
        };

        let (loaded_id, data) = single_entity(&id, result)?;
        let data = Rc::new(data);

        if loaded_id == id {
            let mut state = self.inner.state.borrow_mut();
            state.data = Some(data);
            state.state = EntityState::Loaded;
            trace!(id = %id, "entity loaded");
            return Ok(());
        }

        debug!(requested = %id, canonical = %loaded_id, "entity redirected");
        let canonical = client.entity(loaded_id.clone());
        canonical.adopt(&data);
        client.record_alias(self.inner.requested_id.clone(), loaded_id.clone());

        let mut state = self.inner.state.borrow_mut();
        state.canonical_id = Some(loaded_id);
        state.data = Some(data);
        state.state = EntityState::NotLoaded;
        state.redirect_target = Some(canonical);
        Ok(())
    }

    /// Attach data found through a redirect, unless data is already present.
    fn adopt(&self, data: &Rc<Value>) {
        let mut state = self.inner.state.borrow_mut();
        if state.data.is_none() {
            state.data = Some(Rc::clone(data));
            state.state = EntityState::Loaded;
        }
    }

    /// The data record, loading it if needed.
    pub fn attributes(&self) -> GraphResult<Rc<Value>> {
        if let Some(data) = self.data() {
            return Ok(data);
        }
        self.load()?;
        self.data().ok_or_else(|| {
            EntityError::NonExistent {
                id: self.id(),
            }
            .into()
        })
    }

    pub fn label(&self) -> GraphResult<MultilingualText> {
        if let Some(label) = self.inner.state.borrow().label.clone() {
            return Ok(label);
        }
        let label = MultilingualText::from_terms(self.attributes()?.get("labels"));
        self.inner.state.borrow_mut().label = Some(label.clone());
        Ok(label)
    }

    pub fn description(&self) -> GraphResult<MultilingualText> {
        if let Some(description) = self.inner.state.borrow().description.clone() {
            return Ok(description);
        }
        let description = MultilingualText::from_terms(self.attributes()?.get("descriptions"));
        self.inner.state.borrow_mut().description = Some(description.clone());
        Ok(description)
    }

    /// Guessed from the id while unloaded, else read from the data.
    pub fn entity_type(&self) -> GraphResult<EntityType> {
        if self.data().is_none() {
            if let Some(guessed) = self.client()?.guess_entity_type(&self.id()) {
                return Ok(guessed);
            }
        }
        let data = self.attributes()?;
        data.get("type")
            .and_then(Value::as_str)
            .and_then(|ty| ty.parse().ok())
            .ok_or_else(|| self.malformed("missing or unknown \"type\" field"))
    }

    /// Run `read` over the claims mapping of the loaded record, borrowed
    /// rather than copied. `None` when the record has no claims.
    fn with_claims<T>(
        &self,
        read: impl FnOnce(Option<&serde_json::Map<String, Value>>) -> T,
    ) -> GraphResult<T> {
        let data = self.attributes()?;
        match data.get("claims") {
            None | Some(Value::Null) => Ok(read(None)),
            Some(Value::Object(claims)) => Ok(read(Some(claims))),
            Some(_) => Err(self.malformed("\"claims\" is not a mapping")),
        }
    }

    /// Property handles for every claim key.
    pub fn properties(&self) -> GraphResult<Vec<Entity>> {
        let client = self.client()?;
        self.with_claims(|claims| {
            claims
                .map(|claims| claims.keys().map(|id| client.entity(id.as_str())).collect())
                .unwrap_or_default()
        })
    }

    /// Number of properties with claims.
    pub fn len(&self) -> GraphResult<usize> {
        self.with_claims(|claims| claims.map_or(0, serde_json::Map::len))
    }

    pub fn is_empty(&self) -> GraphResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn contains(&self, property: &Entity) -> GraphResult<bool> {
        let id = property.id();
        self.with_claims(|claims| claims.is_some_and(|claims| claims.contains_key(id.as_str())))
    }

    /// Every decoded value of `property`, preferred rank first.
    ///
    /// Empty when `property` is not a property entity. Snaks without a value
    /// are skipped; claims of equal rank keep document order. The first
    /// value that fails to decode aborts the call.
    pub fn getlist(&self, property: &Entity) -> GraphResult<Vec<DecodedValue>> {
        if property.entity_type()? != EntityType::Property {
            return Ok(Vec::new());
        }
        let property_id = property.id();
        let parsed = self.with_claims(|claims| {
            claims
                .and_then(|claims| claims.get(property_id.as_str()))
                .map(Vec::<Claim>::deserialize)
        })?;
        let Some(parsed) = parsed else {
            return Ok(Vec::new());
        };
        let claims = parsed.map_err(|e| self.malformed(&e.to_string()))?;
        trace!(id = %self.id(), property = %property_id, claims = claims.len(), "claim data");

        let client = self.client()?;
        ranked_value_snaks(claims)
            .into_iter()
            .map(|snak| {
                let datatype = snak.datatype.unwrap_or_default();
                let datavalue = snak.datavalue.unwrap_or(Value::Null);
                client
                    .decode_datavalue(&datatype, &datavalue)
                    .map_err(GraphError::from)
            })
            .collect()
    }

    /// The first value of `property`.
    pub fn get(&self, property: &Entity) -> GraphResult<DecodedValue> {
        self.getlist(property)?.into_iter().next().ok_or_else(|| {
            EntityError::NoValue {
                id: self.id(),
                property: property.id(),
            }
            .into()
        })
    }

    /// `(property, values)` for every property with claims.
    pub fn lists(&self) -> GraphResult<Vec<(Entity, Vec<DecodedValue>)>> {
        self.properties()?
            .into_iter()
            .map(|property| {
                let values = self.getlist(&property)?;
                Ok((property, values))
            })
            .collect()
    }

    fn malformed(&self, reason: &str) -> GraphError {
        EntityError::MalformedData {
            id: self.id(),
            reason: reason.to_string(),
        }
        .into()
    }
}

/// Pull the single record out of an `{"entities": {id: data}}` document.
fn single_entity(id: &EntityId, result: Value) -> GraphResult<(EntityId, Value)> {
    let malformed = |reason: &str| EntityError::MalformedData {
        id: id.clone(),
        reason: reason.to_string(),
    };
    let Value::Object(mut document) = result else {
        return Err(malformed("response is not a mapping").into());
    };
    let Some(Value::Object(entities)) = document.remove("entities") else {
        return Err(malformed("missing \"entities\" mapping").into());
    };
    if entities.len() != 1 {
        return Err(malformed(&format!("expected one entity, got {}", entities.len())).into());
    }
    entities
        .into_iter()
        .next()
        .map(|(key, data)| (EntityId::new(key), data))
        .ok_or_else(|| malformed("empty \"entities\" mapping").into())
}

impl PartialEq for Entity {
    /// Same requested id in the same session.
    fn eq(&self, other: &Self) -> bool {
        self.inner.requested_id == other.inner.requested_id
            && self.inner.client.ptr_eq(&other.inner.client)
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.requested_id.hash(state);
        self.inner.client.as_ptr().hash(state);
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Entity {}", self.id())?;
        if self.data().is_some() {
            if let Ok(label) = self.label() {
                let label = label.to_string();
                if !label.is_empty() {
                    write!(f, " '{label}'")?;
                }
            }
        }
        f.write_str(">")
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
