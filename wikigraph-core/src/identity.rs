//! Identity types for wikigraph entities

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of an entity in the remote graph, e.g. `Q1299` or `P434`.
///
/// Opaque and compared by value. No validation happens here: malformed ids
/// are the remote service's business and surface as entity absence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First character of the id, used by type guessing.
    pub fn prefix(&self) -> Option<char> {
        self.0.chars().next()
    }

    /// Path of the canonical JSON data document for this id, relative to the
    /// service base URL.
    pub fn data_path(&self) -> String {
        format!("./wiki/Special:EntityData/{}.json", self.0)
    }

    /// Extract an id from an entity IRI such as
    /// `http://www.wikidata.org/entity/Q111` (its trailing path segment).
    pub fn from_iri(iri: &str) -> Option<Self> {
        let (_, tail) = iri.rsplit_once('/')?;
        if tail.is_empty() {
            return None;
        }
        Some(Self::new(tail))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&EntityId> for EntityId {
    fn from(id: &EntityId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
