//! Enum types for wikigraph entities and claims

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENTITY ENUMS
// ============================================================================

/// Lifecycle state of an entity handle.
///
/// `Loaded` and `NonExistent` are terminal with respect to network activity:
/// a non-existent entity is never fetched again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityState {
    #[default]
    NotLoaded,
    Loaded,
    NonExistent,
}

/// Coarse kind of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// A thing a wiki page is about: a person, a class of things, a concept.
    Item,
    /// A relationship between entities and values, e.g. *population*.
    Property,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Item => "item",
            EntityType::Property => "property",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an entity type string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTypeParseError(pub String);

impl fmt::Display for EntityTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown entity type: {}", self.0)
    }
}

impl std::error::Error for EntityTypeParseError {}

impl FromStr for EntityType {
    type Err = EntityTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "item" => Ok(EntityType::Item),
            "property" => Ok(EntityType::Property),
            other => Err(EntityTypeParseError(other.to_string())),
        }
    }
}

// ============================================================================
// CLAIM ENUMS
// ============================================================================

/// Claim priority. Ordering follows priority: `Deprecated < Normal < Preferred`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Deprecated,
    #[default]
    Normal,
    Preferred,
}

/// Whether a snak carries a concrete value, explicitly no value, or an
/// unknown value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnakKind {
    #[serde(rename = "value")]
    Value,
    #[serde(rename = "novalue")]
    NoValue,
    #[serde(rename = "somevalue")]
    SomeValue,
}

impl SnakKind {
    pub fn has_value(&self) -> bool {
        matches!(self, SnakKind::Value)
    }
}
