//! Claim records as they appear in entity data documents.

use crate::enums::{Rank, SnakKind};
use crate::identity::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single statement about an entity, made through one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub mainsnak: Snak,
    #[serde(default)]
    pub rank: Rank,
}

/// The main assertion of a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snak {
    pub snaktype: SnakKind,
    #[serde(default)]
    pub property: Option<EntityId>,
    /// Declared datatype of the property, e.g. `wikibase-item`.
    #[serde(default)]
    pub datatype: Option<String>,
    /// Raw `{type, value}` payload. Present only for `value` snaks.
    #[serde(default)]
    pub datavalue: Option<Value>,
}

/// Keep only snaks that carry a value, ordered by claim rank (preferred
/// first). The sort is stable, so claims of equal rank keep input order.
pub fn ranked_value_snaks(claims: Vec<Claim>) -> Vec<Snak> {
    let mut claims: Vec<Claim> = claims
        .into_iter()
        .filter(|claim| claim.mainsnak.snaktype.has_value())
        .collect();
    claims.sort_by(|a, b| b.rank.cmp(&a.rank));
    claims.into_iter().map(|claim| claim.mainsnak).collect()
}
