//! wikigraph Core - Shared Types
//!
//! Identifiers, enums, claim records, multilingual text, errors and
//! configuration. Every other wikigraph crate depends on this one; it holds
//! no network or cache behavior of its own.

pub mod claim;
pub mod config;
pub mod enums;
pub mod error;
pub mod identity;
pub mod multilingual;

pub use claim::{ranked_value_snaks, Claim, Snak};
pub use config::{CacheSettings, ClientConfig, DEFAULT_BASE_URL};
pub use enums::{EntityState, EntityType, Rank, SnakKind};
pub use error::{
    CacheBackendError, ConfigError, DecodeError, EntityError, FileError, GraphError, GraphResult,
    TransportError,
};
pub use identity::EntityId;
pub use multilingual::{Locale, MonolingualText, MultilingualText};
