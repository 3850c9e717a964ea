//! Error types for wikigraph operations

use crate::identity::EntityId;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A datavalue payload could not be decoded.
///
/// The message and the offending payload always travel together.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError {
    message: String,
    datavalue: Value,
}

impl DecodeError {
    pub fn new(message: impl Into<String>, datavalue: Value) -> Self {
        Self {
            message: message.into(),
            datavalue,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The datavalue which caused the decoding error.
    pub fn datavalue(&self) -> &Value {
        &self.datavalue
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.message)?;
        let Some(map) = self.datavalue.as_object() else {
            return write!(f, "{}", self.datavalue);
        };
        // The `type` field leads so the value type is visible at a glance.
        let entries = map
            .get("type")
            .map(|ty| ("type", ty))
            .into_iter()
            .chain(
                map.iter()
                    .filter(|(k, _)| k.as_str() != "type")
                    .map(|(k, v)| (k.as_str(), v)),
            );
        f.write_str("{")?;
        for (i, (key, value)) in entries.enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", Value::from(key), value)?;
        }
        f.write_str("}")
    }
}

impl std::error::Error for DecodeError {}

/// Transport layer errors. Passed through unchanged and never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Invalid request URL for path {path}: {reason}")]
    InvalidUrl { path: String, reason: String },

    #[error("Request to {url} failed: {reason}")]
    Connection { url: String, reason: String },

    #[error("Request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid response body from {url}: {reason}")]
    InvalidBody { url: String, reason: String },
}

/// Errors reported by an external cache backend. Passed through, never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheBackendError {
    #[error("Cache backend failure: {reason}")]
    Backend { reason: String },

    #[error("Cache serialization error: {reason}")]
    Serialization { reason: String },

    #[error("Cache lock poisoned")]
    LockPoisoned,
}

/// Entity lifecycle errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityError {
    #[error("Entity {id} does not exist")]
    NonExistent { id: EntityId },

    #[error("No value for property {property} on entity {id}")]
    NoValue { id: EntityId, property: EntityId },

    #[error("Malformed entity data for {id}: {reason}")]
    MalformedData { id: EntityId, reason: String },

    #[error("Client session for entity {id} has been dropped")]
    SessionClosed { id: EntityId },
}

/// Commons media errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FileError {
    #[error("The server responded with an error for {title}: {error}")]
    Server { title: String, error: String },

    #[error("Malformed media metadata for {title}: {reason}")]
    Malformed { title: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file: {reason}")]
    Io { reason: String },

    #[error("Failed to parse config TOML: {reason}")]
    Parse { reason: String },

    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Master error type for all wikigraph errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Cache backend error: {0}")]
    CacheBackend(#[from] CacheBackendError),

    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),

    #[error("File error: {0}")]
    File(#[from] FileError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for wikigraph operations.
pub type GraphResult<T> = Result<T, GraphError>;

// =============================================================================
// TESTS
// =============================================================================
