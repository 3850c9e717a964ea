//! Client configuration loading.
//!
//! A `ClientConfig` can be built in code (starting from `Default`) or read from
//! a TOML file. Missing fields fall back to the defaults below; unknown fields
//! are rejected.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Base URL of the public Wikidata service.
pub const DEFAULT_BASE_URL: &str = "https://www.wikidata.org/";

/// Cache policy selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CacheSettings {
    /// No caching at all.
    #[default]
    None,
    /// Bounded in-process LRU.
    Memory { max_size: usize },
    /// LMDB-backed external cache behind the proxy policy.
    Lmdb {
        path: PathBuf,
        max_size_mb: usize,
        /// Lifespan of cached entries in seconds. 0 means no expiration.
        timeout_secs: u64,
        /// Lifespan of cached property documents; defaults to `timeout_secs`.
        #[serde(default)]
        property_timeout_secs: Option<u64>,
        #[serde(default = "default_namespace")]
        namespace: String,
    },
}

fn default_namespace() -> String {
    "wd_".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub base_url: String,
    /// Guess entity types from id prefixes to avoid fetches.
    pub entity_type_guess: bool,
    pub user_agent: String,
    /// Applied by the HTTP transport only.
    pub request_timeout_ms: u64,
    pub cache: CacheSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            entity_type_guess: true,
            user_agent: concat!("wikigraph/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_ms: 30_000,
            cache: CacheSettings::None,
        }
    }
}

impl ClientConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            reason: format!("{}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// The base URL, parsed.
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "base_url",
            reason: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: "must not be empty".to_string(),
            });
        }
        let url = self.parsed_base_url()?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: "must be a hierarchical URL".to_string(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "user_agent",
                reason: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        match &self.cache {
            CacheSettings::None => {}
            CacheSettings::Memory { max_size } => {
                if *max_size == 0 {
                    return Err(ConfigError::InvalidValue {
                        field: "cache.max_size",
                        reason: "must be > 0".to_string(),
                    });
                }
            }
            CacheSettings::Lmdb {
                path,
                max_size_mb,
                namespace,
                ..
            } => {
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "cache.path",
                        reason: "must not be empty".to_string(),
                    });
                }
                if *max_size_mb == 0 {
                    return Err(ConfigError::InvalidValue {
                        field: "cache.max_size_mb",
                        reason: "must be > 0".to_string(),
                    });
                }
                if namespace.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "cache.namespace",
                        reason: "must not be empty".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.entity_type_guess);
        assert_eq!(config.cache, CacheSettings::None);
    }

    #[test]
    fn test_parse_memory_cache() {
        let config = ClientConfig::from_toml_str(
            r#"
            base_url = "https://test.wikidata.org/"
            entity_type_guess = false

            [cache]
            kind = "memory"
            max_size = 256
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://test.wikidata.org/");
        assert!(!config.entity_type_guess);
        assert_eq!(config.cache, CacheSettings::Memory { max_size: 256 });
    }

    #[test]
    fn test_parse_lmdb_cache_defaults() {
        let config = ClientConfig::from_toml_str(
            r#"
            [cache]
            kind = "lmdb"
            path = "/tmp/wikigraph"
            max_size_mb = 64
            timeout_secs = 3600
            "#,
        )
        .unwrap();
        match config.cache {
            CacheSettings::Lmdb {
                property_timeout_secs,
                namespace,
                timeout_secs,
                ..
            } => {
                assert_eq!(timeout_secs, 3600);
                assert_eq!(property_timeout_secs, None);
                assert_eq!(namespace, "wd_");
            }
            other => panic!("unexpected cache settings: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let err = ClientConfig::from_toml_str("bogus = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = ClientConfig::from_toml_str("request_timeout_ms = 0").unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            }
        );

        let err = ClientConfig::from_toml_str(
            r#"
            [cache]
            kind = "memory"
            max_size = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "cache.max_size",
                ..
            }
        ));

        let err = ClientConfig::from_toml_str(r#"base_url = "not a url""#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "base_url",
                ..
            }
        ));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "user_agent = \"wikigraph-tests/1.0\"").unwrap();
        let config = ClientConfig::from_path(file.path()).unwrap();
        assert_eq!(config.user_agent, "wikigraph-tests/1.0");

        let missing = ClientConfig::from_path(Path::new("/nonexistent/wikigraph.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
