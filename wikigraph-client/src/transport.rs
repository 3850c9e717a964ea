//! Network fetch contract and the default HTTP implementation.

use std::rc::Rc;
use std::time::Duration;

use tracing::debug;
use url::Url;
use wikigraph_core::{ClientConfig, ConfigError, TransportError};

/// Raw answer of a fetch: status code and body bytes, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 404, or the 400 the service answers for malformed ids.
    pub fn is_not_found(&self) -> bool {
        match self.status {
            404 => true,
            400 => contains_bytes(&self.body, b"Invalid ID"),
            _ => false,
        }
    }
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}

/// Performs a single network fetch.
///
/// Implementations must not retry and must not interpret the status code;
/// the client decides what counts as absence.
pub trait Transport {
    fn fetch(&self, url: &Url) -> Result<TransportResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Rc<T> {
    fn fetch(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        (**self).fetch(url)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn fetch(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        (**self).fetch(url)
    }
}

/// Blocking HTTP transport over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                field: "transport",
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Self::new(
            &config.user_agent,
            Duration::from_millis(config.request_timeout_ms),
        )
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        debug!(url = %url, "sending request");
        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|e| TransportError::Connection {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(|e| TransportError::InvalidBody {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        debug!(url = %url, status, bytes = body.len(), "received response");
        Ok(TransportResponse::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_recognition() {
        assert!(TransportResponse::new(404, "").is_not_found());
        assert!(TransportResponse::new(400, "error: Invalid ID given").is_not_found());
        assert!(!TransportResponse::new(400, "bad request").is_not_found());
        assert!(!TransportResponse::new(500, "Invalid ID").is_not_found());
        assert!(!TransportResponse::new(200, "{}").is_not_found());
    }

    #[test]
    fn test_success_range() {
        assert!(TransportResponse::new(200, "").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(301, "").is_success());
        assert!(!TransportResponse::new(404, "").is_success());
    }

    #[test]
    fn test_http_transport_builds_from_default_config() {
        let transport = HttpTransport::from_config(&ClientConfig::default());
        assert!(transport.is_ok());
    }
}
