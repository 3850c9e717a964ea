//! Offline transport serving fixture documents.

use std::cell::RefCell;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use url::Url;
use wikigraph_client::{Transport, TransportResponse};
use wikigraph_core::TransportError;

use crate::fixtures;

/// Ids the service accepts: one upper-case letter, then digits.
static ENTITY_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][0-9]+$").expect("valid entity id regex"));

const ENTITY_DATA_PREFIX: &str = "/wiki/Special:EntityData/";
const MEDIA_API_PATH: &str = "/w/api.php";

/// Answers entity data and media queries from memory and records every
/// fetched URL.
///
/// - `/wiki/Special:EntityData/{id}.json`: the document for `id`, 400
///   `Invalid ID` when `id` is malformed, 404 when unknown
/// - `/w/api.php?...&titles={title}`: the media page for `title`, a
///   `missing` page when unknown, an `error` document when `titles` is absent
/// - anything else: 404
#[derive(Debug, Default)]
pub struct FixtureTransport {
    entities: HashMap<String, Value>,
    media: HashMap<String, Value>,
    records: RefCell<Vec<String>>,
}

impl FixtureTransport {
    /// A transport serving nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A transport serving every document in [`fixtures`].
    pub fn new() -> Self {
        let mut transport = Self::empty();
        for data in fixtures::entities() {
            transport = transport.with_entity(data);
        }
        for (alias, data) in fixtures::redirects() {
            transport = transport.with_redirect(alias, data);
        }
        for (title, document) in fixtures::media() {
            transport = transport.with_media(title, document);
        }
        transport
    }

    /// Serve `data` under its own `id` field.
    pub fn with_entity(mut self, data: Value) -> Self {
        let id = data["id"].as_str().unwrap_or_default().to_string();
        self.entities.insert(id.clone(), fixtures::document(&id, data));
        self
    }

    /// Serve the canonical record `data` when `alias` is requested.
    pub fn with_redirect(mut self, alias: &str, data: Value) -> Self {
        let id = data["id"].as_str().unwrap_or_default().to_string();
        self.entities
            .insert(alias.to_string(), fixtures::document(&id, data));
        self
    }

    pub fn with_media(mut self, title: &str, document: Value) -> Self {
        self.media.insert(title.to_string(), document);
        self
    }

    /// Every URL fetched so far, in order.
    pub fn records(&self) -> Vec<String> {
        self.records.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn clear_records(&self) {
        self.records.borrow_mut().clear();
    }

    fn json(value: &Value) -> TransportResponse {
        TransportResponse::new(200, value.to_string())
    }

    fn not_found() -> TransportResponse {
        TransportResponse::new(404, "Not Found")
    }

    fn entity_data(&self, file: &str) -> TransportResponse {
        let Some(id) = file.strip_suffix(".json") else {
            return Self::not_found();
        };
        if !ENTITY_ID_RE.is_match(id) {
            return TransportResponse::new(400, format!("Invalid ID: {id}"));
        }
        match self.entities.get(id) {
            Some(document) => Self::json(document),
            None => Self::not_found(),
        }
    }

    fn media_query(&self, url: &Url) -> TransportResponse {
        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let Some(title) = query
            .get("titles")
            .filter(|_| query.get("action").map(String::as_str) == Some("query"))
        else {
            return Self::json(&json!({
                "error": {"code": "badvalue", "info": "...", "*": "..."},
                "servedby": "fixture",
            }));
        };
        match self.media.get(title) {
            Some(document) => Self::json(document),
            None => Self::json(&fixtures::missing_media_document(title)),
        }
    }
}

impl Transport for FixtureTransport {
    fn fetch(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        self.records.borrow_mut().push(url.to_string());
        let path = url.path();
        if let Some(file) = path.strip_prefix(ENTITY_DATA_PREFIX) {
            return Ok(self.entity_data(file));
        }
        if path == MEDIA_API_PATH {
            return Ok(self.media_query(url));
        }
        Ok(Self::not_found())
    }
}
