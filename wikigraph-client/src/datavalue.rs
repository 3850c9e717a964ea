//! Decoding claim datavalues into typed values.
//!
//! A [`Decoder`] is a table of handlers keyed by name. For a call with
//! `datatype` and a `{"type": ..., "value": ...}` payload it tries, in order:
//!
//! 1. `{datatype}__{type}`, e.g. `commonsMedia__string`
//! 2. `{type}`, e.g. `string`
//!
//! Hyphens in both names become underscores first, so `wikibase-entityid`
//! dispatches to `wikibase_entityid`. Register a handler under a composite
//! name to override a general one for a single datatype.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use wikigraph_core::{DecodeError, EntityId, Locale, MonolingualText};

use crate::client::Client;
use crate::commons_media::File;
use crate::entity::Entity;
use crate::globe_coordinate::GlobeCoordinate;
use crate::quantity::Quantity;

/// The only calendar model `time` values may use (proleptic Gregorian).
pub const GREGORIAN_CALENDAR: &str = "http://www.wikidata.org/entity/Q1985727";

/// Decoded datavalue.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    String(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Monolingual(MonolingualText),
    Quantity(Quantity),
    Globe(GlobeCoordinate),
    Entity(Entity),
    Media(File),
}

impl DecodedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            DecodedValue::Entity(entity) => Some(entity),
            _ => None,
        }
    }
}

/// A decoding handler: session plus the whole datavalue payload.
pub type Handler = Box<dyn Fn(&Client, &Value) -> Result<DecodedValue, DecodeError>>;

/// Table-driven datavalue decoder.
pub struct Decoder {
    handlers: HashMap<String, Handler>,
}

fn normalize(name: &str) -> String {
    name.replace('-', "_")
}

impl Decoder {
    /// A decoder with every built-in handler registered.
    pub fn new() -> Self {
        let mut decoder = Self::empty();
        decoder
            .register("wikibase_entityid", wikibase_entityid)
            .register("string", string)
            .register("time", time)
            .register("monolingualtext", monolingualtext)
            .register("quantity__quantity", quantity)
            .register("globecoordinate", globecoordinate)
            .register("commonsMedia__string", commons_media);
        decoder
    }

    /// A decoder with no handlers at all.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Add or replace the handler for `name` (`{type}` or
    /// `{datatype}__{type}`).
    pub fn register<F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(&Client, &Value) -> Result<DecodedValue, DecodeError> + 'static,
    {
        self.handlers.insert(normalize(name), Box::new(handler));
        self
    }

    pub fn handles(&self, name: &str) -> bool {
        self.handlers.contains_key(&normalize(name))
    }

    pub fn decode(
        &self,
        client: &Client,
        datatype: &str,
        datavalue: &Value,
    ) -> Result<DecodedValue, DecodeError> {
        let Some(value_type) = datavalue.get("type") else {
            return Err(DecodeError::new("no \"type\" specified", datavalue.clone()));
        };
        let Some(value_type) = value_type.as_str() else {
            return Err(DecodeError::new("\"type\" is not a string", datavalue.clone()));
        };
        if datavalue.get("value").is_none() {
            return Err(DecodeError::new("no \"value\" field", datavalue.clone()));
        }
        let value_type = normalize(value_type);
        let composite = format!("{}__{}", normalize(datatype), value_type);
        let handler = self
            .handlers
            .get(&composite)
            .or_else(|| self.handlers.get(&value_type))
            .ok_or_else(|| {
                DecodeError::new(
                    format!("{value_type:?} is unsupported type"),
                    datavalue.clone(),
                )
            })?;
        handler(client, datavalue)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Decoder").field("handlers", &names).finish()
    }
}

// ============================================================================
// BUILT-IN HANDLERS
// ============================================================================

fn mapping<'a>(datavalue: &'a Value) -> Result<&'a Map<String, Value>, DecodeError> {
    match &datavalue["value"] {
        Value::Object(map) => Ok(map),
        other => Err(DecodeError::new(
            format!("expected a mapping, not {other}"),
            datavalue.clone(),
        )),
    }
}

fn field<'a>(
    map: &'a Map<String, Value>,
    name: &str,
    datavalue: &Value,
) -> Result<&'a Value, DecodeError> {
    map.get(name).ok_or_else(|| {
        DecodeError::new(format!("missing \"{name}\" field"), datavalue.clone())
    })
}

fn str_field<'a>(
    map: &'a Map<String, Value>,
    name: &str,
    datavalue: &Value,
) -> Result<&'a str, DecodeError> {
    field(map, name, datavalue)?.as_str().ok_or_else(|| {
        DecodeError::new(format!("\"{name}\" is not a string"), datavalue.clone())
    })
}

/// Numbers arrive either as JSON numbers or as signed decimal strings
/// (`"+610.13"`).
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn number_field(
    map: &Map<String, Value>,
    name: &str,
    datavalue: &Value,
) -> Result<f64, DecodeError> {
    number(field(map, name, datavalue)?).ok_or_else(|| {
        DecodeError::new(format!("\"{name}\" is not a number"), datavalue.clone())
    })
}

fn optional_number_field(
    map: &Map<String, Value>,
    name: &str,
    datavalue: &Value,
) -> Result<Option<f64>, DecodeError> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => number_field(map, name, datavalue).map(Some),
    }
}

fn entity_from_iri(
    client: &Client,
    iri: &str,
    name: &str,
    datavalue: &Value,
) -> Result<Entity, DecodeError> {
    EntityId::from_iri(iri)
        .map(|id| client.entity(id))
        .ok_or_else(|| {
            DecodeError::new(
                format!("{name} {iri:?} is not an entity IRI"),
                datavalue.clone(),
            )
        })
}

fn wikibase_entityid(client: &Client, datavalue: &Value) -> Result<DecodedValue, DecodeError> {
    let map = mapping(datavalue)?;
    let id = str_field(map, "id", datavalue)?;
    Ok(DecodedValue::Entity(client.entity(id)))
}

fn string(_client: &Client, datavalue: &Value) -> Result<DecodedValue, DecodeError> {
    datavalue["value"]
        .as_str()
        .map(|s| DecodedValue::String(s.to_string()))
        .ok_or_else(|| DecodeError::new("expected a string", datavalue.clone()))
}

fn time(_client: &Client, datavalue: &Value) -> Result<DecodedValue, DecodeError> {
    let map = mapping(datavalue)?;
    let err = |message: String| DecodeError::new(message, datavalue.clone());

    let calendar = field(map, "calendarmodel", datavalue)?;
    if calendar.as_str() != Some(GREGORIAN_CALENDAR) {
        return Err(err(format!(
            "{calendar} is unsupported calendarmodel for time datavalue"
        )));
    }
    let time = str_field(map, "time", datavalue)?;
    let Some(time) = time.strip_prefix('+') else {
        return Err(err(format!("{time:?}: only AD (CE) is supported")));
    };
    let timezone = field(map, "timezone", datavalue)?;
    if timezone.as_i64() != Some(0) {
        return Err(err(format!(
            "{timezone}: timezone other than 0 is unsupported"
        )));
    }
    let (Some(before), Some(after)) = (map.get("before"), map.get("after")) else {
        return Err(err("before/after field is missing".to_string()));
    };
    if before.as_i64() != Some(0) || after.as_i64() != Some(0) {
        return Err(err(
            "uncertainty range time (represented using before/after) is unsupported".to_string(),
        ));
    }
    let precision = field(map, "precision", datavalue)?;
    match precision.as_u64() {
        Some(11) => {
            let date = time.split('T').next().unwrap_or(time);
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map(DecodedValue::Date)
                .map_err(|e| err(format!("{time:?}: {e}")))
        }
        Some(14) => NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M:%SZ")
            .map(|dt| DecodedValue::DateTime(dt.and_utc()))
            .map_err(|e| err(format!("{time:?}: {e}"))),
        _ => Err(err(format!(
            "{precision}: time precision other than 11 or 14 is unsupported"
        ))),
    }
}

fn monolingualtext(_client: &Client, datavalue: &Value) -> Result<DecodedValue, DecodeError> {
    let map = mapping(datavalue)?;
    let text = str_field(map, "text", datavalue)?;
    let language = str_field(map, "language", datavalue)?;
    Ok(DecodedValue::Monolingual(MonolingualText::new(
        text,
        Locale::new(language),
    )))
}

fn quantity(client: &Client, datavalue: &Value) -> Result<DecodedValue, DecodeError> {
    let map = mapping(datavalue)?;
    let amount = number_field(map, "amount", datavalue)?;
    let lower_bound = optional_number_field(map, "lower_bound", datavalue)?;
    let upper_bound = optional_number_field(map, "upper_bound", datavalue)?;
    let unit = match map.get("unit") {
        None | Some(Value::Null) => None,
        Some(Value::String(unit)) if unit == "1" => None,
        Some(Value::String(iri)) => Some(entity_from_iri(client, iri, "unit", datavalue)?),
        Some(other) => {
            return Err(DecodeError::new(
                format!("unit {other} is neither \"1\" nor an entity IRI"),
                datavalue.clone(),
            ))
        }
    };
    Ok(DecodedValue::Quantity(Quantity::new(
        amount,
        lower_bound,
        upper_bound,
        unit,
    )))
}

fn globecoordinate(client: &Client, datavalue: &Value) -> Result<DecodedValue, DecodeError> {
    let map = mapping(datavalue)?;
    let latitude = number_field(map, "latitude", datavalue)?;
    let longitude = number_field(map, "longitude", datavalue)?;
    let precision = number_field(map, "precision", datavalue)?;
    let globe = str_field(map, "globe", datavalue)?;
    let globe = entity_from_iri(client, globe, "globe", datavalue)?;
    Ok(DecodedValue::Globe(GlobeCoordinate::new(
        latitude, longitude, globe, precision,
    )))
}

fn commons_media(client: &Client, datavalue: &Value) -> Result<DecodedValue, DecodeError> {
    let name = datavalue["value"]
        .as_str()
        .ok_or_else(|| DecodeError::new("expected a file name", datavalue.clone()))?;
    Ok(DecodedValue::Media(File::new(
        client.clone(),
        format!("File:{name}"),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Transport, TransportResponse};
    use serde_json::json;
    use url::Url;
    use wikigraph_core::TransportError;

    struct Offline;

    impl Transport for Offline {
        fn fetch(&self, url: &Url) -> Result<TransportResponse, TransportError> {
            Err(TransportError::Connection {
                url: url.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    fn client() -> Client {
        Client::builder().transport(Offline).build().unwrap()
    }

    #[test]
    fn test_builtin_names() {
        let d = Decoder::new();
        for name in [
            "wikibase-entityid",
            "string",
            "time",
            "monolingualtext",
            "quantity__quantity",
            "globecoordinate",
            "commonsMedia__string",
        ] {
            assert!(d.handles(name), "{name}");
        }
        assert!(!d.handles("quantity"));
        assert!(!Decoder::empty().handles("string"));
    }

    #[test]
    fn test_missing_type_and_value() {
        let c = client();
        let err = c.decode_datavalue("string", &json!({"value": "..."})).unwrap_err();
        assert_eq!(err.message(), "no \"type\" specified");
        let err = c.decode_datavalue("string", &json!({"type": "string"})).unwrap_err();
        assert_eq!(err.message(), "no \"value\" field");
        assert_eq!(err.datavalue(), &json!({"type": "string"}));
    }

    #[test]
    fn test_unsupported_type() {
        let c = client();
        let payload = json!({"type": "unsupport", "value": "..."});
        assert!(c.decode_datavalue("unsupportedtype", &payload).is_err());
        let err = c.decode_datavalue("string", &payload).unwrap_err();
        assert_eq!(err.datavalue(), &payload);
    }

    #[test]
    fn test_quantity_needs_quantity_datatype() {
        let c = client();
        let payload = json!({"type": "quantity", "value": {"amount": "+1", "unit": "1"}});
        assert!(c.decode_datavalue("quantity", &payload).is_ok());
        assert!(c.decode_datavalue("string", &payload).is_err());
    }

    #[test]
    fn test_number_accepts_signed_strings() {
        assert_eq!(number(&json!("+610.13")), Some(610.13));
        assert_eq!(number(&json!("-3")), Some(-3.0));
        assert_eq!(number(&json!(12)), Some(12.0));
        assert_eq!(number(&json!("abc")), None);
        assert_eq!(number(&json!(null)), None);
    }

    #[test]
    fn test_decode_error_display_leads_with_type() {
        let c = client();
        let err = c
            .decode_datavalue("string", &json!({"value": {"x": 1}, "type": "bogus"}))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#""bogus" is unsupported type: {"type": "bogus", "value": {"x":1}}"#
        );
    }
}
