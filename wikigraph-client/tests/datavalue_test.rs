//! Datavalue decoding through a session.

use std::rc::Rc;

use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};
use wikigraph_client::{Client, DecodedValue, Decoder, GlobeCoordinate, Quantity};
use wikigraph_core::{Locale, MonolingualText};
use wikigraph_test_utils::fixtures::{self, *};
use wikigraph_test_utils::{fixture_client, FixtureTransport};

fn client() -> Client {
    fixture_client(&Rc::new(FixtureTransport::new()))
}

fn time_payload(time: &str, precision: u64) -> Value {
    fixtures::time_value(time, precision)
}

fn with_field(mut payload: Value, field: &str, value: Value) -> Value {
    payload["value"][field] = value;
    payload
}

fn without_field(mut payload: Value, field: &str) -> Value {
    if let Some(map) = payload["value"].as_object_mut() {
        map.remove(field);
    }
    payload
}

#[test]
fn test_wikibase_entityid() {
    let c = client();
    let payload = fixtures::entity_value(SINGER);
    for datatype in ["string", "wikibase-item"] {
        let decoded = c.decode_datavalue(datatype, &payload).unwrap();
        let entity = decoded.as_entity().unwrap();
        assert!(entity.ptr_eq(&c.entity(SINGER)));
    }

    let not_mapping = json!({"type": "wikibase-entityid", "value": "Q1"});
    assert!(c.decode_datavalue("wikibase-item", &not_mapping).is_err());
    let no_id = json!({"type": "wikibase-entityid", "value": {"numeric-id": 1}});
    assert!(c.decode_datavalue("wikibase-item", &no_id).is_err());
}

#[test]
fn test_string() {
    let c = client();
    let payload = fixtures::string_value("foobar");
    for datatype in ["string", "external-id"] {
        assert_eq!(
            c.decode_datavalue(datatype, &payload).unwrap(),
            DecodedValue::String("foobar".to_string())
        );
    }
    let not_string = json!({"type": "string", "value": 42});
    assert!(c.decode_datavalue("string", &not_string).is_err());
}

#[test]
fn test_time() {
    let c = client();
    for datatype in ["time", "string"] {
        let date = time_payload("+2017-02-22T00:00:00Z", 11);
        assert_eq!(
            c.decode_datavalue(datatype, &date).unwrap(),
            DecodedValue::Date(NaiveDate::from_ymd_opt(2017, 2, 22).unwrap())
        );

        let datetime = time_payload("+2017-02-22T02:53:12Z", 14);
        assert_eq!(
            c.decode_datavalue(datatype, &datetime).unwrap(),
            DecodedValue::DateTime(Utc.with_ymd_and_hms(2017, 2, 22, 2, 53, 12).unwrap())
        );

        let year = time_payload("+2017-00-00T00:00:00Z", 9);
        assert!(c.decode_datavalue(datatype, &year).is_err());
    }
}

#[test]
fn test_time_rejects_unsupported_shapes() {
    let c = client();
    let base = time_payload("+2017-02-22T02:53:12Z", 14);

    let julian = with_field(
        base.clone(),
        "calendarmodel",
        json!("http://www.wikidata.org/entity/Q1985786"),
    );
    let err = c.decode_datavalue("time", &julian).unwrap_err();
    assert!(err.message().contains("calendarmodel"));

    for field in ["calendarmodel", "time", "timezone", "precision"] {
        let missing = without_field(base.clone(), field);
        assert!(c.decode_datavalue("time", &missing).is_err(), "{field}");
    }
    for field in ["before", "after"] {
        let missing = without_field(base.clone(), field);
        let err = c.decode_datavalue("time", &missing).unwrap_err();
        assert_eq!(err.message(), "before/after field is missing");
    }

    let bc = with_field(base.clone(), "time", json!("-2017-02-22T02:53:12Z"));
    assert!(c.decode_datavalue("time", &bc).is_err());

    let offset = with_field(base.clone(), "timezone", json!(60));
    assert!(c.decode_datavalue("time", &offset).is_err());

    for field in ["before", "after"] {
        let uncertain = with_field(base.clone(), field, json!(1));
        assert!(c.decode_datavalue("time", &uncertain).is_err(), "{field}");
    }

    for precision in (1..=14).filter(|p| *p != 11 && *p != 14) {
        let payload = time_payload("+2017-02-22T02:53:12Z", precision);
        assert!(c.decode_datavalue("time", &payload).is_err(), "{precision}");
    }
}

#[test]
fn test_monolingualtext() {
    let c = client();
    let payload = json!({
        "type": "monolingualtext",
        "value": {"text": "신중현", "language": "ko"},
    });
    for datatype in ["monolingualtext", "string"] {
        assert_eq!(
            c.decode_datavalue(datatype, &payload).unwrap(),
            DecodedValue::Monolingual(MonolingualText::new("신중현", Locale::new("ko")))
        );
    }
}

#[test]
fn test_commons_media() {
    let c = client();
    let payload = fixtures::string_value("The Fabs.JPG");
    let DecodedValue::Media(file) = c.decode_datavalue("commonsMedia", &payload).unwrap() else {
        panic!("expected a media file");
    };
    assert_eq!(file.title(), "File:The Fabs.JPG");
    // Decoding alone does not touch the network.
    assert!(file.data().is_none());

    // Without the composite datatype the payload is a plain string.
    assert_eq!(
        c.decode_datavalue("string", &payload).unwrap(),
        DecodedValue::String("The Fabs.JPG".to_string())
    );
}

#[test]
fn test_quantity() {
    let c = client();
    let with_unit = json!({
        "type": "quantity",
        "value": {
            "amount": "+610.13",
            "lower_bound": "+610.12",
            "upper_bound": "+610.14",
            "unit": format!("http://www.wikidata.org/entity/{CENTIMETRE}"),
        },
    });
    assert_eq!(
        c.decode_datavalue("quantity", &with_unit).unwrap(),
        DecodedValue::Quantity(Quantity::new(
            610.13,
            Some(610.12),
            Some(610.14),
            Some(c.entity(CENTIMETRE)),
        ))
    );

    let unitless = json!({
        "type": "quantity",
        "value": {"amount": "+12", "unit": "1"},
    });
    let DecodedValue::Quantity(quantity) = c.decode_datavalue("quantity", &unitless).unwrap()
    else {
        panic!("expected a quantity");
    };
    assert!(quantity.is_unitless());
    assert_eq!(quantity.amount, 12.0);
    assert_eq!(quantity.lower_bound, None);
    assert_eq!(quantity.upper_bound, None);
}

#[test]
fn test_globecoordinate() {
    let c = client();
    let payload = json!({
        "type": "globecoordinate",
        "value": {
            "latitude": 70.1525,
            "longitude": 70.1525,
            "altitude": null,
            "precision": 0.0002777777777777778,
            "globe": "http://www.wikidata.org/entity/Q111",
        },
    });
    assert_eq!(
        c.decode_datavalue("globe-coordinate", &payload).unwrap(),
        DecodedValue::Globe(GlobeCoordinate::new(
            70.1525,
            70.1525,
            c.entity("Q111"),
            0.0002777777777777778,
        ))
    );

    let bad_globe = with_field(payload, "globe", json!("not an iri"));
    assert!(c.decode_datavalue("globe-coordinate", &bad_globe).is_err());
}

#[test]
fn test_composite_handler_takes_precedence() {
    let mut decoder = Decoder::new();
    decoder.register("string__wikibase-entityid", |_client, datavalue| {
        Ok(DecodedValue::String(
            datavalue["value"]["id"].as_str().unwrap_or_default().to_string(),
        ))
    });
    let transport = Rc::new(FixtureTransport::new());
    let c = Client::builder()
        .transport(Rc::clone(&transport))
        .decoder(decoder)
        .build()
        .unwrap();

    let payload = fixtures::entity_value(SINGER);
    assert_eq!(
        c.decode_datavalue("string", &payload).unwrap(),
        DecodedValue::String(SINGER.to_string())
    );
    assert!(c
        .decode_datavalue("wikibase-item", &payload)
        .unwrap()
        .as_entity()
        .is_some());
}

#[test]
fn test_claim_values_decode_by_property_datatype() {
    let c = client();
    let person = c.entity(SHIN_JUNG_HYEON);

    assert_eq!(
        person.get(&c.entity(DATE_OF_BIRTH)).unwrap(),
        DecodedValue::Date(NaiveDate::from_ymd_opt(1938, 1, 4).unwrap())
    );

    let DecodedValue::Quantity(height) = person.get(&c.entity(HEIGHT)).unwrap() else {
        panic!("expected a quantity");
    };
    assert_eq!(height.amount, 172.0);
    assert_eq!(height.lower_bound, Some(171.0));
    assert_eq!(height.upper_bound, Some(173.0));
    assert!(height.unit.unwrap().ptr_eq(&c.entity(CENTIMETRE)));

    assert_eq!(
        person.get(&c.entity(NATIVE_LABEL)).unwrap(),
        DecodedValue::Monolingual(MonolingualText::new("신중현", "ko"))
    );

    let hong_kong = c.entity(HONG_KONG);
    let DecodedValue::Globe(location) = hong_kong.get(&c.entity(COORDINATE_LOCATION)).unwrap()
    else {
        panic!("expected a coordinate");
    };
    assert_eq!(location.latitude, 22.3);
    assert_eq!(location.longitude, 114.2);
    assert!(location.globe.ptr_eq(&c.entity(EARTH)));

    let beatles = c.entity(BEATLES);
    let DecodedValue::Media(image) = beatles.get(&c.entity(IMAGE)).unwrap() else {
        panic!("expected a media file");
    };
    assert_eq!(image.title(), "File:The Fabs.JPG");
}
