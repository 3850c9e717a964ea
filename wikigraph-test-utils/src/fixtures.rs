//! Entity and media documents shaped like the service's JSON output.
//!
//! Documents are trimmed to the fields the client reads.

use serde_json::{json, Map, Value};

pub const BEATLES: &str = "Q1299";
pub const SHIN_JUNG_HYEON: &str = "Q494290";
pub const CHAVACANO: &str = "Q33281";
pub const HONG_KONG: &str = "Q8646";
/// Redirects to [`REDIRECT_CANONICAL`].
pub const REDIRECT_ALIAS: &str = "Q16231742";
pub const REDIRECT_CANONICAL: &str = "Q3571994";

pub const SINGER: &str = "Q177220";
pub const SONGWRITER: &str = "Q753110";
pub const CENTIMETRE: &str = "Q174728";
pub const EARTH: &str = "Q2";

pub const INSTANCE_OF: &str = "P31";
pub const OCCUPATION: &str = "P106";
pub const IMAGE: &str = "P18";
pub const MUSICBRAINZ_ARTIST_ID: &str = "P434";
pub const DATE_OF_BIRTH: &str = "P569";
pub const INSTRUMENT: &str = "P1303";
pub const HEIGHT: &str = "P2048";
pub const NATIVE_LABEL: &str = "P1705";
pub const LOCATOR_MAP_IMAGE: &str = "P242";
pub const COORDINATE_LOCATION: &str = "P625";
/// A property no fixture item has claims for.
pub const INSTAGRAM_USERNAME: &str = "P2003";

pub const BUDDHA_FILE: &str = "File:Gandhara Buddha (tnm).jpeg";

// ============================================================================
// BUILDERS
// ============================================================================

fn terms(pairs: &[(&str, &str)]) -> Value {
    let map: Map<String, Value> = pairs
        .iter()
        .map(|(lang, value)| {
            (
                lang.to_string(),
                json!({"language": lang, "value": value}),
            )
        })
        .collect();
    Value::Object(map)
}

/// `{"entities": {id: data}}`
pub fn document(id: &str, data: Value) -> Value {
    json!({"entities": {id: data}})
}

pub fn item(
    id: &str,
    labels: &[(&str, &str)],
    descriptions: &[(&str, &str)],
    claims: Value,
) -> Value {
    json!({
        "type": "item",
        "id": id,
        "title": id,
        "labels": terms(labels),
        "descriptions": terms(descriptions),
        "aliases": {},
        "claims": claims,
        "sitelinks": {},
    })
}

pub fn property(id: &str, datatype: &str, label: &str) -> Value {
    json!({
        "type": "property",
        "id": id,
        "title": format!("Property:{id}"),
        "datatype": datatype,
        "labels": terms(&[("en", label)]),
        "descriptions": {},
        "aliases": {},
        "claims": {},
    })
}

pub fn claim(property: &str, datatype: &str, datavalue: Value, rank: &str) -> Value {
    json!({
        "mainsnak": {
            "snaktype": "value",
            "property": property,
            "datatype": datatype,
            "datavalue": datavalue,
        },
        "type": "statement",
        "rank": rank,
    })
}

/// A claim whose snak is `novalue` or `somevalue`.
pub fn valueless_claim(property: &str, datatype: &str, snaktype: &str, rank: &str) -> Value {
    json!({
        "mainsnak": {
            "snaktype": snaktype,
            "property": property,
            "datatype": datatype,
        },
        "type": "statement",
        "rank": rank,
    })
}

pub fn entity_value(id: &str) -> Value {
    let numeric: u64 = id[1..].parse().unwrap_or_default();
    json!({
        "type": "wikibase-entityid",
        "value": {"entity-type": "item", "numeric-id": numeric, "id": id},
    })
}

pub fn string_value(value: &str) -> Value {
    json!({"type": "string", "value": value})
}

pub fn time_value(time: &str, precision: u64) -> Value {
    json!({
        "type": "time",
        "value": {
            "time": time,
            "timezone": 0,
            "before": 0,
            "after": 0,
            "precision": precision,
            "calendarmodel": "http://www.wikidata.org/entity/Q1985727",
        },
    })
}

fn item_claim(property: &str, target: &str, rank: &str) -> Value {
    claim(property, "wikibase-item", entity_value(target), rank)
}

// ============================================================================
// ENTITIES
// ============================================================================

pub fn beatles() -> Value {
    item(
        BEATLES,
        &[("en", "The Beatles"), ("ko", "비틀즈"), ("ja", "ビートルズ")],
        &[("en", "English rock band"), ("ko", "영국의 락 밴드")],
        json!({
            INSTANCE_OF: [item_claim(INSTANCE_OF, "Q215380", "normal")],
            IMAGE: [claim(IMAGE, "commonsMedia", string_value("The Fabs.JPG"), "normal")],
            MUSICBRAINZ_ARTIST_ID: [claim(
                MUSICBRAINZ_ARTIST_ID,
                "external-id",
                string_value("b10bbbfc-cf9e-42e0-be17-e2c3e1d2600d"),
                "normal",
            )],
        }),
    )
}

pub fn shin_jung_hyeon() -> Value {
    item(
        SHIN_JUNG_HYEON,
        &[("en", "Shin Jung-hyeon"), ("ko", "신중현"), ("zh-hant", "申重鉉")],
        &[
            ("ko", "대한민국의 록 음악 싱어송라이터 및 기타리스트"),
            ("ja", "韓国のロックミュージシャン"),
        ],
        json!({
            OCCUPATION: [
                item_claim(OCCUPATION, SINGER, "normal"),
                item_claim(OCCUPATION, SONGWRITER, "normal"),
            ],
            MUSICBRAINZ_ARTIST_ID: [claim(
                MUSICBRAINZ_ARTIST_ID,
                "external-id",
                string_value("3eb63662-a02c-4d2d-9544-845cd92fd4e7"),
                "normal",
            )],
            DATE_OF_BIRTH: [claim(
                DATE_OF_BIRTH,
                "time",
                time_value("+1938-01-04T00:00:00Z", 11),
                "normal",
            )],
            INSTRUMENT: [
                item_claim(INSTRUMENT, "Q6607", "deprecated"),
                valueless_claim(INSTRUMENT, "wikibase-item", "novalue", "preferred"),
                item_claim(INSTRUMENT, "Q17172850", "preferred"),
                item_claim(INSTRUMENT, "Q5994", "normal"),
                valueless_claim(INSTRUMENT, "wikibase-item", "somevalue", "normal"),
                item_claim(INSTRUMENT, "Q46185", "preferred"),
            ],
            HEIGHT: [claim(
                HEIGHT,
                "quantity",
                json!({
                    "type": "quantity",
                    "value": {
                        "amount": "+172",
                        "lower_bound": "+171",
                        "upper_bound": "+173",
                        "unit": format!("http://www.wikidata.org/entity/{CENTIMETRE}"),
                    },
                }),
                "normal",
            )],
            NATIVE_LABEL: [claim(
                NATIVE_LABEL,
                "monolingualtext",
                json!({
                    "type": "monolingualtext",
                    "value": {"text": "신중현", "language": "ko"},
                }),
                "normal",
            )],
        }),
    )
}

pub fn chavacano() -> Value {
    item(
        CHAVACANO,
        &[
            ("en", "Chavacano"),
            ("ko", "차바카노어"),
            ("cbk-zam", "Chavacano de Zamboanga"),
        ],
        &[
            ("en", "Spanish-based creole language spoken in the Philippines"),
            ("cbk-zam", "idioma criollo de Filipinas"),
        ],
        json!({}),
    )
}

pub fn hong_kong() -> Value {
    item(
        HONG_KONG,
        &[("en", "Hong Kong"), ("zh-hant", "香港")],
        &[("en", "special administrative region of China")],
        json!({
            LOCATOR_MAP_IMAGE: [
                claim(
                    LOCATOR_MAP_IMAGE,
                    "commonsMedia",
                    string_value("Hong Kong in China (zoomed) (+all claims hatched).svg"),
                    "normal",
                ),
                valueless_claim(LOCATOR_MAP_IMAGE, "commonsMedia", "novalue", "normal"),
                claim(
                    LOCATOR_MAP_IMAGE,
                    "commonsMedia",
                    string_value("Hong Kong location map.svg"),
                    "normal",
                ),
            ],
            COORDINATE_LOCATION: [claim(
                COORDINATE_LOCATION,
                "globe-coordinate",
                json!({
                    "type": "globecoordinate",
                    "value": {
                        "latitude": 22.3,
                        "longitude": 114.2,
                        "altitude": null,
                        "precision": 0.1,
                        "globe": format!("http://www.wikidata.org/entity/{EARTH}"),
                    },
                }),
                "normal",
            )],
        }),
    )
}

pub fn redirect_canonical() -> Value {
    item(
        REDIRECT_CANONICAL,
        &[("en", "Bokeh")],
        &[("en", "aesthetic quality of the blur in out-of-focus parts of an image")],
        json!({}),
    )
}

pub fn properties() -> Vec<Value> {
    vec![
        property(INSTANCE_OF, "wikibase-item", "instance of"),
        property(OCCUPATION, "wikibase-item", "occupation"),
        property(IMAGE, "commonsMedia", "image"),
        property(MUSICBRAINZ_ARTIST_ID, "external-id", "MusicBrainz artist ID"),
        property(DATE_OF_BIRTH, "time", "date of birth"),
        property(INSTRUMENT, "wikibase-item", "instrument"),
        property(HEIGHT, "quantity", "height"),
        property(NATIVE_LABEL, "monolingualtext", "native label"),
        property(LOCATOR_MAP_IMAGE, "commonsMedia", "locator map image"),
        property(COORDINATE_LOCATION, "globe-coordinate", "coordinate location"),
        property(INSTAGRAM_USERNAME, "external-id", "Instagram username"),
    ]
}

/// Every entity record served under its own id.
pub fn entities() -> Vec<Value> {
    let mut all = vec![
        beatles(),
        shin_jung_hyeon(),
        chavacano(),
        hong_kong(),
        redirect_canonical(),
    ];
    all.extend(properties());
    all
}

/// `(alias id, canonical record)` pairs.
pub fn redirects() -> Vec<(&'static str, Value)> {
    vec![(REDIRECT_ALIAS, redirect_canonical())]
}

// ============================================================================
// MEDIA
// ============================================================================

pub fn buddha_file_page() -> Value {
    json!({
        "pageid": 47234532,
        "ns": 6,
        "title": BUDDHA_FILE,
        "contentmodel": "wikitext",
        "pagelanguage": "en",
        "imagerepository": "shared",
        "canonicalurl": "https://www.wikidata.org/wiki/File:Gandhara_Buddha_(tnm).jpeg",
        "fullurl": "https://www.wikidata.org/wiki/File:Gandhara_Buddha_(tnm).jpeg",
        "imageinfo": [{
            "size": 823440,
            "width": 1746,
            "height": 2894,
            "url": "https://upload.wikimedia.org/wikipedia/commons/b/b8/Gandhara_Buddha_%28tnm%29.jpeg",
            "descriptionurl": "https://commons.wikimedia.org/wiki/File:Gandhara_Buddha_(tnm).jpeg",
            "mime": "image/jpeg",
        }],
    })
}

/// `api.php` answer wrapping one page record.
pub fn media_document(page: Value) -> Value {
    json!({"batchcomplete": "", "query": {"pages": {"-1": page}}})
}

/// `api.php` answer for a title that does not exist.
pub fn missing_media_document(title: &str) -> Value {
    media_document(json!({
        "ns": 6,
        "title": title,
        "missing": "",
        "imagerepository": "",
    }))
}

/// `(title, api.php answer)` pairs.
pub fn media() -> Vec<(&'static str, Value)> {
    vec![(BUDDHA_FILE, media_document(buddha_file_page()))]
}
