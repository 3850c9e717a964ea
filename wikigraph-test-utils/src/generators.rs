//! Proptest strategies for ids and claim lists.

use proptest::prelude::*;
use serde_json::Value;

use crate::fixtures;

pub fn arb_item_id() -> impl Strategy<Value = String> {
    "Q[1-9][0-9]{0,7}"
}

pub fn arb_property_id() -> impl Strategy<Value = String> {
    "P[1-9][0-9]{0,4}"
}

pub fn arb_rank() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("preferred"), Just("normal"), Just("deprecated")]
}

pub fn arb_snaktype() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        6 => Just("value"),
        1 => Just("novalue"),
        1 => Just("somevalue"),
    ]
}

/// String claims for `property`. Value snaks carry `"v{index}"`, their
/// position in the generated list.
pub fn arb_string_claims(property: String) -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec((arb_rank(), arb_snaktype()), 0..12).prop_map(move |specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(index, (rank, snaktype))| match snaktype {
                "value" => fixtures::claim(
                    &property,
                    "string",
                    fixtures::string_value(&format!("v{index}")),
                    rank,
                ),
                other => fixtures::valueless_claim(&property, "string", other, rank),
            })
            .collect()
    })
}
