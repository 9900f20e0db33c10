//! Property-based tests for wire messages
//!
//! Tests that messages survive the JSON codec unchanged and that taxonomy
//! compression followed by expansion keeps every field reachable.

use proptest::prelude::*;
use std::sync::Arc;
use wiregen_core::WireKey;
use wiregen_transport::{Codec, JsonCodec, Taxonomy, WireMessage, WireValue};

// Strategy: scalar wire values (doubles with short exact decimals, JSON has no NaN)
fn arb_scalar() -> impl Strategy<Value = WireValue> {
    prop_oneof![
        Just(WireValue::Indicator),
        any::<bool>().prop_map(WireValue::Bool),
        any::<i8>().prop_map(WireValue::Byte),
        any::<i16>().prop_map(WireValue::Short),
        any::<i32>().prop_map(WireValue::Int),
        any::<i64>().prop_map(WireValue::Long),
        (-1_000_000i32..1_000_000).prop_map(|v| WireValue::Double(f64::from(v) / 4.0)),
        ".{0,16}".prop_map(WireValue::String),
        prop::collection::vec(any::<i32>(), 0..8).prop_map(WireValue::IntArray),
    ]
}

fn arb_field_name() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9_]{0,11}"
}

fn arb_message() -> impl Strategy<Value = WireMessage> {
    let leaf = prop::collection::vec((arb_field_name(), arb_scalar()), 0..6).prop_map(|fields| {
        let mut msg = WireMessage::new();
        for (name, value) in fields {
            msg.add_named(name, value);
        }
        msg
    });
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            prop::collection::vec((arb_field_name(), arb_scalar()), 0..4),
            prop::collection::vec(inner, 0..3),
        )
            .prop_map(|(fields, children)| {
                let mut msg = WireMessage::new();
                for (name, value) in fields {
                    msg.add_named(name, value);
                }
                for child in children {
                    msg.push(WireValue::Message(child));
                }
                msg
            })
    })
}

proptest! {
    /// Property: the JSON codec is lossless
    #[test]
    fn proptest_json_codec_roundtrip(message in arb_message()) {
        let codec = JsonCodec::new();

        let bytes = codec.encode(&message).expect("encoding should succeed");
        let decoded = codec.decode(&bytes).expect("decoding should succeed");

        prop_assert_eq!(decoded, message);
    }

    /// Property: every named field is still found by name after compression
    #[test]
    fn proptest_taxonomy_keeps_names_reachable(
        message in arb_message(),
        names in prop::collection::btree_set(arb_field_name(), 0..6)
    ) {
        let taxonomy = Taxonomy::new(names.iter().enumerate().map(|(i, n)| (i as i16 + 1, n.clone())));
        let codec = JsonCodec::new().with_taxonomy(Arc::new(taxonomy));

        let decoded = codec.decode(&codec.encode(&message).expect("encode")).expect("decode");

        prop_assert_eq!(decoded.len(), message.len());
        for field in message.iter() {
            if let Some(name) = &field.name {
                prop_assert!(decoded.by_key(&WireKey::Name(name.clone())).is_some());
            }
        }
    }
}
