#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

fn sample() -> WireMessage {
    let mut msg = WireMessage::new();
    msg.add_ordinal(HEADER_ORDINAL, WireValue::String("org.example.Derived".into()));
    msg.add_ordinal(HEADER_ORDINAL, WireValue::String("org.example.Middle".into()));
    msg.add_ordinal(1, WireValue::Int(3));
    msg.add_named("tags", WireValue::String("a".into()));
    msg.add_named("tags", WireValue::String("b".into()));
    msg
}

// WireMessage tests

#[test]
fn WireMessage___by_key___returns_first_match() {
    let msg = sample();

    assert_eq!(msg.by_key(&WireKey::Ordinal(1)), Some(&WireValue::Int(3)));
    assert_eq!(
        msg.by_key(&WireKey::Name("tags".into())),
        Some(&WireValue::String("a".into()))
    );
    assert_eq!(msg.by_key(&WireKey::Ordinal(9)), None);
}

#[test]
fn WireMessage___all_by_key___preserves_wire_order() {
    let msg = sample();

    let tags = msg.all_by_key(&WireKey::Name("tags".into()));

    assert_eq!(
        tags,
        vec![
            &WireValue::String("a".into()),
            &WireValue::String("b".into())
        ]
    );
}

#[test]
fn WireMessage___header_names___most_derived_first() {
    let msg = sample();

    assert_eq!(
        msg.header_names(),
        vec!["org.example.Derived", "org.example.Middle"]
    );
}

#[test]
fn WireMessage___push___adds_untagged_entries() {
    let mut msg = WireMessage::new();

    msg.push(WireValue::Int(1));
    msg.push(WireValue::Indicator);

    assert_eq!(msg.len(), 2);
    assert!(msg.iter().all(|f| f.name.is_none() && f.ordinal.is_none()));
    assert_eq!(msg.values().nth(1), Some(&WireValue::Indicator));
}

#[test]
fn WireMessage___by_name___ignores_ordinal_only_fields() {
    let msg = sample();

    assert!(msg.by_name("1").is_none());
    assert!(msg.by_name("tags").is_some());
}

// WireValue tests

#[test_case(WireValue::Byte(-3), Some(-3) ; "byte")]
#[test_case(WireValue::Short(300), Some(300) ; "short")]
#[test_case(WireValue::Int(-70000), Some(-70000) ; "int")]
#[test_case(WireValue::Long(1 << 40), Some(1 << 40) ; "long")]
#[test_case(WireValue::Double(1.0), None ; "double is not integral")]
#[test_case(WireValue::String("1".into()), None ; "string")]
fn WireValue___as_i64___widens_integral_values(value: WireValue, expected: Option<i64>) {
    assert_eq!(value.as_i64(), expected);
}

#[test]
fn WireValue___wire_type___matches_variant() {
    assert_eq!(WireValue::Indicator.wire_type(), WireType::Indicator);
    assert_eq!(WireValue::IntArray(vec![]).wire_type(), WireType::IntArray);
    assert_eq!(
        WireValue::Message(WireMessage::new()).wire_type(),
        WireType::SubMessage
    );
}
