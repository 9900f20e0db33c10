#![allow(non_snake_case)]

use super::*;
use crate::context::PassThroughConverter;
use crate::fixtures::{CATALOGUE, runtime};
use crate::value::ExternalValue;
use wiregen_core::WireKey;

const NS: &str = "org.example.runtime";

fn token(name: &str) -> String {
    format!("{NS}.{name}")
}

fn point(runtime: &Runtime, x: i32, y: i32) -> ObjectRef {
    runtime
        .construct("Point", vec![Value::Int(x), Value::Int(y)])
        .unwrap()
}

fn square(runtime: &Runtime) -> ObjectRef {
    runtime
        .construct("Square", vec![Value::from("sq"), Value::Double(2.0)])
        .unwrap()
}

fn decode_error(result: RuntimeResult<ObjectRef>) -> DecodeError {
    match result {
        Err(RuntimeError::Decode(e)) => e,
        other => panic!("expected a decode error, got {other:?}"),
    }
}

// ============================================================================
// Encode
// ============================================================================

#[test]
fn Runtime___to_wire___writes_fields_under_ordinals() {
    let runtime = runtime(CATALOGUE);

    let wire = runtime.to_wire(&point(&runtime, 3, 4)).unwrap();

    assert_eq!(wire.len(), 2);
    assert_eq!(wire.by_ordinal(1), Some(&WireValue::Int(3)));
    assert_eq!(wire.by_ordinal(2), Some(&WireValue::Int(4)));
    assert!(wire.header_names().is_empty());
}

#[test]
fn Runtime___to_wire___subclass_writes_header_and_derived_fields_first() {
    let runtime = runtime(CATALOGUE);
    let derived = runtime
        .construct("Derived", vec![Value::Int(7), Value::enum_label("RED")])
        .unwrap();

    let wire = runtime.to_wire(&derived).unwrap();

    assert_eq!(
        wire.header_names(),
        vec![token("Derived").as_str(), token("Base").as_str()]
    );
    assert_eq!(wire.all_by_key(&WireKey::Name("count".into())).len(), 1);
    assert_eq!(wire.by_name("colour"), Some(&WireValue::Int(1)));
}

#[test]
fn Runtime___to_wire___indicator_written_only_when_set() {
    let runtime = runtime(CATALOGUE);
    let plain = runtime.builder("Sample").unwrap().set("name", "s").build().unwrap();
    let urgent = runtime
        .builder("Sample")
        .unwrap()
        .set("name", "s")
        .set("urgent", true)
        .build()
        .unwrap();

    let plain = runtime.to_wire(&plain).unwrap();
    let urgent = runtime.to_wire(&urgent).unwrap();

    assert_eq!(plain.by_name("urgent"), None);
    assert_eq!(urgent.by_name("urgent"), Some(&WireValue::Indicator));
    assert_eq!(plain.by_name("count"), Some(&WireValue::Int(5)));
}

#[test]
fn Runtime___to_wire___repeated_field_one_entry_per_value() {
    let runtime = runtime(CATALOGUE);
    let bag = runtime
        .construct("Bag", vec![Value::list(["a", "b"])])
        .unwrap();

    let wire = runtime.to_wire(&bag).unwrap();

    let items: Vec<_> = wire
        .all_by_key(&WireKey::Name("items".into()))
        .into_iter()
        .filter_map(WireValue::as_str)
        .collect();
    assert_eq!(items, vec!["a", "b"]);
}

#[test]
fn Runtime___to_wire___primitive_array_as_typed_value() {
    let runtime = runtime(CATALOGUE);
    let triangle = runtime
        .construct(
            "Triangle",
            vec![Value::array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])],
        )
        .unwrap();

    let wire = runtime.to_wire(&triangle).unwrap();

    assert_eq!(
        wire.by_name("corners"),
        Some(&WireValue::IntArray(vec![1, 2, 3]))
    );
}

#[test]
fn Runtime___to_wire___sub_message_header_stops_at_declared_type() {
    let runtime = runtime(CATALOGUE);
    let painted = runtime
        .construct(
            "Painted",
            vec![Value::enum_label("GREEN"), Value::Object(square(&runtime))],
        )
        .unwrap();

    let wire = runtime.to_wire(&painted).unwrap();

    let outline = wire.by_name("outline").and_then(WireValue::as_message).unwrap();
    assert_eq!(
        outline.header_names(),
        vec![token("Square").as_str(), token("Shape").as_str()]
    );
    assert_eq!(outline.by_name("side"), Some(&WireValue::Double(2.0)));
}

#[test]
fn Runtime___to_wire___external_reference_needs_context() {
    let runtime = runtime(CATALOGUE);
    let opaque = ExternalValue::new(token("Opaque"), WireValue::Message(WireMessage::new()));
    let holder = runtime
        .construct("Holder", vec![Value::External(opaque)])
        .unwrap();

    let err = runtime.to_wire(&holder).unwrap_err();

    assert_eq!(
        err,
        RuntimeError::ContextRequired {
            message: "Holder".to_string()
        }
    );
    assert_eq!(err.error_code(), 203);
}

// ============================================================================
// Decode
// ============================================================================

#[test]
fn Runtime___from_wire___round_trips_point() {
    let runtime = runtime(CATALOGUE);
    let original = point(&runtime, 3, 4);

    let wire = runtime.to_wire(&original).unwrap();
    let decoded = runtime.from_wire("Point", &wire).unwrap();

    assert!(runtime.equals(&original, &decoded));
}

#[test]
fn Runtime___from_wire___missing_required_field_names_it() {
    let runtime = runtime(CATALOGUE);
    let mut wire = WireMessage::new();
    wire.add_ordinal(1, WireValue::Int(3));

    let err = decode_error(runtime.from_wire("Point", &wire));

    assert_eq!(err.field(), Some("y"));
    assert_eq!(
        err.to_string(),
        "Fudge message is not a Point - field 'y' is not present"
    );
}

const LATE_REQUIRED: &str = r#"
namespace = "org.example.late"

[[messages]]
name = "Reading"

[[messages.fields]]
name = "note"
type = "int"

[[messages.fields]]
name = "id"
type = "long"
required = true
"#;

#[test]
fn Runtime___from_wire___missing_required_reported_before_bad_optional() {
    let runtime = runtime(LATE_REQUIRED);
    let mut wire = WireMessage::new();
    wire.add_named("note", WireValue::String("x".into()));

    let err = decode_error(runtime.from_wire("Reading", &wire));

    assert_eq!(err.field(), Some("id"));
    assert!(matches!(
        err,
        DecodeError::Field {
            fault: FieldFault::Missing,
            ..
        }
    ));
}

#[test]
fn Runtime___from_wire___late_required_field_keeps_declared_slot_order() {
    let runtime = runtime(LATE_REQUIRED);
    let mut wire = WireMessage::new();
    wire.add_named("id", WireValue::Long(9));
    wire.add_named("note", WireValue::Int(2));

    let decoded = runtime.from_wire("Reading", &wire).unwrap();

    assert_eq!(decoded.get("note"), Some(Value::Int(2)));
    assert_eq!(decoded.get("id"), Some(Value::Long(9)));
    assert_eq!(runtime.render(&decoded), "Reading[note=2, id=9]");
}

#[test]
fn Runtime___from_wire___narrows_integral_values_that_fit() {
    let runtime = runtime(CATALOGUE);
    let mut wire = WireMessage::new();
    wire.add_ordinal(1, WireValue::Long(3));
    wire.add_ordinal(2, WireValue::Byte(4));

    let decoded = runtime.from_wire("Point", &wire).unwrap();

    assert_eq!(decoded.get("x"), Some(Value::Int(3)));
    assert_eq!(decoded.get("y"), Some(Value::Int(4)));
}

#[test]
fn Runtime___from_wire___out_of_range_value_is_wrong_type() {
    let runtime = runtime(CATALOGUE);
    let mut wire = WireMessage::new();
    wire.add_ordinal(1, WireValue::Long(i64::MAX));
    wire.add_ordinal(2, WireValue::Int(4));

    let err = decode_error(runtime.from_wire("Point", &wire));

    assert!(matches!(
        err,
        DecodeError::Field {
            fault: FieldFault::WrongType { .. },
            ..
        }
    ));
}

#[test]
fn Runtime___from_wire___applies_default_for_absent_field() {
    let runtime = runtime(CATALOGUE);
    let mut wire = WireMessage::new();
    wire.add_named("name", WireValue::String("s".into()));

    let decoded = runtime.from_wire("Sample", &wire).unwrap();

    assert_eq!(decoded.get("count"), Some(Value::Int(5)));
    assert_eq!(decoded.get("urgent"), Some(Value::Bool(false)));
}

#[test]
fn Runtime___from_wire___invalid_enum_code_is_error() {
    let runtime = runtime(CATALOGUE);
    let mut wire = runtime
        .to_wire(
            &runtime
                .construct(
                    "Painted",
                    vec![Value::enum_label("RED"), Value::Object(square(&runtime))],
                )
                .unwrap(),
        )
        .unwrap();
    for field in &mut wire.fields {
        if field.name.as_deref() == Some("colour") {
            field.value = WireValue::Int(7);
        }
    }

    let err = decode_error(runtime.from_wire("Painted", &wire));

    assert_eq!(
        err.to_string(),
        "Fudge message is not a Painted - field 'colour' is not a Colour - invalid value '7'"
    );
}

#[test]
fn Runtime___from_wire___decodes_most_derived_type_from_header() {
    let runtime = runtime(CATALOGUE);
    let derived = runtime
        .construct("Derived", vec![Value::Int(7), Value::enum_label("GREEN")])
        .unwrap();
    let wire = runtime.to_wire(&derived).unwrap();

    let decoded = runtime.from_wire("Base", &wire).unwrap();

    assert_eq!(decoded.name(), "Derived");
    assert!(runtime.equals(&derived, &decoded));
}

#[test]
fn Runtime___from_wire___unknown_header_falls_back_to_declared() {
    let runtime = runtime(CATALOGUE);
    let mut wire = WireMessage::new();
    wire.add_ordinal(HEADER_ORDINAL, WireValue::String("com.other.Thing".into()));
    wire.add_named("count", WireValue::Int(2));

    let decoded = runtime.from_wire("Base", &wire).unwrap();

    assert_eq!(decoded.name(), "Base");
}

#[test]
fn Runtime___from_wire___abstract_sub_message_without_header_is_error() {
    let runtime = runtime(CATALOGUE);
    let mut outline = WireMessage::new();
    outline.add_named("name", WireValue::String("s".into()));
    let mut wire = WireMessage::new();
    wire.add_named("colour", WireValue::Int(1));
    wire.add_named("outline", WireValue::Message(outline));

    let err = decode_error(runtime.from_wire("Painted", &wire));

    match err {
        DecodeError::Field {
            field,
            fault: FieldFault::Nested(inner),
            ..
        } => {
            assert_eq!(field, "outline");
            assert!(matches!(*inner, DecodeError::Abstract { .. }));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn Runtime___from_wire___required_repeated_absent_is_error() {
    let runtime = runtime(CATALOGUE);

    let err = decode_error(runtime.from_wire("Bag", &WireMessage::new()));

    assert_eq!(err.field(), Some("items"));
}

#[test]
fn Runtime___from_wire___array_length_checked() {
    let runtime = runtime(CATALOGUE);
    let mut wire = WireMessage::new();
    wire.add_named("corners", WireValue::IntArray(vec![1, 2]));

    let err = decode_error(runtime.from_wire("Triangle", &wire));

    assert!(matches!(
        err,
        DecodeError::Field {
            fault: FieldFault::Length {
                expected: 3,
                actual: 2
            },
            ..
        }
    ));
}

#[test]
fn Runtime___from_wire___coerces_other_numeric_array_widths() {
    let runtime = runtime(CATALOGUE);
    let mut wire = WireMessage::new();
    wire.add_named("corners", WireValue::ShortArray(vec![1, 2, 3]));

    let decoded = runtime.from_wire("Triangle", &wire).unwrap();

    let corners = decoded.get("corners").unwrap();
    assert_eq!(
        corners.as_array().unwrap().snapshot(),
        vec![Value::Int(1), Value::Int(2), Value::Int(3)]
    );
}

// ============================================================================
// Context
// ============================================================================

#[test]
fn Runtime___from_wire_with_context___round_trips_external_reference() {
    let runtime = runtime(CATALOGUE);
    let ctx = DecodeContext::new().with_converter(token("Opaque"), PassThroughConverter::new(token("Opaque")));
    let mut payload = WireMessage::new();
    payload.add_named("blob", WireValue::String("data".into()));
    let holder = runtime
        .construct(
            "Holder",
            vec![Value::External(ExternalValue::new(
                token("Opaque"),
                WireValue::Message(payload),
            ))],
        )
        .unwrap();

    let wire = runtime.to_wire_with_context(&holder, &ctx).unwrap();
    let decoded = runtime.from_wire_with_context("Holder", &wire, &ctx).unwrap();

    let inner = wire.by_name("opaque").and_then(WireValue::as_message).unwrap();
    assert_eq!(inner.header_names(), vec![token("Opaque").as_str()]);
    assert!(runtime.equals(&holder, &decoded));
}

#[test]
fn Runtime___from_wire___context_form_without_context_is_error() {
    let runtime = runtime(CATALOGUE);

    let err = decode_error(runtime.from_wire("Holder", &WireMessage::new()));

    assert!(matches!(err, DecodeError::ContextRequired { .. }));
}

#[test]
fn Runtime___from_wire_with_context___missing_converter_is_error() {
    let runtime = runtime(CATALOGUE);
    let mut wire = WireMessage::new();
    wire.add_named("opaque", WireValue::Message(WireMessage::new()));

    let err = decode_error(runtime.from_wire_with_context("Holder", &wire, &DecodeContext::new()));

    assert!(matches!(
        err,
        DecodeError::Field {
            fault: FieldFault::NoConverter { .. },
            ..
        }
    ));
}
