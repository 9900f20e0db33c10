#![allow(non_snake_case)]

use super::*;
use crate::fixtures::{SHAPES, message, schema};
use wiregen_core::ArrayType;

fn planner(schema: &wiregen_core::Schema) -> WirePlanner<'_> {
    WirePlanner::new(Analyzer::new(schema), false)
}

#[test]
fn WirePlanner___value_codec___scalars_and_indicator() {
    let schema = schema(SHAPES);
    let planner = planner(&schema);

    assert_eq!(
        planner.value_codec(&FieldType::Primitive(PrimitiveKind::Long)),
        ValueCodec::Scalar {
            kind: PrimitiveKind::Long
        }
    );
    assert_eq!(
        planner.value_codec(&FieldType::Primitive(PrimitiveKind::Indicator)),
        ValueCodec::Indicator
    );
    assert_eq!(
        planner.value_codec(&FieldType::Primitive(PrimitiveKind::Time)),
        ValueCodec::Temporal {
            kind: PrimitiveKind::Time
        }
    );
}

#[test]
fn WirePlanner___value_codec___flat_numeric_array_is_primitive_array() {
    let schema = schema(SHAPES);
    let planner = planner(&schema);
    let ty = FieldType::Array(ArrayType::new(FieldType::Primitive(PrimitiveKind::Double), Some(4)));

    assert_eq!(
        planner.value_codec(&ty),
        ValueCodec::PrimitiveArray {
            kind: PrimitiveKind::Double,
            length: Some(4)
        }
    );
}

#[test]
fn WirePlanner___value_codec___string_and_nested_arrays_use_containers() {
    let schema = schema(SHAPES);
    let planner = planner(&schema);
    let strings = FieldType::array(FieldType::Primitive(PrimitiveKind::String), None);
    let grid = FieldType::array(
        FieldType::array(FieldType::Primitive(PrimitiveKind::Int), Some(2)),
        Some(2),
    );

    assert!(matches!(
        planner.value_codec(&strings),
        ValueCodec::Container { deep_fixed: false, .. }
    ));
    let ValueCodec::Container {
        element,
        length,
        deep_fixed,
    } = planner.value_codec(&grid)
    else {
        panic!("expected container");
    };
    assert_eq!(length, Some(2));
    assert!(deep_fixed);
    assert_eq!(
        *element,
        ValueCodec::PrimitiveArray {
            kind: PrimitiveKind::Int,
            length: Some(2)
        }
    );
}

#[test]
fn WirePlanner___value_codec___external_message_delegates() {
    let schema = schema(SHAPES);
    let planner = planner(&schema);
    let opaque = message(&schema, "Opaque");
    let holder = message(&schema, "Holder");

    let codec = planner.value_codec(&FieldType::Message(MessageRef::Defined(opaque)));
    let nested = planner.value_codec(&FieldType::Message(MessageRef::Defined(holder)));

    assert_eq!(
        codec,
        ValueCodec::ExternalMessage {
            id: opaque,
            token: "org.example.shapes.Opaque".to_string()
        }
    );
    assert!(codec.needs_context());
    assert!(nested.needs_context());
}

#[test]
fn WirePlanner___field_codec___indicator_errors_are_not_wrapped() {
    let schema = schema(
        r#"
[[messages]]
name = "Flags"

[[messages.fields]]
name = "on"
type = "indicator"

[[messages.fields]]
name = "count"
type = "int"
ordinal = 3
"#,
    );
    let planner = planner(&schema);
    let codec = planner.message_codec(message(&schema, "Flags"));

    assert!(!codec.field("on").unwrap().wrap_errors);
    assert!(codec.field("count").unwrap().wrap_errors);
    assert_eq!(codec.field("count").unwrap().key, WireKey::Ordinal(3));
}

#[test]
fn WirePlanner___message_codec___encode_order_is_own_then_base() {
    let schema = schema(
        r#"
[[messages]]
name = "Base"

[[messages.fields]]
name = "a"
type = "int"

[[messages.fields]]
name = "b"
type = "int"

[[messages]]
name = "Sub"
extends = "Base"

[[messages.fields]]
name = "c"
type = "int"

[[messages.fields]]
name = "a"
type = "int"
override = true
required = true
"#,
    );
    let planner = planner(&schema);
    let sub = message(&schema, "Sub");

    let codec = planner.message_codec(sub);

    let order: Vec<_> = codec.encode_order.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(order, vec!["c", "a", "b"]);
    assert_eq!(codec.field("a").unwrap().field.message, sub);
    assert!(codec.field("a").unwrap().required);
    assert_eq!(codec.own.len(), 2);
}

#[test]
fn WirePlanner___message_codec___header_lists_chain_most_derived_first() {
    let schema = schema(SHAPES);
    let planner = planner(&schema);

    let circle = planner.message_codec(message(&schema, "Circle"));
    let point = planner.message_codec(message(&schema, "Point"));

    assert_eq!(
        circle.header,
        vec!["org.example.shapes.Circle", "org.example.shapes.Shape"]
    );
    assert!(point.header.is_empty());
}

#[test]
fn WirePlanner___with_context___forced_by_configuration() {
    let schema = schema(SHAPES);
    let point = message(&schema, "Point");

    assert!(!WirePlanner::new(Analyzer::new(&schema), false).with_context(point));
    assert!(WirePlanner::new(Analyzer::new(&schema), true).with_context(point));
}
