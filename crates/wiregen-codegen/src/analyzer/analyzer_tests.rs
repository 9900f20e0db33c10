#![allow(non_snake_case)]

use super::*;
use crate::fixtures::{SHAPES, message, schema};
use test_case::test_case;
use wiregen_core::ArrayType;

// ============================================================================
// External references
// ============================================================================

#[test_case("Point", false ; "plain scalars")]
#[test_case("Opaque", true ; "external itself")]
#[test_case("Holder", true ; "direct field")]
#[test_case("Wrapper", true ; "transitive field")]
#[test_case("Node", false ; "self reference terminates")]
fn Analyzer___has_external_message_references(name: &str, expected: bool) {
    let schema = schema(SHAPES);
    let analyzer = Analyzer::new(&schema);

    assert_eq!(
        analyzer.has_external_message_references(message(&schema, name)),
        expected
    );
}

#[test]
fn Analyzer___has_external_message_references___through_base_and_array() {
    let schema = schema(
        r#"
[[messages]]
name = "Ext"
external = true

[[messages]]
name = "Base"

[[messages.fields]]
name = "all"
type = "Ext[2][]"

[[messages]]
name = "Sub"
extends = "Base"
"#,
    );
    let analyzer = Analyzer::new(&schema);

    assert!(analyzer.has_external_message_references(message(&schema, "Sub")));
}

#[test]
fn Analyzer___has_external_message_references___external_alias_of_message_counts() {
    let schema = schema(
        r#"
[[types]]
name = "Handle"
type = "message"
external = true

[[types]]
name = "Count"
type = "int"
external = true

[[messages]]
name = "UsesHandle"

[[messages.fields]]
name = "h"
type = "Handle"

[[messages]]
name = "UsesCount"

[[messages.fields]]
name = "c"
type = "Count"
"#,
    );
    let analyzer = Analyzer::new(&schema);

    assert!(analyzer.has_external_message_references(message(&schema, "UsesHandle")));
    assert!(!analyzer.has_external_message_references(message(&schema, "UsesCount")));
}

// ============================================================================
// Builder adoption
// ============================================================================

#[test_case("Point", false ; "required without default")]
#[test_case("Polygon", false ; "mutable optional field")]
#[test_case("Circle", true ; "defaulted immutable field")]
#[test_case("Holder", true ; "optional immutable field")]
fn Analyzer___use_builder_pattern(name: &str, expected: bool) {
    let schema = schema(SHAPES);
    let analyzer = Analyzer::new(&schema);

    assert_eq!(analyzer.use_builder_pattern(message(&schema, name)), expected);
}

#[test]
fn Analyzer___use_builder_pattern___inherited_from_base() {
    let schema = schema(
        r#"
[[messages]]
name = "Base"

[[messages.fields]]
name = "note"
type = "string"

[[messages]]
name = "Sub"
extends = "Base"

[[messages.fields]]
name = "id"
type = "int"
required = true
"#,
    );
    let analyzer = Analyzer::new(&schema);

    assert!(analyzer.use_builder_pattern(message(&schema, "Sub")));
}

#[test]
fn Analyzer___use_builder_pattern___override_decides_for_its_field() {
    let schema = schema(
        r#"
[[messages]]
name = "Base"

[[messages.fields]]
name = "note"
type = "string"
mutable = true

[[messages]]
name = "Sub"
extends = "Base"

[[messages.fields]]
name = "note"
type = "string"
override = true
"#,
    );
    let analyzer = Analyzer::new(&schema);

    assert!(!analyzer.use_builder_pattern(message(&schema, "Base")));
    assert!(analyzer.use_builder_pattern(message(&schema, "Sub")));
}

// ============================================================================
// Copy constructors
// ============================================================================

#[test_case("Point", false ; "immutable")]
#[test_case("Polygon", true ; "own mutable field")]
#[test_case("Opaque", true ; "external")]
fn Analyzer___use_copy_constructor(name: &str, expected: bool) {
    let schema = schema(SHAPES);
    let analyzer = Analyzer::new(&schema);

    assert_eq!(analyzer.use_copy_constructor(message(&schema, name)), expected);
}

#[test]
fn Analyzer___needs_copy_constructor___when_a_subclass_uses_one() {
    let schema = schema(SHAPES);
    let analyzer = Analyzer::new(&schema);
    let shape = message(&schema, "Shape");

    assert!(!analyzer.use_copy_constructor(shape));
    assert!(analyzer.needs_copy_constructor(shape));
}

// ============================================================================
// Object classification
// ============================================================================

#[test]
fn Analyzer___is_object___classifies_field_types() {
    let schema = schema(SHAPES);
    let analyzer = Analyzer::new(&schema);
    let point = FieldType::Message(MessageRef::Defined(message(&schema, "Point")));
    let ints = FieldType::Array(ArrayType::new(FieldType::Primitive(PrimitiveKind::Int), Some(2)));

    assert!(!analyzer.is_object(&FieldType::Primitive(PrimitiveKind::Int)));
    assert!(analyzer.is_object(&FieldType::Primitive(PrimitiveKind::String)));
    assert!(analyzer.is_object(&FieldType::Primitive(PrimitiveKind::Date)));
    assert!(analyzer.is_object(&point));
    assert!(analyzer.is_object(&ints));
}

#[test]
fn Analyzer___is_big_object___only_arrays_and_defined_messages() {
    let schema = schema(SHAPES);
    let analyzer = Analyzer::new(&schema);
    let point = FieldType::Message(MessageRef::Defined(message(&schema, "Point")));
    let ints = FieldType::Array(ArrayType::new(FieldType::Primitive(PrimitiveKind::Int), None));

    assert!(analyzer.is_big_object(&point));
    assert!(analyzer.is_big_object(&ints));
    assert!(!analyzer.is_big_object(&FieldType::Message(MessageRef::Anonymous)));
    assert!(!analyzer.is_big_object(&FieldType::Primitive(PrimitiveKind::String)));
    assert!(!analyzer.is_big_object(&FieldType::Primitive(PrimitiveKind::DateTime)));
}
