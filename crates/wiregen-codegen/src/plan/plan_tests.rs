#![allow(non_snake_case)]

use super::*;
use crate::fixtures::{SHAPES, message, schema};

fn shapes_plan() -> SchemaPlan {
    SchemaPlan::build(schema(SHAPES), PlanOptions::default())
}

const HIERARCHY: &str = r#"
namespace = "org.example.zoo"

[[messages]]
name = "Animal"

[[messages.fields]]
name = "id"
type = "int"
required = true

[[messages]]
name = "Bird"
extends = "Animal"

[[messages.fields]]
name = "wings"
type = "int"
required = true

[[messages]]
name = "Parrot"
extends = "Bird"

[[messages.fields]]
name = "words"
type = "string"
required = true

[[messages]]
name = "Fish"
extends = "Animal"
"#;

// ============================================================================
// Registry tests
// ============================================================================

#[test]
fn DecoderRegistry___from_schema___skips_abstract_and_external() {
    let plan = shapes_plan();

    let tokens: Vec<_> = plan.registry().tokens().collect();

    assert!(tokens.contains(&"org.example.shapes.Circle"));
    assert!(tokens.contains(&"org.example.shapes.Point"));
    assert!(!tokens.contains(&"org.example.shapes.Shape"));
    assert!(!tokens.contains(&"org.example.shapes.Opaque"));
    assert_eq!(
        plan.registry().resolve("org.example.shapes.Circle"),
        Some(message(plan.schema(), "Circle"))
    );
}

// ============================================================================
// Candidate tests
// ============================================================================

#[test]
fn SchemaPlan___decode_candidates___most_derived_first_stopping_at_declared() {
    let plan = SchemaPlan::build(schema(HIERARCHY), PlanOptions::default());
    let schema = plan.schema();
    let header = vec![
        "org.example.zoo.Parrot".to_string(),
        "org.example.zoo.Bird".to_string(),
        "org.example.zoo.Animal".to_string(),
    ];

    let from_animal = plan.decode_candidates(&header, message(schema, "Animal"));
    let from_bird = plan.decode_candidates(&header, message(schema, "Bird"));

    assert_eq!(
        from_animal,
        vec![message(schema, "Parrot"), message(schema, "Bird")]
    );
    assert_eq!(from_bird, vec![message(schema, "Parrot")]);
}

#[test]
fn SchemaPlan___decode_candidates___skips_unknown_and_unrelated_names() {
    let plan = SchemaPlan::build(schema(HIERARCHY), PlanOptions::default());
    let schema = plan.schema();
    let header = vec![
        "org.example.zoo.Unknown".to_string(),
        "org.example.zoo.Fish".to_string(),
    ];

    let candidates = plan.decode_candidates(&header, message(schema, "Bird"));

    assert!(candidates.is_empty());
}

// ============================================================================
// Plan tests
// ============================================================================

#[test]
fn SchemaPlan___build___records_analyzer_flags() {
    let plan = shapes_plan();

    let circle = plan.find("Circle").unwrap();
    let holder = plan.find("Holder").unwrap();
    let point = plan.find("Point").unwrap();

    assert!(circle.flags.use_builder);
    assert!(holder.flags.has_external_references);
    assert!(holder.with_context());
    assert!(!point.with_context());
    assert_eq!(point.token, "org.example.shapes.Point");
}

#[test]
fn SchemaPlan___build___forced_context_applies_everywhere() {
    let plan = SchemaPlan::build(
        schema(SHAPES),
        PlanOptions {
            to_from_with_context: true,
        },
    );

    assert!(plan.messages().all(|m| m.with_context()));
    assert!(plan.find("Point").unwrap().constructor.wire_decode.with_context);
}

#[test]
fn PlanOptions___from_config___copies_context_switch() {
    let mut config = CompileConfig::default();
    config.to_from_with_context = true;

    assert!(PlanOptions::from(&config).to_from_with_context);
}

#[test]
fn SchemaPlan___describe_message___reports_decisions_by_name() {
    let plan = shapes_plan();

    let described = plan.describe_message(message(plan.schema(), "Polygon"));

    assert_eq!(described["name"], "Polygon");
    assert_eq!(described["constructor"]["shape"]["kind"], "direct");
    assert_eq!(described["constructor"]["required"], json!(["name", "vertices"]));
    assert_eq!(described["constructor"]["mutators"], json!(["label"]));
    assert_eq!(described["wire"]["fields"][0]["name"], "vertices");
    assert_eq!(described["wire"]["fields"][0]["wire_type"], "message");
    assert_eq!(described["equality"], json!(["vertices", "label"]));
}

#[test]
fn SchemaPlan___describe___lists_decoders() {
    let plan = shapes_plan();

    let described = plan.describe();

    assert_eq!(described["namespace"], "org.example.shapes");
    assert!(described["decoders"]
        .as_array()
        .unwrap()
        .contains(&json!("org.example.shapes.Node")));
}
