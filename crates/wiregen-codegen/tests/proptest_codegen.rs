//! Property-based tests for planning and code generation
//!
//! Tests that naming helpers produce usable identifiers and that planning
//! and rendering are deterministic for arbitrary flat messages.

use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use wiregen_codegen::naming::{java_identifier, to_constant_case};
use wiregen_codegen::{Capabilities, PlanOptions, SchemaPlan, backend_for};
use wiregen_core::{CompileConfig, SchemaDocument, resolve};

const TYPES: &[&str] = &["int", "long", "string", "double", "bool", "int[]", "string[2]"];

fn schema_text(fields: &[(String, usize, bool)]) -> String {
    let mut text = String::from("namespace = \"org.example.generated\"\n\n[[messages]]\nname = \"Record\"\n");
    for (name, ty, required) in fields {
        text.push_str(&format!(
            "\n[[messages.fields]]\nname = \"{name}\"\ntype = \"{}\"\nrequired = {required}\n",
            TYPES[*ty]
        ));
    }
    text
}

fn field_list() -> impl Strategy<Value = Vec<(String, usize, bool)>> {
    prop::collection::btree_set("[a-z][a-z0-9_]{0,8}", 1..6).prop_flat_map(|names| {
        let names: Vec<String> = names.into_iter().collect();
        let len = names.len();
        (
            Just(names),
            prop::collection::vec(0..TYPES.len(), len),
            prop::collection::vec(any::<bool>(), len),
        )
            .prop_map(|(names, types, required)| {
                names
                    .into_iter()
                    .zip(types)
                    .zip(required)
                    .map(|((name, ty), required)| (name, ty, required))
                    .collect()
            })
    })
}

fn plan_for(text: &str) -> SchemaPlan {
    let document = SchemaDocument::from_toml_str(text).unwrap();
    SchemaPlan::build(Arc::new(resolve(&document).unwrap()), PlanOptions::default())
}

proptest! {
    /// Property: constant names never contain lowercase letters
    #[test]
    fn proptest_constant_case_is_upper(name in "[a-zA-Z][a-zA-Z0-9_]{0,16}") {
        let constant = to_constant_case(&name);

        prop_assert!(!constant.chars().any(|c| c.is_ascii_lowercase()));
    }

    /// Property: escaped identifiers are never Java keywords
    #[test]
    fn proptest_java_identifier_not_keyword(
        name in prop::sample::select(vec!["class", "int", "default", "value", "new", "name", "package"])
    ) {
        let identifier = java_identifier(name);

        prop_assert!(!matches!(
            identifier.as_str(),
            "class" | "int" | "default" | "new" | "package"
        ));
    }

    /// Property: planning the same schema twice yields the same description
    #[test]
    fn proptest_plan_deterministic(fields in field_list()) {
        let text = schema_text(&fields);

        prop_assert_eq!(plan_for(&text).describe(), plan_for(&text).describe());
    }

    /// Property: required fields are exactly the required constructor arguments
    #[test]
    fn proptest_required_fields_match_constructor(fields in field_list()) {
        let plan = plan_for(&schema_text(&fields));
        let record = plan.find("Record").unwrap();
        let description = plan.describe_message(record.id);

        let required: BTreeSet<String> = description["constructor"]["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();
        let expected: BTreeSet<String> = fields
            .iter()
            .filter(|(_, _, required)| *required)
            .map(|(name, _, _)| name.clone())
            .collect();
        prop_assert_eq!(required, expected);
    }

    /// Property: every backend renders every flat message
    #[test]
    fn proptest_backends_render(fields in field_list()) {
        let plan = plan_for(&schema_text(&fields));
        let caps = Capabilities::from_config(&CompileConfig::default());

        for name in ["java", "json-schema"] {
            let files = backend_for(name).unwrap().render(&plan, &caps).unwrap();
            prop_assert!(!files.is_empty());
            prop_assert!(files.iter().all(|f| !f.contents.is_empty()));
        }
    }
}
