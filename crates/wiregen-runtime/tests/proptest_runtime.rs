//! Property-based tests for the reference runtime
//!
//! Tests that objects survive the wire unchanged, that equal objects hash
//! alike and that fixed-length checks hold for every length.

use proptest::prelude::*;
use std::sync::Arc;
use wiregen_codegen::PlanOptions;
use wiregen_core::{SchemaDocument, resolve};
use wiregen_runtime::prelude::*;

const SCHEMA: &str = r#"
namespace = "org.example.props"

[[messages]]
name = "Point"

[[messages.fields]]
name = "x"
type = "int"
ordinal = 1
required = true

[[messages.fields]]
name = "y"
type = "int"
ordinal = 2
required = true

[[messages]]
name = "Reading"

[[messages.fields]]
name = "label"
type = "string"
required = true

[[messages.fields]]
name = "scale"
type = "long"
default = 10

[[messages.fields]]
name = "tags"
type = "string"
repeated = true

[[messages]]
name = "Quad"

[[messages.fields]]
name = "values"
type = "short[4]"
required = true
"#;

fn runtime() -> Runtime {
    let document = SchemaDocument::from_toml_str(SCHEMA).unwrap();
    Runtime::from_schema(Arc::new(resolve(&document).unwrap()), PlanOptions::default())
}

proptest! {
    /// Property: any point round-trips through the wire
    #[test]
    fn proptest_point_roundtrip(x in any::<i32>(), y in any::<i32>()) {
        let runtime = runtime();
        let point = runtime.construct("Point", vec![Value::Int(x), Value::Int(y)]).unwrap();

        let decoded = runtime.from_wire("Point", &runtime.to_wire(&point).unwrap()).unwrap();

        prop_assert!(runtime.equals(&point, &decoded));
        prop_assert_eq!(runtime.hash_code(&point), runtime.hash_code(&decoded));
    }

    /// Property: builder output round-trips, absent scale included
    #[test]
    fn proptest_builder_roundtrip(
        label in "[a-z]{0,12}",
        scale in proptest::option::of(any::<i64>()),
        tags in prop::collection::vec("[a-z]{1,6}", 0..4),
    ) {
        let runtime = runtime();
        let mut builder = runtime.builder("Reading").unwrap().set("label", label.as_str());
        if let Some(scale) = scale {
            builder = builder.set("scale", scale);
        }
        for tag in &tags {
            builder = builder.append("tags", tag.as_str());
        }
        let reading = builder.build().unwrap();

        let decoded = runtime.from_wire("Reading", &runtime.to_wire(&reading).unwrap()).unwrap();

        prop_assert!(runtime.equals(&reading, &decoded));
        prop_assert_eq!(
            runtime.get(&decoded, "scale").unwrap(),
            Value::Long(scale.unwrap_or(10))
        );
    }

    /// Property: only the declared length is accepted
    #[test]
    fn proptest_fixed_length_enforced(values in prop::collection::vec(any::<i16>(), 0..8)) {
        let runtime = runtime();
        let array = Value::array(values.iter().copied().map(Value::Short).collect());

        let result = runtime.construct("Quad", vec![array]);

        prop_assert_eq!(result.is_ok(), values.len() == 4);
    }
}
