//! Shared schema fixtures for unit tests

use std::sync::Arc;
use wiregen_core::{MessageId, Schema, SchemaDocument, resolve};

pub(crate) fn schema(toml: &str) -> Arc<Schema> {
    let document = SchemaDocument::from_toml_str(toml).unwrap();
    Arc::new(resolve(&document).unwrap())
}

pub(crate) fn message(schema: &Schema, name: &str) -> MessageId {
    schema
        .find_message(name)
        .unwrap_or_else(|| panic!("no message {name}"))
}

/// Points, shapes and an external reference, enough for most planner tests.
pub(crate) const SHAPES: &str = r#"
namespace = "org.example.shapes"

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
name = "Shape"
abstract = true

[[messages.fields]]
name = "name"
type = "string"
required = true

[[messages]]
name = "Polygon"
extends = "Shape"

[[messages.fields]]
name = "vertices"
type = "Point[]"
required = true

[[messages.fields]]
name = "label"
type = "string"
mutable = true

[[messages]]
name = "Circle"
extends = "Shape"

[[messages.fields]]
name = "centre"
type = "Point"
required = true

[[messages.fields]]
name = "radius"
type = "double"
default = 1.0

[[messages]]
name = "Opaque"
external = true

[[messages]]
name = "Holder"

[[messages.fields]]
name = "opaque"
type = "Opaque"

[[messages]]
name = "Wrapper"

[[messages.fields]]
name = "holder"
type = "Holder"
required = true

[[messages]]
name = "Node"

[[messages.fields]]
name = "next"
type = "Node"

[[messages.fields]]
name = "value"
type = "long"
required = true
"#;
