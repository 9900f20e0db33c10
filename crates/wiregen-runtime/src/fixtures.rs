//! Shared schema fixtures for unit tests

use crate::Runtime;
use std::sync::Arc;
use wiregen_codegen::PlanOptions;
use wiregen_core::{SchemaDocument, resolve};

pub(crate) fn runtime(toml: &str) -> Runtime {
    let document = SchemaDocument::from_toml_str(toml).unwrap();
    let schema = Arc::new(resolve(&document).unwrap());
    Runtime::from_schema(schema, PlanOptions::default())
}

/// One message per construction shape plus a small hierarchy.
pub(crate) const CATALOGUE: &str = r#"
namespace = "org.example.runtime"

[[enums]]
name = "Colour"
encoding = "integer"
values = [
    { label = "RED", value = 1 },
    { label = "GREEN", value = 2 },
]

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
name = "Sample"

[[messages.fields]]
name = "name"
type = "string"
required = true

[[messages.fields]]
name = "count"
type = "int"
default = 5

[[messages.fields]]
name = "urgent"
type = "indicator"

[[messages]]
name = "Triangle"

[[messages.fields]]
name = "corners"
type = "int[3]"
required = true

[[messages]]
name = "Bag"

[[messages.fields]]
name = "items"
type = "string"
required = true
repeated = true

[[messages]]
name = "Note"

[[messages.fields]]
name = "text"
type = "string"
mutable = true

[[messages.fields]]
name = "values"
type = "int[]"
mutable = true

[[messages]]
name = "Shape"
abstract = true

[[messages.fields]]
name = "name"
type = "string"
required = true

[[messages]]
name = "Square"
extends = "Shape"

[[messages.fields]]
name = "side"
type = "double"
required = true

[[messages]]
name = "Painted"

[[messages.fields]]
name = "colour"
type = "Colour"
required = true

[[messages.fields]]
name = "outline"
type = "Shape"
required = true

[[messages]]
name = "Base"

[[messages.fields]]
name = "count"
type = "int"
required = true

[[messages]]
name = "Derived"
extends = "Base"

[[messages.fields]]
name = "count"
type = "int"
required = true
override = true

[[messages.fields]]
name = "colour"
type = "Colour"
required = true

[[messages]]
name = "Opaque"
external = true

[[messages]]
name = "Holder"

[[messages.fields]]
name = "opaque"
type = "Opaque"
required = true
"#;
