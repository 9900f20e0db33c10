//! Schema validation without generating output

use crate::load;
use anyhow::Result;
use std::path::PathBuf;
use wiregen_core::Schema;

/// Definition counts for one resolved schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub messages: usize,
    pub enums: usize,
    pub taxonomies: usize,
    pub types: usize,
}

impl Summary {
    pub fn of(schema: &Schema) -> Self {
        Self {
            messages: schema.message_count(),
            enums: schema.enums().count(),
            taxonomies: schema.taxonomies().count(),
            types: schema.type_defs().count(),
        }
    }
}

/// Run the check command.
pub fn run(schemas: &[PathBuf]) -> Result<()> {
    for path in schemas {
        let schema = load::schema(path)?;
        let summary = Summary::of(&schema);

        println!("✓ {} is valid", path.display());
        if !schema.namespace().is_empty() {
            println!("  Namespace: {}", schema.namespace());
        }
        println!("  Messages: {}", summary.messages);
        println!("  Enums: {}", summary.enums);
        println!("  Taxonomies: {}", summary.taxonomies);
        println!("  Types: {}", summary.types);
    }

    Ok(())
}
