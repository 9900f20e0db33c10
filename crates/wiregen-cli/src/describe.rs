//! Plan inspection

use crate::load;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use wiregen_codegen::{PlanOptions, SchemaPlan};

/// Run the describe command, printing pretty JSON to stdout.
pub fn run(schema: &Path, message: Option<&str>) -> Result<()> {
    let description = describe(schema, message)?;
    let text = serde_json::to_string_pretty(&description)
        .context("Failed to serialize plan description")?;
    println!("{text}");
    Ok(())
}

/// Plan decisions for a whole schema, or for one message of it.
pub fn describe(schema: &Path, message: Option<&str>) -> Result<Value> {
    let schema_ref = load::schema(schema)?;
    let plan = SchemaPlan::build(schema_ref, PlanOptions::default());

    match message {
        None => Ok(plan.describe()),
        Some(name) => {
            let found = plan.find(name).with_context(|| {
                format!("Message '{name}' not found in {}", schema.display())
            })?;
            Ok(plan.describe_message(found.id))
        }
    }
}
