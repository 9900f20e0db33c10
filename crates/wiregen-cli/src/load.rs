//! Loading schema documents and compiler configuration

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use wiregen_core::{CompileConfig, Schema, SchemaDocument, resolve};

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG: &str = "wiregen.toml";

/// Parse and resolve one schema document.
pub fn schema(path: &Path) -> Result<Arc<Schema>> {
    let document = SchemaDocument::from_path(path)
        .with_context(|| format!("Failed to load schema: {}", path.display()))?;
    let schema = resolve(&document)
        .with_context(|| format!("Failed to resolve schema: {}", path.display()))?;
    debug!(
        path = %path.display(),
        namespace = schema.namespace(),
        messages = schema.message_count(),
        "resolved schema"
    );
    Ok(Arc::new(schema))
}

/// Read the configuration; a missing default file means defaults.
pub fn config(path: Option<&Path>) -> Result<CompileConfig> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG).exists() => Path::new(DEFAULT_CONFIG),
        None => return Ok(CompileConfig::default()),
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = if path.extension().is_some_and(|ext| ext == "json") {
        CompileConfig::from_json(content.as_bytes())
    } else {
        CompileConfig::from_toml(&content)
    };
    config.with_context(|| format!("Failed to parse config: {}", path.display()))
}
