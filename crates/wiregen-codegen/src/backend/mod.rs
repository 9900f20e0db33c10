//! Code generation backends.
//!
//! A backend renders a [`SchemaPlan`] as target-language text. It receives a
//! [`Capabilities`] object for the run instead of reading process-wide
//! settings, so two runs with different configurations never interfere.
//!
//! # Supported Backends
//!
//! - **java**: value classes with builders, wire codecs and polymorphic decode
//! - **json-schema**: Draft-07 definitions for documentation and validation

use crate::error::{CodegenError, CodegenResult};
use crate::plan::SchemaPlan;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use wiregen_core::{CompileConfig, TemporalBindings};

pub mod java;
pub mod json_schema;
pub mod jvm_types;

pub use java::JavaBackend;
pub use json_schema::JsonSchemaBackend;

/// Per-run settings handed to a backend.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    /// Stored representation of date, time and datetime fields.
    pub temporal: TemporalBindings,
    pub file_header: Option<String>,
    pub file_footer: Option<String>,
    /// Codecs thread a decode context even where no external reference needs one.
    pub to_from_with_context: bool,
    /// Free-form backend options from the configuration.
    pub data: serde_json::Value,
}

impl Capabilities {
    pub fn from_config(config: &CompileConfig) -> Self {
        Self {
            temporal: config.temporal.clone(),
            file_header: config.file_header.clone(),
            file_footer: config.file_footer.clone(),
            to_from_with_context: config.to_from_with_context,
            data: config.data.clone(),
        }
    }

    /// Typed lookup in the free-form options table.
    pub fn option<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Surrounds generated text with the configured header and footer.
    pub fn wrap(&self, body: String) -> String {
        let mut out = String::with_capacity(body.len());
        if let Some(header) = &self.file_header {
            out.push_str(header);
            if !header.ends_with('\n') {
                out.push('\n');
            }
        }
        out.push_str(&body);
        if let Some(footer) = &self.file_footer {
            out.push_str(footer);
            if !footer.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }
}

/// One output file, with a path relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
        }
    }
}

pub trait Backend: Send + Sync {
    fn name(&self) -> &'static str;

    fn render(&self, plan: &SchemaPlan, caps: &Capabilities) -> CodegenResult<Vec<GeneratedFile>>;
}

/// Look a backend up by the name used in configuration and on the command line.
pub fn backend_for(name: &str) -> CodegenResult<Box<dyn Backend>> {
    match name {
        "java" => Ok(Box::new(JavaBackend)),
        "json-schema" | "json_schema" => Ok(Box::new(JsonSchemaBackend)),
        other => Err(CodegenError::UnknownBackend(other.to_string())),
    }
}

/// Write generated files below `dir`, creating directories as needed.
pub fn write_files(files: &[GeneratedFile], dir: &Path) -> CodegenResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = dir.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| CodegenError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, &file.contents).map_err(|source| CodegenError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), bytes = file.contents.len(), "wrote generated file");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
#[path = "backend_tests.rs"]
mod backend_tests;
