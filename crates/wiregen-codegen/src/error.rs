//! Error types for planning and code generation

use std::path::PathBuf;
use thiserror::Error;
use wiregen_core::SchemaError;

/// Result type alias for code generation
pub type CodegenResult<T> = Result<T, CodegenError>;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("unknown backend '{0}' (available: java, json-schema)")]
    UnknownBackend(String),

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backend '{backend}' cannot render {what}")]
    Unsupported { backend: &'static str, what: String },
}

impl CodegenError {
    /// Returns a stable numeric code for diagnostics output
    pub fn error_code(&self) -> u32 {
        match self {
            CodegenError::Schema(e) => e.error_code(),
            CodegenError::UnknownBackend(_) => 100,
            CodegenError::Io { .. } => 101,
            CodegenError::Json(_) => 102,
            CodegenError::Unsupported { .. } => 103,
        }
    }
}
