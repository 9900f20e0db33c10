//! wiregen-core - Schema model, resolution and configuration
//!
//! This crate provides the foundational types for the wiregen schema compiler:
//! - [`Schema`] and the definition types it owns (messages, enums, typedefs, taxonomies)
//! - [`FieldType`] and [`WireType`] for the type-to-wire mapping
//! - [`SchemaDocument`] as the interchange format handed over by a schema parser
//! - [`resolve`] for closing forward references and validating the model
//! - [`SchemaError`] for error handling
//! - [`CompileConfig`] for per-run configuration

mod config;
mod document;
mod error;
mod model;
mod resolve;
mod types;

pub use config::{CompileConfig, ConfigError, TemporalBinding, TemporalBindings};
pub use document::{
    EnumDocument, EnumValueDocument, FieldDocument, MessageDocument, SchemaDocument,
    TaxonomyDocument, TypeDocument, TypeExpr,
};
pub use error::{Position, SchemaError, SchemaResult};
pub use model::{
    EnumCode, EnumDefinition, EnumEncoding, EnumId, EnumMember, FieldDefinition, FieldId,
    LiteralValue, MessageDefinition, MessageId, Schema, TaxonomyDefinition, TaxonomyEntry,
    TaxonomyId, TypeDefId, TypeDefinition, WireKey,
};
pub use resolve::resolve;
pub use types::{ArrayType, FieldType, MessageRef, PrimitiveKind, WireType};

/// Log levels accepted by the compiler configuration and CLI
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "none" => Ok(LogLevel::Off),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CompileConfig, FieldDefinition, FieldType, LogLevel, MessageDefinition, MessageId,
        MessageRef, PrimitiveKind, Schema, SchemaDocument, SchemaError, SchemaResult, WireKey,
        WireType, resolve,
    };
}

#[cfg(test)]
mod lib_tests;
