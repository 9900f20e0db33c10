//! Error types for schema loading and resolution

use std::fmt;
use thiserror::Error;

/// Result type alias for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Location of a definition in its schema source
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub source: String,
    pub line: u32,
}

impl Position {
    pub fn new(source: impl Into<String>, line: u32) -> Self {
        Self {
            source: source.into(),
            line,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.source)
        } else {
            write!(f, "{}:{}", self.source, self.line)
        }
    }
}

/// Error type for schema loading and the resolution pass
///
/// Every variant except [`SchemaError::Document`] carries the position of
/// the definition that triggered it. Any of these aborts the compilation run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A name does not refer to any definition in scope
    #[error("{position}: unresolved reference to '{name}'")]
    UnresolvedReference { name: String, position: Position },

    /// Following `extends` returns to the starting message
    #[error("{position}: inheritance cycle {}", chain.join(" -> "))]
    InheritanceCycle {
        chain: Vec<String>,
        position: Position,
    },

    /// A typedef ends up aliasing itself
    #[error("{position}: type alias cycle {}", chain.join(" -> "))]
    AliasCycle {
        chain: Vec<String>,
        position: Position,
    },

    /// Two definitions share a qualified name
    #[error("{position}: duplicate definition '{name}'")]
    DuplicateDefinition { name: String, position: Position },

    /// A field name is declared twice in one message, or shadows an ancestor without `override`
    #[error("{position}: duplicate field '{field}' in message '{message}'")]
    DuplicateField {
        message: String,
        field: String,
        position: Position,
    },

    /// Two distinct fields visible in one message share an ordinal
    #[error("{position}: duplicate ordinal {ordinal} in message '{message}'")]
    DuplicateOrdinal {
        message: String,
        ordinal: i16,
        position: Position,
    },

    /// Ordinal 0 holds the type header; negative ordinals are not encodable
    #[error("{position}: ordinal {ordinal} of field '{field}' is reserved")]
    ReservedOrdinal {
        field: String,
        ordinal: i16,
        position: Position,
    },

    /// `override` on a field with no same-named ancestor field
    #[error("{position}: field '{field}' of '{message}' overrides nothing")]
    UnknownOverride {
        message: String,
        field: String,
        position: Position,
    },

    /// An override declares a wire key different from the field it replaces
    #[error("{position}: override '{field}' must keep the wire key of the inherited field")]
    OverrideKeyMismatch { field: String, position: Position },

    /// A default value that is not assignable to the field type
    #[error("{position}: invalid default for field '{field}': {reason}")]
    InvalidDefault {
        field: String,
        reason: String,
        position: Position,
    },

    /// Malformed type expression
    #[error("{position}: invalid type '{expr}': {reason}")]
    InvalidType {
        expr: String,
        reason: String,
        position: Position,
    },

    /// Enum with duplicate labels or codes
    #[error("{position}: enum '{name}' declares '{value}' twice")]
    DuplicateEnumValue {
        name: String,
        value: String,
        position: Position,
    },

    /// The schema document itself could not be read or parsed
    #[error("schema document error: {0}")]
    Document(String),
}

impl SchemaError {
    /// Returns a stable numeric code for diagnostics output
    pub fn error_code(&self) -> u32 {
        match self {
            SchemaError::UnresolvedReference { .. } => 1,
            SchemaError::InheritanceCycle { .. } => 2,
            SchemaError::AliasCycle { .. } => 3,
            SchemaError::DuplicateDefinition { .. } => 4,
            SchemaError::DuplicateField { .. } => 5,
            SchemaError::DuplicateOrdinal { .. } => 6,
            SchemaError::ReservedOrdinal { .. } => 7,
            SchemaError::UnknownOverride { .. } => 8,
            SchemaError::OverrideKeyMismatch { .. } => 9,
            SchemaError::InvalidDefault { .. } => 10,
            SchemaError::InvalidType { .. } => 11,
            SchemaError::DuplicateEnumValue { .. } => 12,
            SchemaError::Document(_) => 13,
        }
    }

    /// Source position of the offending definition, if known
    pub fn position(&self) -> Option<&Position> {
        match self {
            SchemaError::UnresolvedReference { position, .. }
            | SchemaError::InheritanceCycle { position, .. }
            | SchemaError::AliasCycle { position, .. }
            | SchemaError::DuplicateDefinition { position, .. }
            | SchemaError::DuplicateField { position, .. }
            | SchemaError::DuplicateOrdinal { position, .. }
            | SchemaError::ReservedOrdinal { position, .. }
            | SchemaError::UnknownOverride { position, .. }
            | SchemaError::OverrideKeyMismatch { position, .. }
            | SchemaError::InvalidDefault { position, .. }
            | SchemaError::InvalidType { position, .. }
            | SchemaError::DuplicateEnumValue { position, .. } => Some(position),
            SchemaError::Document(_) => None,
        }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        SchemaError::Document(err.to_string())
    }
}

impl From<toml::de::Error> for SchemaError {
    fn from(err: toml::de::Error) -> Self {
        SchemaError::Document(err.to_string())
    }
}
