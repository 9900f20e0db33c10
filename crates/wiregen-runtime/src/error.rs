//! Error types for the reference runtime

use thiserror::Error;

/// Result type alias for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Validation failure while building a single object.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("'{field}' must not be null")]
    NullField { field: String },

    #[error("'{field}' must not be empty")]
    EmptyRepeated { field: String },

    #[error("'{field}' must not contain null")]
    NullElement { field: String },

    #[error("'{field}' is not the expected length ({expected}), got {actual}")]
    Length {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("'{field}' expects {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("{message} takes {expected} arguments, got {actual}")]
    Arity {
        message: String,
        expected: usize,
        actual: usize,
    },

    #[error("{message} is abstract and cannot be instantiated")]
    Abstract { message: String },

    #[error("{message} has no field '{field}'")]
    UnknownField { message: String, field: String },

    #[error("'{field}' of {message} is not mutable")]
    Immutable { message: String, field: String },

    #[error("{message} is constructed through its builder")]
    UsesBuilder { message: String },

    #[error("{message} has no builder")]
    NoBuilder { message: String },

    #[error("{message} has no full-field constructor")]
    NoFullConstructor { message: String },

    #[error("{message} does not support copying")]
    NotCopyable { message: String },
}

/// Why a single field could not be read.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldFault {
    #[error("is not present")]
    Missing,

    #[error("is not {expected}")]
    WrongType { expected: String },

    #[error("is not a {enum_name} - invalid value '{value}'")]
    InvalidEnum { enum_name: String, value: String },

    #[error("is not the expected length ({expected}), got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("could not be converted: {reason}")]
    Converter { reason: String },

    #[error("has no converter registered for {token}")]
    NoConverter { token: String },

    #[error("could not be decoded: {0}")]
    Nested(Box<DecodeError>),
}

/// Failure decoding a wire message into an object.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Fudge message is not a {message} - field '{field}' {fault}")]
    Field {
        message: String,
        field: String,
        fault: FieldFault,
    },

    #[error("Fudge message is not a {message} - no concrete message type in header")]
    Abstract { message: String },

    #[error("{message} needs a decode context")]
    ContextRequired { message: String },
}

impl DecodeError {
    /// The field the failure is attributed to, outermost first.
    pub fn field(&self) -> Option<&str> {
        match self {
            DecodeError::Field { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("unknown message '{0}'")]
    UnknownMessage(String),

    #[error("{message} needs a decode context to encode")]
    ContextRequired { message: String },

    #[error("external value of {token} could not be encoded: {reason}")]
    Encode { token: String, reason: String },
}

impl RuntimeError {
    /// Returns a stable numeric code for diagnostics output
    pub fn error_code(&self) -> u32 {
        match self {
            RuntimeError::Construction(_) => 200,
            RuntimeError::Decode(_) => 201,
            RuntimeError::UnknownMessage(_) => 202,
            RuntimeError::ContextRequired { .. } => 203,
            RuntimeError::Encode { .. } => 204,
        }
    }
}
