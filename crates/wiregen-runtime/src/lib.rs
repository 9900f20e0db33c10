//! wiregen-runtime - Reference runtime over schema plans
//!
//! This crate provides:
//! - [`Runtime`] for constructing, copying and mutating objects of any
//!   planned message, with the same checks generated code applies
//! - wire encoding and polymorphic decoding through [`Runtime::to_wire`]
//!   and [`Runtime::from_wire`]
//! - structural equality, Java-compatible hashing and rendering
//! - [`DecodeContext`] for converters of external messages and types

mod codec;
mod construct;
mod context;
mod error;
mod runtime;
mod semantics;
mod value;

#[cfg(test)]
mod fixtures;

pub use construct::Builder;
pub use context::{DecodeContext, ExternalConverter, PassThroughConverter};
pub use error::{ConstructionError, DecodeError, FieldFault, RuntimeError, RuntimeResult};
pub use runtime::Runtime;
pub use value::{ArrayRef, ExternalValue, Instance, ObjectRef, Value};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ArrayRef, Builder, DecodeContext, ExternalConverter, ObjectRef, Runtime, RuntimeError,
        RuntimeResult, Value,
    };
}
