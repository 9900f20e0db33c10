//! wiregen-codegen - Planning and code generation over a resolved schema
//!
//! The pipeline runs in two stages:
//!
//! ```text
//! Schema (resolved)
//!     ↓
//!  [Analyzer] → copy plans, constructor plans, wire codecs, value semantics
//!     ↓
//!  SchemaPlan
//!     ↓
//!  ├─→ [Java backend] → *.java
//!  └─→ [JSON-Schema backend] → *.schema.json
//! ```
//!
//! Every decision a backend renders is made once in [`SchemaPlan`], so all
//! backends, and the reference runtime, agree on constructor shapes, copy
//! policy, wire mapping and equality.

pub mod analyzer;
pub mod backend;
pub mod constructor;
pub mod copy_plan;
mod error;
pub mod naming;
pub mod plan;
pub mod value_semantics;
pub mod wire_plan;

#[cfg(test)]
mod fixtures;

pub use analyzer::Analyzer;
pub use backend::{Backend, Capabilities, GeneratedFile, backend_for, write_files};
pub use constructor::{
    BuilderPlan, ConstructorPlan, ConstructorShape, CopyConstructor, WireDecodeConstructor,
};
pub use copy_plan::{AssignmentPlan, CopyPlan, CopyPlanner};
pub use error::{CodegenError, CodegenResult};
pub use plan::{DecoderRegistry, MessagePlan, PlanOptions, SchemaPlan};
pub use value_semantics::ValueSemantics;
pub use wire_plan::{FieldCodec, MessageCodec, ValueCodec, WirePlanner};
