//! Defensive-copy and validation plans for field assignment.
//!
//! Constructors, builders, copy constructors and mutators all store values
//! through an [`AssignmentPlan`], so the copy policy for a field is decided
//! in exactly one place.

use crate::analyzer::Analyzer;
use serde::Serialize;
use wiregen_core::{FieldId, FieldType, MessageId, MessageRef, PrimitiveKind};

/// How a value is made safe to store in an immutable slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CopyPlan {
    /// Store the value as given.
    Alias,
    /// Store a deep copy made by the message's own copy operation.
    Clone { message: MessageId },
    /// Convert from the provider representation to the stored one.
    ConvertTemporal { temporal: PrimitiveKind },
    /// Copy the array, validating its length on the way.
    Array(ArrayCopy),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArrayCopy {
    /// Length required at this dimension.
    pub length: Option<usize>,
    /// Elements need their own copy; null elements are skipped.
    pub per_element: bool,
    pub element: Box<CopyPlan>,
}

impl CopyPlan {
    pub fn is_alias(&self) -> bool {
        matches!(self, CopyPlan::Alias)
    }
}

/// Validation and copy applied whenever a field is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentPlan {
    pub field: FieldId,
    pub name: String,
    /// Null is rejected.
    pub reject_null: bool,
    /// Set for repeated fields; the copy applies per element.
    pub repeated: Option<RepeatedCheck>,
    pub copy: CopyPlan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepeatedCheck {
    pub reject_empty: bool,
    pub reject_null_elements: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CopyPlanner<'s> {
    analyzer: Analyzer<'s>,
}

impl<'s> CopyPlanner<'s> {
    pub fn new(analyzer: Analyzer<'s>) -> Self {
        Self { analyzer }
    }

    /// Plan the copy for a value of `ty`.
    ///
    /// Never descends into message definitions, so self-referential types
    /// terminate.
    pub fn plan(&self, ty: &FieldType) -> CopyPlan {
        let schema = self.analyzer.schema();
        match ty {
            FieldType::Primitive(kind) if kind.is_temporal() => {
                CopyPlan::ConvertTemporal { temporal: *kind }
            }
            FieldType::Primitive(_) | FieldType::Enum(_) => CopyPlan::Alias,
            FieldType::Message(MessageRef::Null | MessageRef::Anonymous) => CopyPlan::Alias,
            FieldType::Message(MessageRef::Defined(id)) => {
                if self.analyzer.use_copy_constructor(*id) {
                    CopyPlan::Clone { message: *id }
                } else {
                    CopyPlan::Alias
                }
            }
            FieldType::User(id) => {
                let def = schema.type_def(*id);
                if def.external {
                    CopyPlan::Alias
                } else {
                    self.plan(&def.underlying)
                }
            }
            // Opaque elements are shared as given; the array itself is still
            // copied so its length is checked.
            FieldType::Array(array) => CopyPlan::Array(ArrayCopy {
                length: array.fixed_length,
                per_element: !self.is_opaque(&array.element)
                    && self.analyzer.is_big_object(&array.element),
                element: Box::new(self.plan(&array.element)),
            }),
        }
    }

    fn is_opaque(&self, ty: &FieldType) -> bool {
        matches!(ty, FieldType::User(id) if self.analyzer.schema().type_def(*id).external)
    }

    /// The assignment plan for a field, taken from its effective definition.
    pub fn assignment(&self, id: FieldId) -> AssignmentPlan {
        let field = self.analyzer.schema().field(id);
        let repeated = field.repeated.then_some(RepeatedCheck {
            reject_empty: field.required,
            reject_null_elements: true,
        });
        AssignmentPlan {
            field: id,
            name: field.name.clone(),
            reject_null: field.required && !field.ty.is_indicator(),
            repeated,
            copy: self.plan(&field.ty),
        }
    }
}
