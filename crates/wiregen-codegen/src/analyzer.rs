//! Structural queries over a resolved schema.
//!
//! Every answer is a pure function of the read-only model. Traversals of the
//! field-type graph carry a visited set keyed by message identity, since
//! messages may reference themselves or each other.

use std::collections::HashSet;
use tracing::trace;
use wiregen_core::{FieldType, MessageId, MessageRef, PrimitiveKind, Schema, WireType};

#[derive(Debug, Clone, Copy)]
pub struct Analyzer<'s> {
    schema: &'s Schema,
}

impl<'s> Analyzer<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Whether encoding or decoding the message can reach an external message.
    ///
    /// True when the message or an ancestor is external, or when any field
    /// type leads to one through arrays, aliases or nested messages.
    pub fn has_external_message_references(&self, id: MessageId) -> bool {
        let mut visited = HashSet::new();
        let found = self.reaches_external(id, &mut visited);
        trace!(message = %self.schema.qualified_name(id), found, "external reference scan");
        found
    }

    fn reaches_external(&self, id: MessageId, visited: &mut HashSet<MessageId>) -> bool {
        if !visited.insert(id) {
            return false;
        }
        let message = self.schema.message(id);
        if message.external {
            return true;
        }
        if let Some(base) = message.extends
            && self.reaches_external(base, visited)
        {
            return true;
        }
        self.schema
            .own_fields(id)
            .any(|(_, field)| self.type_reaches_external(&field.ty, visited))
    }

    fn type_reaches_external(&self, ty: &FieldType, visited: &mut HashSet<MessageId>) -> bool {
        match ty {
            FieldType::Primitive(_) | FieldType::Enum(_) => false,
            FieldType::Message(MessageRef::Null | MessageRef::Anonymous) => false,
            FieldType::Message(MessageRef::Defined(id)) => self.reaches_external(*id, visited),
            FieldType::Array(array) => self.type_reaches_external(&array.element, visited),
            FieldType::User(id) => {
                let def = self.schema.type_def(*id);
                (def.external && def.underlying.wire_type(self.schema) == WireType::SubMessage)
                    || self.type_reaches_external(&def.underlying, visited)
            }
        }
    }

    /// Whether the message is built through a companion builder.
    ///
    /// Judged on the effective field set, so an overriding definition decides
    /// for its field. A message whose base uses a builder uses one too.
    pub fn use_builder_pattern(&self, id: MessageId) -> bool {
        let own = self
            .schema
            .effective_fields(id)
            .iter()
            .any(|(_, f)| !f.mutable && (!f.required || f.default.is_some()));
        own || self
            .schema
            .message(id)
            .extends
            .is_some_and(|base| self.use_builder_pattern(base))
    }

    /// Whether instances expose a deep copy.
    pub fn use_copy_constructor(&self, id: MessageId) -> bool {
        let message = self.schema.message(id);
        message.external
            || message
                .extends
                .is_some_and(|base| self.use_copy_constructor(base))
            || message.fields.iter().any(|f| f.mutable)
    }

    /// Whether a copy constructor must exist, either for the message itself or
    /// so that a descendant's copy constructor can chain to it.
    pub fn needs_copy_constructor(&self, id: MessageId) -> bool {
        self.use_copy_constructor(id)
            || self
                .schema
                .subclasses(id)
                .into_iter()
                .any(|sub| self.needs_copy_constructor(sub))
    }

    /// Values of this type are references that may be null.
    pub fn is_object(&self, ty: &FieldType) -> bool {
        match ty {
            FieldType::Primitive(kind) => {
                *kind == PrimitiveKind::String || kind.is_temporal()
            }
            FieldType::Array(_) | FieldType::Enum(_) | FieldType::Message(_) => true,
            FieldType::User(id) => self.is_object(&self.schema.type_def(*id).underlying),
        }
    }

    /// Values of this type are mutable references that must never be aliased.
    pub fn is_big_object(&self, ty: &FieldType) -> bool {
        match ty {
            FieldType::Primitive(_) | FieldType::Enum(_) => false,
            FieldType::Array(_) => true,
            FieldType::Message(MessageRef::Null | MessageRef::Anonymous) => false,
            FieldType::Message(MessageRef::Defined(_)) => true,
            FieldType::User(id) => self.is_big_object(&self.schema.type_def(*id).underlying),
        }
    }
}

#[cfg(test)]
#[path = "analyzer/analyzer_tests.rs"]
mod analyzer_tests;
