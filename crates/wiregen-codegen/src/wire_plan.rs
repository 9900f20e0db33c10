//! Type-directed mapping of fields to wire encode/decode operations.
//!
//! | field type | wire form |
//! |---|---|
//! | scalar | one typed value under the field key |
//! | indicator | presence marker, omitted when false |
//! | enum | integer code, string code, or member label |
//! | flat numeric array | one typed wire array |
//! | any other array | sub-container with one untagged entry per element |
//! | named message | sub-message led by the ordinal-0 type header |
//! | anonymous message | the sub-message itself |
//! | external message or type | delegated to a converter from the decode context |
//!
//! Repeated fields write one occurrence per value under the same key.

use crate::analyzer::Analyzer;
use serde::Serialize;
use wiregen_core::{
    EnumEncoding, EnumId, FieldId, FieldType, MessageId, MessageRef, PrimitiveKind, TypeDefId,
    WireKey, WireType,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "codec", rename_all = "snake_case")]
pub enum ValueCodec {
    /// Non-temporal scalar.
    Scalar { kind: PrimitiveKind },
    Indicator,
    Temporal { kind: PrimitiveKind },
    Enum { id: EnumId, encoding: EnumEncoding },
    /// Flat numeric array written as one typed wire value.
    PrimitiveArray {
        kind: PrimitiveKind,
        length: Option<usize>,
    },
    /// Sub-container with one untagged entry per element; absent elements
    /// are written as indicators.
    Container {
        element: Box<ValueCodec>,
        length: Option<usize>,
        deep_fixed: bool,
    },
    /// Untyped sub-message, passed through.
    Anonymous,
    /// Generated message with a polymorphic header.
    Message {
        id: MessageId,
        token: String,
        with_context: bool,
    },
    /// Hand-written message, converted through the decode context.
    ExternalMessage { id: MessageId, token: String },
    /// Hand-written alias of a message-shaped value.
    ExternalUser { id: TypeDefId, token: String },
}

impl ValueCodec {
    /// Whether this value travels through a converter from the decode context.
    pub fn needs_context(&self) -> bool {
        match self {
            ValueCodec::ExternalMessage { .. } | ValueCodec::ExternalUser { .. } => true,
            ValueCodec::Message { with_context, .. } => *with_context,
            ValueCodec::Container { element, .. } => element.needs_context(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCodec {
    pub field: FieldId,
    pub name: String,
    pub key: WireKey,
    pub required: bool,
    pub repeated: bool,
    pub wire_type: WireType,
    pub codec: ValueCodec,
    /// Decode failures are reported wrapped with the message and field name.
    /// Indicators cannot fail a type check, so theirs are not.
    pub wrap_errors: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageCodec {
    pub message: MessageId,
    pub token: String,
    pub base: Option<MessageId>,
    pub with_context: bool,
    /// Fields declared by this message, overrides included, in declaration order.
    pub own: Vec<FieldCodec>,
    /// Every effective field in encode order: own fields first, then each
    /// ancestor's fields not overridden closer to this message.
    pub encode_order: Vec<FieldCodec>,
    /// Ancestor type tokens written by a top-level encode, most-derived first.
    pub header: Vec<String>,
}

impl MessageCodec {
    pub fn field(&self, name: &str) -> Option<&FieldCodec> {
        self.encode_order.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct WirePlanner<'s> {
    analyzer: Analyzer<'s>,
    force_context: bool,
}

impl<'s> WirePlanner<'s> {
    pub fn new(analyzer: Analyzer<'s>, force_context: bool) -> Self {
        Self {
            analyzer,
            force_context,
        }
    }

    /// Whether the message uses the context-threading codec form.
    pub fn with_context(&self, id: MessageId) -> bool {
        self.force_context || self.analyzer.has_external_message_references(id)
    }

    pub fn value_codec(&self, ty: &FieldType) -> ValueCodec {
        let schema = self.analyzer.schema();
        match ty {
            FieldType::Primitive(PrimitiveKind::Indicator) => ValueCodec::Indicator,
            FieldType::Primitive(kind) if kind.is_temporal() => ValueCodec::Temporal { kind: *kind },
            FieldType::Primitive(kind) => ValueCodec::Scalar { kind: *kind },
            FieldType::Enum(id) => ValueCodec::Enum {
                id: *id,
                encoding: schema.enum_def(*id).encoding,
            },
            FieldType::Array(array) => match array.element.as_ref() {
                FieldType::Primitive(kind) if kind.has_wire_array() => ValueCodec::PrimitiveArray {
                    kind: *kind,
                    length: array.fixed_length,
                },
                element => ValueCodec::Container {
                    element: Box::new(self.value_codec(element)),
                    length: array.fixed_length,
                    deep_fixed: array.deep_fixed,
                },
            },
            // A placeholder has no shape of its own; it travels untyped.
            FieldType::Message(MessageRef::Null | MessageRef::Anonymous) => ValueCodec::Anonymous,
            FieldType::Message(MessageRef::Defined(id)) => {
                let token = schema.type_token(*id);
                if schema.message(*id).external {
                    ValueCodec::ExternalMessage { id: *id, token }
                } else {
                    ValueCodec::Message {
                        id: *id,
                        token,
                        with_context: self.with_context(*id),
                    }
                }
            }
            FieldType::User(id) => {
                let def = schema.type_def(*id);
                if def.external && def.underlying.wire_type(schema) == WireType::SubMessage {
                    ValueCodec::ExternalUser {
                        id: *id,
                        token: schema.type_def_token(*id),
                    }
                } else {
                    self.value_codec(&def.underlying)
                }
            }
        }
    }

    pub fn field_codec(&self, id: FieldId) -> FieldCodec {
        let schema = self.analyzer.schema();
        let field = schema.field(id);
        let codec = self.value_codec(&field.ty);
        FieldCodec {
            field: id,
            name: field.name.clone(),
            key: field.key.clone(),
            required: field.required,
            repeated: field.repeated,
            wire_type: field.ty.wire_type(schema),
            wrap_errors: codec != ValueCodec::Indicator,
            codec,
        }
    }

    pub fn message_codec(&self, id: MessageId) -> MessageCodec {
        let schema = self.analyzer.schema();
        let message = schema.message(id);
        let effective = &message.override_map;

        let own = schema
            .own_fields(id)
            .map(|(fid, _)| self.field_codec(fid))
            .collect();

        let mut encode_order = Vec::with_capacity(effective.len());
        let mut current = Some(id);
        while let Some(level) = current {
            for (fid, field) in schema.own_fields(level) {
                if effective.get(&field.name) == Some(&fid) {
                    encode_order.push(self.field_codec(fid));
                }
            }
            current = schema.message(level).extends;
        }

        let header = match message.extends {
            Some(_) => schema
                .chain(id)
                .into_iter()
                .rev()
                .map(|m| schema.type_token(m))
                .collect(),
            None => Vec::new(),
        };

        MessageCodec {
            message: id,
            token: schema.type_token(id),
            base: message.extends,
            with_context: self.with_context(id),
            own,
            encode_order,
            header,
        }
    }
}

#[cfg(test)]
#[path = "wire_plan/wire_plan_tests.rs"]
mod wire_plan_tests;
