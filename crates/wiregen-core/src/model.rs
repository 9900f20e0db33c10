//! The resolved schema model.
//!
//! A [`Schema`] owns every definition of one compilation run in flat arenas;
//! definitions refer to each other by id. Once [`crate::resolve`] returns,
//! the model is read-only.

use crate::error::Position;
use crate::types::FieldType;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub struct $name(pub(crate) u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(
    /// Identity of a message definition within its [`Schema`].
    MessageId
);
arena_id!(EnumId);
arena_id!(TypeDefId);
arena_id!(TaxonomyId);

/// A field addressed by its declaring message and declaration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FieldId {
    pub message: MessageId,
    pub index: u32,
}

/// The tag a field is written under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum WireKey {
    Ordinal(i16),
    Name(String),
}

impl fmt::Display for WireKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireKey::Ordinal(ordinal) => write!(f, "#{ordinal}"),
            WireKey::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// A default value attached to a field declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Label of an enum member.
    Enum(String),
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Bool(b) => write!(f, "{b}"),
            LiteralValue::Integer(i) => write!(f, "{i}"),
            LiteralValue::Float(x) => write!(f, "{x:?}"),
            LiteralValue::String(s) => write!(f, "{s:?}"),
            LiteralValue::Enum(label) => write!(f, "{label}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub key: WireKey,
    pub ty: FieldType,
    pub mutable: bool,
    pub required: bool,
    pub repeated: bool,
    pub default: Option<LiteralValue>,
    /// The closest ancestor field this declaration replaces.
    pub overrides: Option<FieldId>,
    pub position: Position,
}

impl FieldDefinition {
    pub fn is_override(&self) -> bool {
        self.overrides.is_some()
    }

    /// Required and without a default: must be supplied by the caller.
    pub fn must_be_supplied(&self) -> bool {
        self.required && self.default.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct MessageDefinition {
    pub name: String,
    pub enclosing: Option<MessageId>,
    pub position: Position,
    /// Compiled in this run, as opposed to only being referenced.
    pub target: bool,
    pub fields: Vec<FieldDefinition>,
    pub messages: Vec<MessageId>,
    pub enums: Vec<EnumId>,
    pub extends: Option<MessageId>,
    pub is_abstract: bool,
    pub external: bool,
    /// Backend options such as `java.imports`.
    pub bindings: BTreeMap<String, String>,
    /// Every field name visible in this message mapped to its closest
    /// declaration, ordered base-first by first declaration.
    pub override_map: IndexMap<String, FieldId>,
}

/// How enum members travel on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumEncoding {
    /// Member label as a string.
    #[default]
    Symbolic,
    /// Explicit integer code per member.
    Integer,
    /// Explicit string code per member.
    String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum EnumCode {
    Int(i32),
    Str(String),
}

impl fmt::Display for EnumCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnumCode::Int(i) => write!(f, "{i}"),
            EnumCode::Str(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub label: String,
    pub code: EnumCode,
}

#[derive(Debug, Clone)]
pub struct EnumDefinition {
    pub name: String,
    pub enclosing: Option<MessageId>,
    pub position: Position,
    pub target: bool,
    pub encoding: EnumEncoding,
    pub members: Vec<EnumMember>,
    pub bindings: BTreeMap<String, String>,
}

impl EnumDefinition {
    pub fn member(&self, label: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.label == label)
    }

    pub fn member_by_code(&self, code: &EnumCode) -> Option<&EnumMember> {
        self.members.iter().find(|m| &m.code == code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyEntry {
    pub ordinal: i16,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct TaxonomyDefinition {
    pub name: String,
    pub position: Position,
    pub target: bool,
    pub entries: Vec<TaxonomyEntry>,
}

#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub name: String,
    pub enclosing: Option<MessageId>,
    pub position: Position,
    pub underlying: FieldType,
    /// Values are handled by hand-written code, never copied or synthesized.
    pub external: bool,
}

/// One resolved compilation run.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub(crate) namespace: String,
    pub(crate) messages: Vec<MessageDefinition>,
    pub(crate) enums: Vec<EnumDefinition>,
    pub(crate) types: Vec<TypeDefinition>,
    pub(crate) taxonomies: Vec<TaxonomyDefinition>,
}

impl Schema {
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn message(&self, id: MessageId) -> &MessageDefinition {
        &self.messages[id.index()]
    }

    pub fn enum_def(&self, id: EnumId) -> &EnumDefinition {
        &self.enums[id.index()]
    }

    pub fn type_def(&self, id: TypeDefId) -> &TypeDefinition {
        &self.types[id.index()]
    }

    pub fn taxonomy(&self, id: TaxonomyId) -> &TaxonomyDefinition {
        &self.taxonomies[id.index()]
    }

    pub fn field(&self, id: FieldId) -> &FieldDefinition {
        &self.message(id.message).fields[id.index as usize]
    }

    /// All messages in declaration order, enclosing messages before nested ones.
    pub fn messages(&self) -> impl Iterator<Item = (MessageId, &MessageDefinition)> {
        self.messages
            .iter()
            .enumerate()
            .map(|(i, m)| (MessageId(i as u32), m))
    }

    pub fn enums(&self) -> impl Iterator<Item = (EnumId, &EnumDefinition)> {
        self.enums
            .iter()
            .enumerate()
            .map(|(i, e)| (EnumId(i as u32), e))
    }

    pub fn type_defs(&self) -> impl Iterator<Item = (TypeDefId, &TypeDefinition)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, t)| (TypeDefId(i as u32), t))
    }

    pub fn taxonomies(&self) -> impl Iterator<Item = (TaxonomyId, &TaxonomyDefinition)> {
        self.taxonomies
            .iter()
            .enumerate()
            .map(|(i, t)| (TaxonomyId(i as u32), t))
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Dotted name relative to the namespace, e.g. `Outer.Inner`.
    pub fn qualified_name(&self, id: MessageId) -> String {
        let message = self.message(id);
        match message.enclosing {
            Some(outer) => format!("{}.{}", self.qualified_name(outer), message.name),
            None => message.name.clone(),
        }
    }

    pub fn qualified_enum_name(&self, id: EnumId) -> String {
        let def = self.enum_def(id);
        match def.enclosing {
            Some(outer) => format!("{}.{}", self.qualified_name(outer), def.name),
            None => def.name.clone(),
        }
    }

    /// Backend-neutral token identifying a message type on the wire.
    pub fn type_token(&self, id: MessageId) -> String {
        if self.namespace.is_empty() {
            self.qualified_name(id)
        } else {
            format!("{}.{}", self.namespace, self.qualified_name(id))
        }
    }

    pub fn type_def_token(&self, id: TypeDefId) -> String {
        let def = self.type_def(id);
        let local = match def.enclosing {
            Some(outer) => format!("{}.{}", self.qualified_name(outer), def.name),
            None => def.name.clone(),
        };
        if self.namespace.is_empty() {
            local
        } else {
            format!("{}.{local}", self.namespace)
        }
    }

    /// Finds a message by qualified name, with or without the namespace prefix.
    pub fn find_message(&self, name: &str) -> Option<MessageId> {
        let local = name
            .strip_prefix(&self.namespace)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(name);
        self.messages()
            .map(|(id, _)| id)
            .find(|id| self.qualified_name(*id) == local)
    }

    pub fn find_enum(&self, name: &str) -> Option<EnumId> {
        self.enums()
            .map(|(id, _)| id)
            .find(|id| self.qualified_enum_name(*id) == name)
    }

    pub fn find_taxonomy(&self, name: &str) -> Option<TaxonomyId> {
        self.taxonomies()
            .find(|(_, t)| t.name == name)
            .map(|(id, _)| id)
    }

    /// Ancestors of a message, closest first.
    pub fn ancestors(&self, id: MessageId) -> Vec<MessageId> {
        let mut out = Vec::new();
        let mut current = self.message(id).extends;
        while let Some(base) = current {
            out.push(base);
            current = self.message(base).extends;
        }
        out
    }

    /// The inheritance chain from the root ancestor down to `id` inclusive.
    pub fn chain(&self, id: MessageId) -> Vec<MessageId> {
        let mut chain = self.ancestors(id);
        chain.reverse();
        chain.push(id);
        chain
    }

    pub fn extends_from(&self, id: MessageId, ancestor: MessageId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Messages whose `extends` names `id` directly.
    pub fn subclasses(&self, id: MessageId) -> Vec<MessageId> {
        self.messages()
            .filter(|(_, m)| m.extends == Some(id))
            .map(|(sub, _)| sub)
            .collect()
    }

    /// The effective field set of a message: closest definitions, base-first.
    pub fn effective_fields(&self, id: MessageId) -> Vec<(FieldId, &FieldDefinition)> {
        self.message(id)
            .override_map
            .values()
            .map(|fid| (*fid, self.field(*fid)))
            .collect()
    }

    /// Fields declared by the message itself, including overrides.
    pub fn own_fields(&self, id: MessageId) -> impl Iterator<Item = (FieldId, &FieldDefinition)> {
        self.message(id)
            .fields
            .iter()
            .enumerate()
            .map(move |(i, f)| {
                (
                    FieldId {
                        message: id,
                        index: i as u32,
                    },
                    f,
                )
            })
    }

    /// Convenience for tests and backends: the message referenced by a field type.
    pub fn referenced_message(&self, ty: &FieldType) -> Option<MessageId> {
        match ty.underlying(self) {
            FieldType::Message(message) => message.defined(),
            _ => None,
        }
    }
}
