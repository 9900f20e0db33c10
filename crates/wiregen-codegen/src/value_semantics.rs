//! Structural equality, hashing and string rendering.
//!
//! Equality and hashing walk the same field list: the message's own fields in
//! declaration order, then the base message's. Instances of different
//! concrete messages are never equal.

use serde::Serialize;
use wiregen_core::{FieldId, FieldType, MessageId, Schema};

/// Seed of the hash chain for a message without a base.
pub const HASH_SEED: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemanticField {
    pub field: FieldId,
    pub name: String,
    /// Compared element by element rather than by reference.
    pub array: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueSemantics {
    pub message: MessageId,
    pub name: String,
    /// Fields this message declares, overrides included.
    pub fields: Vec<SemanticField>,
    /// Equality and hashing continue into this message's own semantics.
    pub base: Option<MessageId>,
}

impl ValueSemantics {
    pub fn plan(schema: &Schema, id: MessageId) -> Self {
        let fields = schema
            .own_fields(id)
            .map(|(fid, f)| SemanticField {
                field: fid,
                name: f.name.clone(),
                array: matches!(f.ty.underlying(schema), FieldType::Array(_)),
            })
            .collect();
        Self {
            message: id,
            name: schema.message(id).name.clone(),
            fields,
            base: schema.message(id).extends,
        }
    }

    /// One step of the hash chain: `hc * 31 + component`, wrapping.
    pub fn combine(hc: i32, component: i32) -> i32 {
        hc.wrapping_mul(31).wrapping_add(component)
    }

    /// Folds component hashes in field order onto `seed`.
    pub fn fold(seed: i32, components: impl IntoIterator<Item = i32>) -> i32 {
        components.into_iter().fold(seed, Self::combine)
    }

    /// `Name[a=1, b=2]`
    pub fn render<I, S>(&self, parts: I) -> String
    where
        I: IntoIterator<Item = (S, String)>,
        S: AsRef<str>,
    {
        let body: Vec<String> = parts
            .into_iter()
            .map(|(name, value)| format!("{}={value}", name.as_ref()))
            .collect();
        format!("{}[{}]", self.name, body.join(", "))
    }
}
