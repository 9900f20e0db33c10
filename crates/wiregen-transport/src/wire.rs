//! Self-describing wire messages
//!
//! A [`WireMessage`] is an ordered list of fields. Each field carries an
//! optional name, an optional ordinal and a typed [`WireValue`]. Fields with
//! neither are the entries of a sub-container (array elements).

use serde::{Deserialize, Serialize};
use wiregen_core::{WireKey, WireType};

/// Ordinal reserved for the list of concrete type names written ahead of a
/// sub-message's own fields.
pub const HEADER_ORDINAL: i16 = 0;

/// A single typed value on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum WireValue {
    /// Zero-payload presence marker
    Indicator,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    ByteArray(Vec<i8>),
    ShortArray(Vec<i16>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    Date(time::Date),
    Time(time::Time),
    DateTime(time::PrimitiveDateTime),
    Message(WireMessage),
}

impl WireValue {
    pub fn wire_type(&self) -> WireType {
        match self {
            WireValue::Indicator => WireType::Indicator,
            WireValue::Bool(_) => WireType::Bool,
            WireValue::Byte(_) => WireType::Byte,
            WireValue::Short(_) => WireType::Short,
            WireValue::Int(_) => WireType::Int,
            WireValue::Long(_) => WireType::Long,
            WireValue::Float(_) => WireType::Float,
            WireValue::Double(_) => WireType::Double,
            WireValue::String(_) => WireType::String,
            WireValue::ByteArray(_) => WireType::ByteArray,
            WireValue::ShortArray(_) => WireType::ShortArray,
            WireValue::IntArray(_) => WireType::IntArray,
            WireValue::LongArray(_) => WireType::LongArray,
            WireValue::FloatArray(_) => WireType::FloatArray,
            WireValue::DoubleArray(_) => WireType::DoubleArray,
            WireValue::Date(_) => WireType::Date,
            WireValue::Time(_) => WireType::Time,
            WireValue::DateTime(_) => WireType::DateTime,
            WireValue::Message(_) => WireType::SubMessage,
        }
    }

    /// Any integral value, widened to 64 bits
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            WireValue::Byte(v) => Some(i64::from(*v)),
            WireValue::Short(v) => Some(i64::from(*v)),
            WireValue::Int(v) => Some(i64::from(*v)),
            WireValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Any numeric value, widened to a double
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            WireValue::Float(v) => Some(f64::from(*v)),
            WireValue::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&WireMessage> {
        match self {
            WireValue::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_indicator(&self) -> bool {
        matches!(self, WireValue::Indicator)
    }
}

/// One entry of a [`WireMessage`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordinal: Option<i16>,

    pub value: WireValue,
}

impl WireField {
    pub fn matches(&self, key: &WireKey) -> bool {
        match key {
            WireKey::Ordinal(ordinal) => self.ordinal == Some(*ordinal),
            WireKey::Name(name) => self.name.as_deref() == Some(name.as_str()),
        }
    }
}

/// An ordered, self-describing message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    #[serde(default)]
    pub fields: Vec<WireField>,
}

impl WireMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under a field's wire key
    pub fn add(&mut self, key: &WireKey, value: WireValue) {
        let (name, ordinal) = match key {
            WireKey::Ordinal(ordinal) => (None, Some(*ordinal)),
            WireKey::Name(name) => (Some(name.clone()), None),
        };
        self.fields.push(WireField {
            name,
            ordinal,
            value,
        });
    }

    pub fn add_ordinal(&mut self, ordinal: i16, value: WireValue) {
        self.add(&WireKey::Ordinal(ordinal), value);
    }

    pub fn add_named(&mut self, name: impl Into<String>, value: WireValue) {
        self.add(&WireKey::Name(name.into()), value);
    }

    /// Append an untagged entry, as used for sub-container elements
    pub fn push(&mut self, value: WireValue) {
        self.fields.push(WireField {
            name: None,
            ordinal: None,
            value,
        });
    }

    /// First value written under `key`
    pub fn by_key(&self, key: &WireKey) -> Option<&WireValue> {
        self.fields.iter().find(|f| f.matches(key)).map(|f| &f.value)
    }

    /// Every value written under `key`, in wire order
    pub fn all_by_key(&self, key: &WireKey) -> Vec<&WireValue> {
        self.fields
            .iter()
            .filter(|f| f.matches(key))
            .map(|f| &f.value)
            .collect()
    }

    pub fn by_ordinal(&self, ordinal: i16) -> Option<&WireValue> {
        self.by_key(&WireKey::Ordinal(ordinal))
    }

    pub fn all_by_ordinal(&self, ordinal: i16) -> Vec<&WireValue> {
        self.all_by_key(&WireKey::Ordinal(ordinal))
    }

    pub fn by_name(&self, name: &str) -> Option<&WireValue> {
        self.fields
            .iter()
            .find(|f| f.name.as_deref() == Some(name))
            .map(|f| &f.value)
    }

    /// Type names of the polymorphic header, most-derived first
    pub fn header_names(&self) -> Vec<&str> {
        self.all_by_ordinal(HEADER_ORDINAL)
            .into_iter()
            .filter_map(WireValue::as_str)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WireField> {
        self.fields.iter()
    }

    /// Values of every field in order, ignoring keys
    pub fn values(&self) -> impl Iterator<Item = &WireValue> {
        self.fields.iter().map(|f| &f.value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
#[path = "wire/wire_tests.rs"]
mod wire_tests;
