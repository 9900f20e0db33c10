//! Field types and their wire-level representation

use crate::model::{EnumEncoding, EnumId, MessageId, Schema, TypeDefId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar kinds a field can hold directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    Date,
    Time,
    DateTime,
    /// Presence-only flag, no payload on the wire.
    Indicator,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 12] = [
        PrimitiveKind::Bool,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::String,
        PrimitiveKind::Date,
        PrimitiveKind::Time,
        PrimitiveKind::DateTime,
        PrimitiveKind::Indicator,
    ];

    /// The keyword used for this kind in type expressions.
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
            PrimitiveKind::String => "string",
            PrimitiveKind::Date => "date",
            PrimitiveKind::Time => "time",
            PrimitiveKind::DateTime => "datetime",
            PrimitiveKind::Indicator => "indicator",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.keyword() == keyword)
    }

    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Date | PrimitiveKind::Time | PrimitiveKind::DateTime
        )
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Int | PrimitiveKind::Long
        )
    }

    /// Whether a flat array of this kind travels as a single typed wire array.
    ///
    /// Everything else is written as a sub-message with one entry per element.
    pub fn has_wire_array(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Byte
                | PrimitiveKind::Short
                | PrimitiveKind::Int
                | PrimitiveKind::Long
                | PrimitiveKind::Float
                | PrimitiveKind::Double
        )
    }

    pub fn wire_type(self) -> WireType {
        match self {
            PrimitiveKind::Bool => WireType::Bool,
            PrimitiveKind::Byte => WireType::Byte,
            PrimitiveKind::Short => WireType::Short,
            PrimitiveKind::Int => WireType::Int,
            PrimitiveKind::Long => WireType::Long,
            PrimitiveKind::Float => WireType::Float,
            PrimitiveKind::Double => WireType::Double,
            PrimitiveKind::String => WireType::String,
            PrimitiveKind::Date => WireType::Date,
            PrimitiveKind::Time => WireType::Time,
            PrimitiveKind::DateTime => WireType::DateTime,
            PrimitiveKind::Indicator => WireType::Indicator,
        }
    }

    /// Wire type of a flat array of this kind, when one exists.
    pub fn array_wire_type(self) -> Option<WireType> {
        match self {
            PrimitiveKind::Byte => Some(WireType::ByteArray),
            PrimitiveKind::Short => Some(WireType::ShortArray),
            PrimitiveKind::Int => Some(WireType::IntArray),
            PrimitiveKind::Long => Some(WireType::LongArray),
            PrimitiveKind::Float => Some(WireType::FloatArray),
            PrimitiveKind::Double => Some(WireType::DoubleArray),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One array dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayType {
    pub element: Box<FieldType>,
    /// Length required at this dimension.
    pub fixed_length: Option<usize>,
    /// Every dimension from here down to the element is fixed.
    pub deep_fixed: bool,
}

impl ArrayType {
    pub fn new(element: FieldType, fixed_length: Option<usize>) -> Self {
        let inner_fixed = match &element {
            FieldType::Array(inner) => inner.deep_fixed,
            _ => true,
        };
        Self {
            deep_fixed: fixed_length.is_some() && inner_fixed,
            element: Box::new(element),
            fixed_length,
        }
    }

    /// Declared lengths, outermost dimension first.
    pub fn dimensions(&self) -> Vec<Option<usize>> {
        let mut dims = vec![self.fixed_length];
        let mut current = self.element.as_ref();
        while let FieldType::Array(inner) = current {
            dims.push(inner.fixed_length);
            current = inner.element.as_ref();
        }
        dims
    }

    /// The non-array type at the bottom of all dimensions.
    pub fn innermost(&self) -> &FieldType {
        let mut current = self.element.as_ref();
        while let FieldType::Array(inner) = current {
            current = inner.element.as_ref();
        }
        current
    }
}

/// Reference to a message type.
///
/// `Null` stands for "no defined message type". Resolution uses it as a
/// placeholder and replaces it before the schema is handed out, so it never
/// reaches a backend. `Anonymous` is the untyped sub-message: any wire
/// container, no class identity. Neither sentinel has fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageRef {
    Null,
    Anonymous,
    Defined(MessageId),
}

impl MessageRef {
    pub fn defined(self) -> Option<MessageId> {
        match self {
            MessageRef::Defined(id) => Some(id),
            MessageRef::Null | MessageRef::Anonymous => None,
        }
    }
}

/// The closed set of field types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Primitive(PrimitiveKind),
    Array(ArrayType),
    Enum(EnumId),
    Message(MessageRef),
    User(TypeDefId),
}

impl FieldType {
    pub fn array(element: FieldType, fixed_length: Option<usize>) -> Self {
        FieldType::Array(ArrayType::new(element, fixed_length))
    }

    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            FieldType::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_indicator(&self) -> bool {
        matches!(self, FieldType::Primitive(PrimitiveKind::Indicator))
    }

    /// Strips user type aliases down to the aliased type.
    pub fn underlying<'a>(&'a self, schema: &'a Schema) -> &'a FieldType {
        let mut current = self;
        while let FieldType::User(id) = current {
            current = &schema.type_def(*id).underlying;
        }
        current
    }

    /// The wire type a value of this field type is written as.
    pub fn wire_type(&self, schema: &Schema) -> WireType {
        match self {
            FieldType::Primitive(kind) => kind.wire_type(),
            FieldType::Array(array) => match array.element.as_ref() {
                FieldType::Primitive(kind) => kind.array_wire_type().unwrap_or(WireType::SubMessage),
                _ => WireType::SubMessage,
            },
            FieldType::Enum(id) => match schema.enum_def(*id).encoding {
                EnumEncoding::Integer => WireType::Int,
                EnumEncoding::Symbolic | EnumEncoding::String => WireType::String,
            },
            FieldType::Message(_) => WireType::SubMessage,
            FieldType::User(id) => schema.type_def(*id).underlying.wire_type(schema),
        }
    }

    /// Renders the type the way it is written in a schema.
    pub fn describe(&self, schema: &Schema) -> String {
        match self {
            FieldType::Primitive(kind) => kind.keyword().to_string(),
            FieldType::Array(array) => {
                let mut out = array.innermost().describe(schema);
                for dim in array.dimensions() {
                    match dim {
                        Some(n) => out.push_str(&format!("[{n}]")),
                        None => out.push_str("[]"),
                    }
                }
                out
            }
            FieldType::Enum(id) => schema.enum_def(*id).name.clone(),
            FieldType::Message(MessageRef::Null) => "null".to_string(),
            FieldType::Message(MessageRef::Anonymous) => "message".to_string(),
            FieldType::Message(MessageRef::Defined(id)) => schema.message(*id).name.clone(),
            FieldType::User(id) => schema.type_def(*id).name.clone(),
        }
    }
}

/// Scalar kind of a single wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireType {
    Indicator,
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    String,
    ByteArray,
    ShortArray,
    IntArray,
    LongArray,
    FloatArray,
    DoubleArray,
    Date,
    Time,
    DateTime,
    SubMessage,
}

impl WireType {
    pub fn name(self) -> &'static str {
        match self {
            WireType::Indicator => "indicator",
            WireType::Bool => "bool",
            WireType::Byte => "byte",
            WireType::Short => "short",
            WireType::Int => "int",
            WireType::Long => "long",
            WireType::Float => "float",
            WireType::Double => "double",
            WireType::String => "string",
            WireType::ByteArray => "byte[]",
            WireType::ShortArray => "short[]",
            WireType::IntArray => "int[]",
            WireType::LongArray => "long[]",
            WireType::FloatArray => "float[]",
            WireType::DoubleArray => "double[]",
            WireType::Date => "date",
            WireType::Time => "time",
            WireType::DateTime => "datetime",
            WireType::SubMessage => "message",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
