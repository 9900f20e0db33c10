//! Dynamic values held by runtime objects.
//!
//! Arrays and objects are shared references, so aliasing is observable: a
//! defensive copy yields a different [`ArrayRef`] or [`ObjectRef`], an alias
//! the same one.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use wiregen_core::MessageId;
use wiregen_transport::{WireMessage, WireValue};

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Date(time::Date),
    Time(time::Time),
    DateTime(time::PrimitiveDateTime),
    /// Member label of an enum.
    Enum(String),
    Array(ArrayRef),
    /// Values of a repeated field, in order.
    List(Vec<Value>),
    Object(ObjectRef),
    /// Untyped sub-message.
    Anonymous(WireMessage),
    External(ExternalValue),
}

impl Value {
    pub fn array(values: Vec<Value>) -> Self {
        Value::Array(ArrayRef::new(values))
    }

    pub fn list(values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }

    pub fn enum_label(label: impl Into<String>) -> Self {
        Value::Enum(label.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::Enum(_) => "enum",
            Value::Array(_) => "array",
            Value::List(_) => "list",
            Value::Object(_) => "message",
            Value::Anonymous(_) => "anonymous message",
            Value::External(_) => "external value",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => {
                (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
            }
            (Value::Double(a), Value::Double(b)) => {
                (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
            }
            (Value::String(a), Value::String(b)) | (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b) || a.snapshot() == b.snapshot(),
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.same_state(b),
            (Value::Anonymous(a), Value::Anonymous(b)) => a == b,
            (Value::External(a), Value::External(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from!(
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    time::Date => Date,
    time::Time => Time,
    time::PrimitiveDateTime => DateTime,
    ObjectRef => Object,
    ArrayRef => Array,
    WireMessage => Anonymous,
    ExternalValue => External,
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A shared, mutable array.
#[derive(Debug, Clone, Default)]
pub struct ArrayRef(Arc<RwLock<Vec<Value>>>);

impl ArrayRef {
    pub fn new(values: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(values)))
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// Replace one element in place; visible through every alias.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.0.write().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A hand-written value the runtime only passes through.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalValue {
    pub token: String,
    pub payload: WireValue,
}

impl ExternalValue {
    pub fn new(token: impl Into<String>, payload: WireValue) -> Self {
        Self {
            token: token.into(),
            payload,
        }
    }
}

/// One message instance: its concrete type and one slot per effective field.
#[derive(Debug)]
pub struct Instance {
    message: MessageId,
    name: String,
    slots: RwLock<IndexMap<String, Value>>,
}

pub type ObjectRef = Arc<Instance>;

impl Instance {
    pub(crate) fn new(message: MessageId, name: String, slots: IndexMap<String, Value>) -> ObjectRef {
        Arc::new(Self {
            message,
            name,
            slots: RwLock::new(slots),
        })
    }

    /// The concrete message this instance was built as.
    pub fn message(&self) -> MessageId {
        self.message
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, field: &str) -> Option<Value> {
        self.slots.read().get(field).cloned()
    }

    pub(crate) fn set(&self, field: &str, value: Value) {
        if let Some(slot) = self.slots.write().get_mut(field) {
            *slot = value;
        }
    }

    pub fn fields(&self) -> Vec<(String, Value)> {
        self.slots
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn same_state(&self, other: &Instance) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.message == other.message && *self.slots.read() == *other.slots.read()
    }
}

// ============================================================================
// Rendering
// ============================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Double(v) => write!(f, "{v:?}"),
            Value::String(v) | Value::Enum(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::Array(a) => write_list(f, &a.snapshot()),
            Value::List(values) => write_list(f, values),
            Value::Object(o) => write!(f, "{o}"),
            Value::Anonymous(m) => write_wire_message(f, m),
            Value::External(e) => write!(f, "{}({:?})", e.token, e.payload),
        }
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.name)?;
        for (i, (name, value)) in self.slots.read().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str("]")
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    f.write_str("[")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{value}")?;
    }
    f.write_str("]")
}

fn write_wire_message(f: &mut fmt::Formatter<'_>, message: &WireMessage) -> fmt::Result {
    f.write_str("FudgeMsg[")?;
    for (i, field) in message.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        match (&field.name, field.ordinal) {
            (Some(name), _) => write!(f, "{name}=")?,
            (None, Some(ordinal)) => write!(f, "{ordinal}=")?,
            (None, None) => {}
        }
        match &field.value {
            WireValue::Message(inner) => write_wire_message(f, inner)?,
            other => write!(f, "{other:?}")?,
        }
    }
    f.write_str("]")
}
