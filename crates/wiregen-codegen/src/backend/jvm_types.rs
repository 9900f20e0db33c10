//! JVM type mappings for the Java backend.
//!
//! # Type Mappings
//!
//! | Schema | Java (required) | Java (optional) | repeated |
//! |--------|-----------------|-----------------|----------|
//! | `string` | `String` | `String` | `List<String>` |
//! | `bool` | `boolean` | `Boolean` | `List<Boolean>` |
//! | `int` | `int` | `Integer` | `List<Integer>` |
//! | `long` | `long` | `Long` | `List<Long>` |
//! | `double` | `double` | `Double` | `List<Double>` |
//! | `indicator` | `boolean` | `boolean` | `List<Boolean>` |
//! | `int[]` | `int[]` | `int[]` | `List<int[]>` |
//! | `date` | configured stored type | same | `List<..>` |
//! | `message` | `FudgeMsg` | `FudgeMsg` | `List<FudgeMsg>` |

use super::Capabilities;
use wiregen_core::{FieldDefinition, FieldType, MessageRef, PrimitiveKind, Schema, WireType};

/// Represents a JVM type with both primitive and boxed forms.
#[derive(Debug, Clone, PartialEq)]
pub struct JvmType {
    /// The primitive type name (e.g., "int", "boolean") or reference type name.
    pub primitive: String,
    /// The boxed/nullable type name (e.g., "Integer", "Boolean").
    pub boxed: String,
    /// Whether this type is a primitive.
    pub is_primitive: bool,
}

impl JvmType {
    /// Create a new JVM type with the same primitive and boxed form.
    pub fn reference(name: &str) -> Self {
        Self {
            primitive: name.to_string(),
            boxed: name.to_string(),
            is_primitive: false,
        }
    }

    /// Create a new JVM primitive type.
    pub fn primitive(primitive: &str, boxed: &str) -> Self {
        Self {
            primitive: primitive.to_string(),
            boxed: boxed.to_string(),
            is_primitive: true,
        }
    }

    /// Get the appropriate Java type string.
    ///
    /// For optional fields, returns the boxed type to allow null.
    /// For required fields, returns the primitive type for efficiency.
    pub fn java_type(&self, optional: bool) -> &str {
        if optional && self.is_primitive {
            &self.boxed
        } else {
            &self.primitive
        }
    }
}

/// Map a schema field type to a JVM type.
pub fn map_field_type(ty: &FieldType, schema: &Schema, caps: &Capabilities) -> JvmType {
    match ty {
        FieldType::Primitive(kind) => map_primitive(*kind, caps),
        FieldType::Array(array) => {
            let element = map_field_type(&array.element, schema, caps);
            JvmType::reference(&format!("{}[]", element.primitive))
        }
        FieldType::Enum(id) => JvmType::reference(&schema.qualified_enum_name(*id)),
        FieldType::Message(MessageRef::Null) => JvmType::reference("Object"),
        FieldType::Message(MessageRef::Anonymous) => JvmType::reference("FudgeMsg"),
        FieldType::Message(MessageRef::Defined(id)) => {
            JvmType::reference(&schema.qualified_name(*id))
        }
        FieldType::User(id) => {
            let def = schema.type_def(*id);
            if def.external && def.underlying.wire_type(schema) == WireType::SubMessage {
                JvmType::reference(&schema.type_def_token(*id))
            } else {
                map_field_type(&def.underlying, schema, caps)
            }
        }
    }
}

fn map_primitive(kind: PrimitiveKind, caps: &Capabilities) -> JvmType {
    match kind {
        PrimitiveKind::Bool | PrimitiveKind::Indicator => JvmType::primitive("boolean", "Boolean"),
        PrimitiveKind::Byte => JvmType::primitive("byte", "Byte"),
        PrimitiveKind::Short => JvmType::primitive("short", "Short"),
        PrimitiveKind::Int => JvmType::primitive("int", "Integer"),
        PrimitiveKind::Long => JvmType::primitive("long", "Long"),
        PrimitiveKind::Float => JvmType::primitive("float", "Float"),
        PrimitiveKind::Double => JvmType::primitive("double", "Double"),
        PrimitiveKind::String => JvmType::reference("String"),
        PrimitiveKind::Date => JvmType::reference(&caps.temporal.date.stored),
        PrimitiveKind::Time => JvmType::reference(&caps.temporal.time.stored),
        PrimitiveKind::DateTime => JvmType::reference(&caps.temporal.datetime.stored),
    }
}

/// Whether the stored slot may hold null.
///
/// Indicators are plain flags; other fields are nullable when optional and
/// without a default.
pub fn is_nullable(field: &FieldDefinition) -> bool {
    !field.ty.is_indicator() && !field.required && field.default.is_none()
}

/// The declared Java type of a field's storage slot and accessor.
pub fn field_java_type(field: &FieldDefinition, schema: &Schema, caps: &Capabilities) -> String {
    let jvm = map_field_type(&field.ty, schema, caps);
    if field.repeated {
        format!("java.util.List<{}>", jvm.boxed)
    } else {
        jvm.java_type(is_nullable(field)).to_string()
    }
}

/// The type callers pass for a single value of `ty`; temporal values arrive
/// as their provider type.
pub fn parameter_type(ty: &FieldType, schema: &Schema, caps: &Capabilities) -> JvmType {
    match ty.underlying(schema) {
        FieldType::Primitive(PrimitiveKind::Date) => JvmType::reference(&caps.temporal.date.provider),
        FieldType::Primitive(PrimitiveKind::Time) => JvmType::reference(&caps.temporal.time.provider),
        FieldType::Primitive(PrimitiveKind::DateTime) => {
            JvmType::reference(&caps.temporal.datetime.provider)
        }
        _ => map_field_type(ty, schema, caps),
    }
}

/// The zero value Java gives an unassigned slot of this type.
pub fn zero_value(java_type: &str) -> &'static str {
    match java_type {
        "boolean" => "false",
        "byte" => "(byte) 0",
        "short" => "(short) 0",
        "int" => "0",
        "long" => "0L",
        "float" => "0f",
        "double" => "0d",
        _ => "null",
    }
}
