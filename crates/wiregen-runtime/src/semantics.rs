//! Structural equality, hashing and rendering of runtime objects.
//!
//! Hashes follow the generated Java `hashCode` chain so that a value hashes
//! the same in both worlds: seed 1, then `hc * 31 + component` over each
//! level's own fields, root level first.

use crate::runtime::Runtime;
use crate::value::{ObjectRef, Value};
use wiregen_codegen::ValueSemantics;
use wiregen_codegen::value_semantics::HASH_SEED;
use wiregen_transport::{WireMessage, WireValue};

impl Runtime {
    /// Same concrete message and equal values in every compared field.
    pub fn equals(&self, a: &ObjectRef, b: &ObjectRef) -> bool {
        if std::sync::Arc::ptr_eq(a, b) {
            return true;
        }
        if a.message() != b.message() {
            return false;
        }
        let schema = self.schema();
        schema.chain(a.message()).into_iter().rev().all(|level| {
            self.message_plan(level)
                .semantics
                .fields
                .iter()
                .all(|f| a.get(&f.name) == b.get(&f.name))
        })
    }

    pub fn hash_code(&self, object: &ObjectRef) -> i32 {
        let schema = self.schema();
        let effective = &schema.message(object.message()).override_map;
        let mut hc = HASH_SEED;
        for level in schema.chain(object.message()) {
            for semantic in &self.message_plan(level).semantics.fields {
                // An overridden base declaration holds a zero placeholder.
                if effective.get(&semantic.name) != Some(&semantic.field) {
                    hc = ValueSemantics::combine(hc, 0);
                    continue;
                }
                let value = object.get(&semantic.name).unwrap_or(Value::Null);
                let component = if semantic.array && !schema.field(semantic.field).repeated {
                    ValueSemantics::combine(1, self.hash_value(&value))
                } else {
                    self.hash_value(&value)
                };
                hc = ValueSemantics::combine(hc, component);
            }
        }
        hc
    }

    /// `Name[a=1, b=2]` over every effective field.
    pub fn render(&self, object: &ObjectRef) -> String {
        let plan = self.message_plan(object.message());
        plan.semantics.render(
            object
                .fields()
                .into_iter()
                .map(|(name, value)| (name, value.to_string())),
        )
    }

    fn hash_value(&self, value: &Value) -> i32 {
        match value {
            Value::Null => 0,
            Value::Bool(b) => bool_hash(*b),
            Value::Byte(v) => i32::from(*v),
            Value::Short(v) => i32::from(*v),
            Value::Int(v) => *v,
            Value::Long(v) => long_hash(*v),
            Value::Float(v) => float_hash(*v),
            Value::Double(v) => double_hash(*v),
            Value::String(s) | Value::Enum(s) => string_hash(s),
            Value::Date(v) => string_hash(&v.to_string()),
            Value::Time(v) => string_hash(&v.to_string()),
            Value::DateTime(v) => string_hash(&v.to_string()),
            Value::Array(array) => {
                ValueSemantics::fold(1, array.snapshot().iter().map(|e| self.hash_value(e)))
            }
            Value::List(values) => ValueSemantics::fold(1, values.iter().map(|e| self.hash_value(e))),
            Value::Object(object) => self.hash_code(object),
            Value::Anonymous(message) => wire_message_hash(message),
            Value::External(external) => ValueSemantics::combine(
                string_hash(&external.token),
                wire_value_hash(&external.payload),
            ),
        }
    }
}

fn bool_hash(b: bool) -> i32 {
    if b { 1231 } else { 1237 }
}

fn long_hash(v: i64) -> i32 {
    let bits = v as u64;
    (bits ^ (bits >> 32)) as i32
}

fn float_hash(v: f32) -> i32 {
    let bits = if v.is_nan() { 0x7fc0_0000 } else { v.to_bits() };
    bits as i32
}

fn double_hash(v: f64) -> i32 {
    let bits = if v.is_nan() {
        0x7ff8_0000_0000_0000
    } else {
        v.to_bits()
    };
    (bits ^ (bits >> 32)) as i32
}

/// `s[0]*31^(n-1) + ... + s[n-1]` over UTF-16 code units.
pub(crate) fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |hc, unit| ValueSemantics::combine(hc, i32::from(unit)))
}

fn wire_message_hash(message: &WireMessage) -> i32 {
    ValueSemantics::fold(
        1,
        message.iter().map(|field| {
            let key = match (&field.name, field.ordinal) {
                (Some(name), _) => string_hash(name),
                (None, Some(ordinal)) => i32::from(ordinal),
                (None, None) => 0,
            };
            ValueSemantics::combine(key, wire_value_hash(&field.value))
        }),
    )
}

fn wire_value_hash(value: &WireValue) -> i32 {
    match value {
        WireValue::Indicator => 0,
        WireValue::Bool(b) => bool_hash(*b),
        WireValue::Byte(v) => i32::from(*v),
        WireValue::Short(v) => i32::from(*v),
        WireValue::Int(v) => *v,
        WireValue::Long(v) => long_hash(*v),
        WireValue::Float(v) => float_hash(*v),
        WireValue::Double(v) => double_hash(*v),
        WireValue::String(s) => string_hash(s),
        WireValue::ByteArray(v) => ValueSemantics::fold(1, v.iter().map(|x| i32::from(*x))),
        WireValue::ShortArray(v) => ValueSemantics::fold(1, v.iter().map(|x| i32::from(*x))),
        WireValue::IntArray(v) => ValueSemantics::fold(1, v.iter().copied()),
        WireValue::LongArray(v) => ValueSemantics::fold(1, v.iter().map(|x| long_hash(*x))),
        WireValue::FloatArray(v) => ValueSemantics::fold(1, v.iter().map(|x| float_hash(*x))),
        WireValue::DoubleArray(v) => ValueSemantics::fold(1, v.iter().map(|x| double_hash(*x))),
        WireValue::Date(v) => string_hash(&v.to_string()),
        WireValue::Time(v) => string_hash(&v.to_string()),
        WireValue::DateTime(v) => string_hash(&v.to_string()),
        WireValue::Message(m) => wire_message_hash(m),
    }
}

#[cfg(test)]
#[path = "semantics/semantics_tests.rs"]
mod semantics_tests;
