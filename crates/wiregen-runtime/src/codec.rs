//! Wire encoding and decoding of runtime objects.
//!
//! Encoding follows each message's planned [`MessageCodec`]: the header,
//! then every effective field most-derived level first. Decoding tries the
//! concrete types named in the header before falling back to the declared
//! type.

use crate::context::DecodeContext;
use crate::error::{DecodeError, FieldFault, RuntimeError, RuntimeResult};
use crate::runtime::Runtime;
use crate::value::{ArrayRef, ObjectRef, Value};
use indexmap::IndexMap;
use tracing::{debug, trace};
use wiregen_codegen::{FieldCodec, MessagePlan, ValueCodec};
use wiregen_core::{EnumCode, EnumEncoding, MessageId, PrimitiveKind};
use wiregen_transport::{HEADER_ORDINAL, WireMessage, WireValue};

impl Runtime {
    pub fn to_wire(&self, object: &ObjectRef) -> RuntimeResult<WireMessage> {
        self.encode(object, None)
    }

    pub fn to_wire_with_context(
        &self,
        object: &ObjectRef,
        context: &DecodeContext,
    ) -> RuntimeResult<WireMessage> {
        self.encode(object, Some(context))
    }

    /// Decode a wire message as `message` or one of its descendants.
    pub fn from_wire(&self, message: &str, wire: &WireMessage) -> RuntimeResult<ObjectRef> {
        self.decode(message, wire, None)
    }

    pub fn from_wire_with_context(
        &self,
        message: &str,
        wire: &WireMessage,
        context: &DecodeContext,
    ) -> RuntimeResult<ObjectRef> {
        self.decode(message, wire, Some(context))
    }

    // ========================================================================
    // Encode
    // ========================================================================

    fn encode(&self, object: &ObjectRef, ctx: Option<&DecodeContext>) -> RuntimeResult<WireMessage> {
        let plan = self.message_plan(object.message());
        if plan.with_context() && ctx.is_none() {
            return Err(RuntimeError::ContextRequired {
                message: plan.qualified_name.clone(),
            });
        }
        let mut wire = WireMessage::new();
        for token in &plan.codec.header {
            wire.add_ordinal(HEADER_ORDINAL, WireValue::String(token.clone()));
        }
        self.encode_fields(plan, object, ctx, &mut wire)?;
        debug!(message = %plan.qualified_name, fields = wire.len(), "encoded message");
        Ok(wire)
    }

    /// Sub-message of static type `declared`; the header names the concrete
    /// chain down to the declared type.
    fn encode_nested(
        &self,
        object: &ObjectRef,
        declared: MessageId,
        ctx: Option<&DecodeContext>,
    ) -> RuntimeResult<WireMessage> {
        let schema = self.schema();
        let mut wire = WireMessage::new();
        for level in schema.chain(object.message()).into_iter().rev() {
            wire.add_ordinal(HEADER_ORDINAL, WireValue::String(schema.type_token(level)));
            if level == declared {
                break;
            }
        }
        self.encode_fields(self.message_plan(object.message()), object, ctx, &mut wire)?;
        Ok(wire)
    }

    fn encode_fields(
        &self,
        plan: &MessagePlan,
        object: &ObjectRef,
        ctx: Option<&DecodeContext>,
        wire: &mut WireMessage,
    ) -> RuntimeResult<()> {
        for field in &plan.codec.encode_order {
            let value = object.get(&field.name).unwrap_or(Value::Null);
            match (&field.codec, value) {
                (_, Value::Null) => {}
                (ValueCodec::Indicator, Value::Bool(present)) => {
                    if present {
                        wire.add(&field.key, WireValue::Indicator);
                    }
                }
                (codec, Value::List(values)) if field.repeated => {
                    for value in values.iter().filter(|v| !v.is_null()) {
                        if matches!(codec, ValueCodec::Indicator) && value.as_bool() != Some(true) {
                            continue;
                        }
                        wire.add(&field.key, self.write_value(field, codec, value, ctx)?);
                    }
                }
                (codec, value) => {
                    wire.add(&field.key, self.write_value(field, codec, &value, ctx)?);
                }
            }
        }
        Ok(())
    }

    fn write_value(
        &self,
        field: &FieldCodec,
        codec: &ValueCodec,
        value: &Value,
        ctx: Option<&DecodeContext>,
    ) -> RuntimeResult<WireValue> {
        let unwritable = || RuntimeError::Encode {
            token: field.name.clone(),
            reason: format!("cannot write a {} value as {}", value.kind(), field.wire_type.name()),
        };
        match (codec, value) {
            (ValueCodec::Indicator, _) => Ok(WireValue::Indicator),
            (ValueCodec::Scalar { .. } | ValueCodec::Temporal { .. }, v) => {
                scalar_to_wire(v).ok_or_else(unwritable)
            }
            (ValueCodec::Enum { id, encoding }, Value::Enum(label)) => {
                let member = self.schema().enum_def(*id).member(label).ok_or_else(unwritable)?;
                Ok(match (encoding, &member.code) {
                    (EnumEncoding::Integer, EnumCode::Int(code)) => WireValue::Int(*code),
                    (EnumEncoding::String, code) => WireValue::String(code.to_string()),
                    _ => WireValue::String(member.label.clone()),
                })
            }
            (ValueCodec::PrimitiveArray { kind, .. }, Value::Array(array)) => {
                primitive_array_to_wire(*kind, &array.snapshot()).ok_or_else(unwritable)
            }
            (ValueCodec::Container { element, .. }, Value::Array(array)) => {
                let mut container = WireMessage::new();
                for item in array.snapshot() {
                    if item.is_null() {
                        container.push(WireValue::Indicator);
                    } else {
                        container.push(self.write_value(field, element, &item, ctx)?);
                    }
                }
                Ok(WireValue::Message(container))
            }
            (ValueCodec::Anonymous, Value::Anonymous(message)) => {
                Ok(WireValue::Message(message.clone()))
            }
            (ValueCodec::Message { id, .. }, Value::Object(object)) => {
                Ok(WireValue::Message(self.encode_nested(object, *id, ctx)?))
            }
            (ValueCodec::ExternalMessage { token, .. }, v) => {
                match self.convert_out(token, v, ctx)? {
                    WireValue::Message(payload) => {
                        let mut wire = WireMessage::new();
                        wire.add_ordinal(HEADER_ORDINAL, WireValue::String(token.clone()));
                        wire.fields.extend(payload.fields);
                        Ok(WireValue::Message(wire))
                    }
                    other => Ok(other),
                }
            }
            (ValueCodec::ExternalUser { token, .. }, v) => self.convert_out(token, v, ctx),
            _ => Err(unwritable()),
        }
    }

    fn convert_out(
        &self,
        token: &str,
        value: &Value,
        ctx: Option<&DecodeContext>,
    ) -> RuntimeResult<WireValue> {
        let encode_error = |reason: String| RuntimeError::Encode {
            token: token.to_string(),
            reason,
        };
        let ctx = ctx.ok_or_else(|| encode_error("no decode context".to_string()))?;
        let converter = ctx
            .converter(token)
            .ok_or_else(|| encode_error("no converter registered".to_string()))?;
        converter.to_wire(value).map_err(encode_error)
    }

    // ========================================================================
    // Decode
    // ========================================================================

    fn decode(
        &self,
        message: &str,
        wire: &WireMessage,
        ctx: Option<&DecodeContext>,
    ) -> RuntimeResult<ObjectRef> {
        let plan = self.message(message)?;
        if plan.with_context() && ctx.is_none() {
            return Err(DecodeError::ContextRequired {
                message: plan.qualified_name.clone(),
            }
            .into());
        }
        Ok(self.decode_as(plan.id, wire, ctx)?)
    }

    /// Polymorphic decode: header candidates first, then the declared type.
    pub(crate) fn decode_as(
        &self,
        declared: MessageId,
        wire: &WireMessage,
        ctx: Option<&DecodeContext>,
    ) -> Result<ObjectRef, DecodeError> {
        let header: Vec<String> = wire.header_names().into_iter().map(String::from).collect();
        for candidate in self.plan().decode_candidates(&header, declared) {
            match self.decode_exact(candidate, wire, ctx) {
                Ok(object) => return Ok(object),
                Err(e) => {
                    trace!(candidate = %self.message_plan(candidate).qualified_name, error = %e, "header candidate rejected");
                }
            }
        }
        let plan = self.message_plan(declared);
        if !plan.instantiable() {
            return Err(DecodeError::Abstract {
                message: plan.name.clone(),
            });
        }
        self.decode_exact(declared, wire, ctx)
    }

    fn decode_exact(
        &self,
        id: MessageId,
        wire: &WireMessage,
        ctx: Option<&DecodeContext>,
    ) -> Result<ObjectRef, DecodeError> {
        let plan = self.message_plan(id);
        let order = &plan.constructor.wire_decode;
        let mut decoded = IndexMap::new();
        // Required fields first, so a missing one is reported before any
        // optional field is looked at.
        for fid in order.required.iter().chain(&order.optional) {
            let Some(field) = plan.codec.encode_order.iter().find(|f| f.field == *fid) else {
                continue;
            };
            decoded.insert(field.name.clone(), self.read_field(plan, field, wire, ctx)?);
        }
        let mut slots = IndexMap::new();
        for (_, definition) in self.schema().effective_fields(id) {
            let value = decoded
                .shift_remove(&definition.name)
                .unwrap_or(Value::Null);
            slots.insert(definition.name.clone(), value);
        }
        Ok(self.instantiate(id, slots))
    }

    fn read_field(
        &self,
        plan: &MessagePlan,
        field: &FieldCodec,
        wire: &WireMessage,
        ctx: Option<&DecodeContext>,
    ) -> Result<Value, DecodeError> {
        let fail = |fault: FieldFault| DecodeError::Field {
            message: plan.name.clone(),
            field: field.name.clone(),
            fault,
        };
        let definition = self.schema().field(field.field);

        if !field.wrap_errors && !field.repeated {
            return Ok(Value::Bool(wire.by_key(&field.key).is_some()));
        }

        if field.repeated {
            let occurrences = wire.all_by_key(&field.key);
            if occurrences.is_empty() {
                return if field.required {
                    Err(fail(FieldFault::Missing))
                } else {
                    Ok(Value::Null)
                };
            }
            let values = occurrences
                .into_iter()
                .map(|v| self.read_value(&field.codec, v, ctx))
                .collect::<Result<Vec<_>, _>>()
                .map_err(fail)?;
            return Ok(Value::List(values));
        }

        match wire.by_key(&field.key) {
            Some(value) => self.read_value(&field.codec, value, ctx).map_err(fail),
            None if field.required => Err(fail(FieldFault::Missing)),
            None => Ok(self.absent(definition)),
        }
    }

    fn read_value(
        &self,
        codec: &ValueCodec,
        value: &WireValue,
        ctx: Option<&DecodeContext>,
    ) -> Result<Value, FieldFault> {
        match codec {
            ValueCodec::Indicator => Ok(Value::Bool(true)),
            ValueCodec::Scalar { kind } | ValueCodec::Temporal { kind } => {
                scalar_from_wire(*kind, value).ok_or_else(|| wrong_type(kind.keyword()))
            }
            ValueCodec::Enum { id, encoding } => {
                let definition = self.schema().enum_def(*id);
                let invalid = |raw: String| FieldFault::InvalidEnum {
                    enum_name: definition.name.clone(),
                    value: raw,
                };
                let member = match encoding {
                    EnumEncoding::Integer => {
                        let code = value
                            .as_i64()
                            .and_then(|v| i32::try_from(v).ok())
                            .ok_or_else(|| wrong_type("an integer enum code"))?;
                        definition
                            .member_by_code(&EnumCode::Int(code))
                            .ok_or_else(|| invalid(code.to_string()))?
                    }
                    EnumEncoding::String => {
                        let code = value.as_str().ok_or_else(|| wrong_type("a string enum code"))?;
                        definition
                            .member_by_code(&EnumCode::Str(code.to_string()))
                            .ok_or_else(|| invalid(code.to_string()))?
                    }
                    EnumEncoding::Symbolic => {
                        let label = value.as_str().ok_or_else(|| wrong_type("an enum label"))?;
                        definition.member(label).ok_or_else(|| invalid(label.to_string()))?
                    }
                };
                Ok(Value::Enum(member.label.clone()))
            }
            ValueCodec::PrimitiveArray { kind, length } => {
                let elements = match (primitive_array_from_wire(value), value) {
                    (Some(elements), _) => elements,
                    (None, WireValue::Message(container)) => container
                        .values()
                        .map(|v| scalar_from_wire(*kind, v))
                        .collect::<Option<Vec<_>>>()
                        .ok_or_else(|| wrong_type(&format!("an array of {}", kind.keyword())))?,
                    (None, _) => return Err(wrong_type(&format!("an array of {}", kind.keyword()))),
                };
                let elements = coerce_elements(*kind, elements)
                    .ok_or_else(|| wrong_type(&format!("an array of {}", kind.keyword())))?;
                check_length(*length, elements.len())?;
                Ok(Value::Array(ArrayRef::new(elements)))
            }
            ValueCodec::Container { element, length, .. } => {
                let container = value.as_message().ok_or_else(|| wrong_type("an array"))?;
                let mut elements = Vec::with_capacity(container.len());
                for item in container.values() {
                    if item.is_indicator() && !matches!(element.as_ref(), ValueCodec::Indicator) {
                        elements.push(Value::Null);
                    } else {
                        elements.push(self.read_value(element, item, ctx)?);
                    }
                }
                check_length(*length, elements.len())?;
                Ok(Value::Array(ArrayRef::new(elements)))
            }
            ValueCodec::Anonymous => value
                .as_message()
                .map(|m| Value::Anonymous(m.clone()))
                .ok_or_else(|| wrong_type("a message")),
            ValueCodec::Message { id, .. } => {
                let message = value.as_message().ok_or_else(|| wrong_type("a message"))?;
                self.decode_as(*id, message, ctx)
                    .map(Value::Object)
                    .map_err(|e| FieldFault::Nested(Box::new(e)))
            }
            ValueCodec::ExternalMessage { token, .. } => {
                let payload = match value {
                    WireValue::Message(message) => WireValue::Message(WireMessage {
                        fields: message
                            .iter()
                            .filter(|f| f.ordinal != Some(HEADER_ORDINAL))
                            .cloned()
                            .collect(),
                    }),
                    other => other.clone(),
                };
                convert_in(token, &payload, ctx)
            }
            ValueCodec::ExternalUser { token, .. } => convert_in(token, value, ctx),
        }
    }
}

fn wrong_type(expected: &str) -> FieldFault {
    FieldFault::WrongType {
        expected: expected.to_string(),
    }
}

fn check_length(expected: Option<usize>, actual: usize) -> Result<(), FieldFault> {
    match expected {
        Some(expected) if expected != actual => Err(FieldFault::Length { expected, actual }),
        _ => Ok(()),
    }
}

fn convert_in(token: &str, value: &WireValue, ctx: Option<&DecodeContext>) -> Result<Value, FieldFault> {
    let converter = ctx
        .and_then(|c| c.converter(token))
        .ok_or_else(|| FieldFault::NoConverter {
            token: token.to_string(),
        })?;
    converter
        .from_wire(value)
        .map_err(|reason| FieldFault::Converter { reason })
}

fn scalar_to_wire(value: &Value) -> Option<WireValue> {
    Some(match value {
        Value::Bool(v) => WireValue::Bool(*v),
        Value::Byte(v) => WireValue::Byte(*v),
        Value::Short(v) => WireValue::Short(*v),
        Value::Int(v) => WireValue::Int(*v),
        Value::Long(v) => WireValue::Long(*v),
        Value::Float(v) => WireValue::Float(*v),
        Value::Double(v) => WireValue::Double(*v),
        Value::String(v) => WireValue::String(v.clone()),
        Value::Date(v) => WireValue::Date(*v),
        Value::Time(v) => WireValue::Time(*v),
        Value::DateTime(v) => WireValue::DateTime(*v),
        _ => return None,
    })
}

/// Integral values are narrowed when they fit; floating kinds accept any number.
fn scalar_from_wire(kind: PrimitiveKind, value: &WireValue) -> Option<Value> {
    match kind {
        PrimitiveKind::Bool => match value {
            WireValue::Bool(b) => Some(Value::Bool(*b)),
            _ => None,
        },
        PrimitiveKind::Indicator => Some(Value::Bool(true)),
        PrimitiveKind::Byte => value.as_i64().and_then(|v| i8::try_from(v).ok()).map(Value::Byte),
        PrimitiveKind::Short => value.as_i64().and_then(|v| i16::try_from(v).ok()).map(Value::Short),
        PrimitiveKind::Int => value.as_i64().and_then(|v| i32::try_from(v).ok()).map(Value::Int),
        PrimitiveKind::Long => value.as_i64().map(Value::Long),
        PrimitiveKind::Float => value.as_f64().map(|v| Value::Float(v as f32)),
        PrimitiveKind::Double => value.as_f64().map(Value::Double),
        PrimitiveKind::String => value.as_str().map(|s| Value::String(s.to_string())),
        PrimitiveKind::Date => match value {
            WireValue::Date(d) => Some(Value::Date(*d)),
            WireValue::DateTime(dt) => Some(Value::Date(dt.date())),
            _ => None,
        },
        PrimitiveKind::Time => match value {
            WireValue::Time(t) => Some(Value::Time(*t)),
            WireValue::DateTime(dt) => Some(Value::Time(dt.time())),
            _ => None,
        },
        PrimitiveKind::DateTime => match value {
            WireValue::DateTime(dt) => Some(Value::DateTime(*dt)),
            _ => None,
        },
    }
}

fn primitive_array_to_wire(kind: PrimitiveKind, values: &[Value]) -> Option<WireValue> {
    macro_rules! collect {
        ($variant:ident, $wire:ident) => {
            values
                .iter()
                .map(|v| match v {
                    Value::$variant(x) => Some(*x),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(WireValue::$wire)
        };
    }
    match kind {
        PrimitiveKind::Byte => collect!(Byte, ByteArray),
        PrimitiveKind::Short => collect!(Short, ShortArray),
        PrimitiveKind::Int => collect!(Int, IntArray),
        PrimitiveKind::Long => collect!(Long, LongArray),
        PrimitiveKind::Float => collect!(Float, FloatArray),
        PrimitiveKind::Double => collect!(Double, DoubleArray),
        _ => None,
    }
}

fn primitive_array_from_wire(value: &WireValue) -> Option<Vec<Value>> {
    Some(match value {
        WireValue::ByteArray(v) => v.iter().copied().map(Value::Byte).collect(),
        WireValue::ShortArray(v) => v.iter().copied().map(Value::Short).collect(),
        WireValue::IntArray(v) => v.iter().copied().map(Value::Int).collect(),
        WireValue::LongArray(v) => v.iter().copied().map(Value::Long).collect(),
        WireValue::FloatArray(v) => v.iter().copied().map(Value::Float).collect(),
        WireValue::DoubleArray(v) => v.iter().copied().map(Value::Double).collect(),
        _ => return None,
    })
}

/// A wire array of another numeric width is converted element by element.
fn coerce_elements(kind: PrimitiveKind, elements: Vec<Value>) -> Option<Vec<Value>> {
    elements
        .into_iter()
        .map(|element| {
            let wire = scalar_to_wire(&element)?;
            scalar_from_wire(kind, &wire)
        })
        .collect()
}

#[cfg(test)]
#[path = "codec/codec_tests.rs"]
mod codec_tests;
