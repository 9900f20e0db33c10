//! Construction, builders, mutators and copies.
//!
//! Every path that stores a field value goes through [`Runtime::assign`],
//! which applies the field's assignment plan: null and emptiness checks, a
//! type check, and the defensive copy.

use crate::error::{ConstructionError, RuntimeResult};
use crate::runtime::Runtime;
use crate::value::{ArrayRef, Instance, ObjectRef, Value};
use indexmap::IndexMap;
use tracing::trace;
use wiregen_codegen::{AssignmentPlan, CopyPlan, MessagePlan};
use wiregen_core::{
    FieldDefinition, FieldType, LiteralValue, MessageId, MessageRef, PrimitiveKind, Schema,
};

impl Runtime {
    /// Direct constructor: the fields that must be supplied, base-first.
    pub fn construct(&self, message: &str, args: Vec<Value>) -> RuntimeResult<ObjectRef> {
        let plan = self.message(message)?;
        Self::check_instantiable(plan)?;
        if plan.constructor.uses_builder() {
            return Err(ConstructionError::UsesBuilder {
                message: plan.qualified_name.clone(),
            }
            .into());
        }
        if args.len() != plan.constructor.required.len() {
            return Err(ConstructionError::Arity {
                message: plan.qualified_name.clone(),
                expected: plan.constructor.required.len(),
                actual: args.len(),
            }
            .into());
        }

        let mut args = args.into_iter();
        let mut slots = IndexMap::new();
        for (fid, field) in self.schema().effective_fields(plan.id) {
            let value = if field.must_be_supplied() {
                let arg = args.next().unwrap_or(Value::Null);
                self.assign(plan, fid_plan(plan, fid)?, field, arg)?
            } else {
                self.absent(field)
            };
            slots.insert(field.name.clone(), value);
        }
        Ok(self.instantiate(plan.id, slots))
    }

    /// Full constructor over every effective field; null takes the default.
    pub fn construct_full(&self, message: &str, args: Vec<Value>) -> RuntimeResult<ObjectRef> {
        let plan = self.message(message)?;
        Self::check_instantiable(plan)?;
        if plan.constructor.uses_builder() {
            return Err(ConstructionError::UsesBuilder {
                message: plan.qualified_name.clone(),
            }
            .into());
        }
        let Some(full) = &plan.constructor.full else {
            return Err(ConstructionError::NoFullConstructor {
                message: plan.qualified_name.clone(),
            }
            .into());
        };
        if args.len() != full.len() {
            return Err(ConstructionError::Arity {
                message: plan.qualified_name.clone(),
                expected: full.len(),
                actual: args.len(),
            }
            .into());
        }

        let mut slots = IndexMap::new();
        for ((fid, field), arg) in self.schema().effective_fields(plan.id).into_iter().zip(args) {
            let value = self.assign_or_default(plan, fid_plan(plan, fid)?, field, arg)?;
            slots.insert(field.name.clone(), value);
        }
        Ok(self.instantiate(plan.id, slots))
    }

    /// Companion builder for a message constructed through one.
    pub fn builder(&self, message: &str) -> RuntimeResult<Builder<'_>> {
        let plan = self.message(message)?;
        Self::check_instantiable(plan)?;
        if !plan.constructor.uses_builder() {
            return Err(ConstructionError::NoBuilder {
                message: plan.qualified_name.clone(),
            }
            .into());
        }
        Ok(Builder {
            runtime: self,
            message: plan.id,
            values: IndexMap::new(),
            error: None,
        })
    }

    pub fn get(&self, object: &ObjectRef, field: &str) -> RuntimeResult<Value> {
        self.effective_field(object, field)?;
        Ok(object.get(field).unwrap_or(Value::Null))
    }

    /// Mutator; only mutable fields have one.
    pub fn set(&self, object: &ObjectRef, field: &str, value: impl Into<Value>) -> RuntimeResult<()> {
        let (fid, definition) = self.effective_field(object, field)?;
        if !definition.mutable {
            return Err(ConstructionError::Immutable {
                message: object.name().to_string(),
                field: field.to_string(),
            }
            .into());
        }
        let plan = self.message_plan(object.message());
        let value = self.assign(plan, fid_plan(plan, fid)?, definition, value.into())?;
        object.set(field, value);
        Ok(())
    }

    /// Deep copy through the message's copy constructor.
    pub fn copy(&self, object: &ObjectRef) -> RuntimeResult<ObjectRef> {
        let plan = self.message_plan(object.message());
        if plan.constructor.copy.is_none() || !plan.instantiable() {
            return Err(ConstructionError::NotCopyable {
                message: plan.qualified_name.clone(),
            }
            .into());
        }
        let mut slots = IndexMap::new();
        for (fid, field) in self.schema().effective_fields(plan.id) {
            let assignment = fid_plan(plan, fid)?;
            let value = object.get(&field.name).unwrap_or(Value::Null);
            let copied = match value {
                Value::List(values) => Value::List(
                    values
                        .iter()
                        .map(|v| self.copy_value(&assignment.copy, &field.name, v))
                        .collect::<RuntimeResult<_>>()?,
                ),
                other => self.copy_value(&assignment.copy, &field.name, &other)?,
            };
            slots.insert(field.name.clone(), copied);
        }
        trace!(message = %plan.qualified_name, "copied object");
        Ok(self.instantiate(plan.id, slots))
    }

    fn check_instantiable(plan: &MessagePlan) -> Result<(), ConstructionError> {
        if plan.instantiable() {
            Ok(())
        } else {
            Err(ConstructionError::Abstract {
                message: plan.qualified_name.clone(),
            })
        }
    }

    /// The single funnel every construction path ends in.
    pub(crate) fn instantiate(&self, id: MessageId, slots: IndexMap<String, Value>) -> ObjectRef {
        let message = self.schema().message(id);
        Instance::new(id, message.name.clone(), slots)
    }

    /// Value a field holds when nothing was supplied.
    pub(crate) fn absent(&self, field: &FieldDefinition) -> Value {
        if field.ty.is_indicator() && !field.repeated {
            return Value::Bool(false);
        }
        match &field.default {
            Some(literal) => literal_value(self.schema(), &field.ty, literal),
            None => Value::Null,
        }
    }

    fn assign_or_default(
        &self,
        plan: &MessagePlan,
        assignment: &AssignmentPlan,
        field: &FieldDefinition,
        value: Value,
    ) -> RuntimeResult<Value> {
        if value.is_null() && field.default.is_some() && !field.ty.is_indicator() {
            Ok(self.absent(field))
        } else {
            self.assign(plan, assignment, field, value)
        }
    }

    /// Validate and copy a value into a slot.
    pub(crate) fn assign(
        &self,
        plan: &MessagePlan,
        assignment: &AssignmentPlan,
        field: &FieldDefinition,
        value: Value,
    ) -> RuntimeResult<Value> {
        let name = &field.name;
        if field.ty.is_indicator() && !field.repeated {
            return match value {
                Value::Null => Ok(Value::Bool(false)),
                Value::Bool(b) => Ok(Value::Bool(b)),
                other => Err(self.mismatch(field, &other).into()),
            };
        }
        if value.is_null() {
            if assignment.reject_null {
                return Err(ConstructionError::NullField {
                    field: name.clone(),
                }
                .into());
            }
            return Ok(self.absent(field));
        }

        match assignment.repeated {
            Some(check) => {
                let Value::List(values) = value else {
                    return Err(self.mismatch(field, &value).into());
                };
                if values.is_empty() {
                    if check.reject_empty {
                        return Err(ConstructionError::EmptyRepeated {
                            field: name.clone(),
                        }
                        .into());
                    }
                    return Ok(Value::Null);
                }
                let mut copied = Vec::with_capacity(values.len());
                for element in &values {
                    if element.is_null() && check.reject_null_elements {
                        return Err(ConstructionError::NullElement {
                            field: name.clone(),
                        }
                        .into());
                    }
                    if !self.conforms(&field.ty, element) {
                        return Err(self.mismatch(field, element).into());
                    }
                    copied.push(self.copy_value(&assignment.copy, name, element)?);
                }
                Ok(Value::List(copied))
            }
            None => {
                if !self.conforms(&field.ty, &value) {
                    return Err(self.mismatch(field, &value).into());
                }
                trace!(message = %plan.qualified_name, field = %name, "assigned field");
                self.copy_value(&assignment.copy, name, &value)
            }
        }
    }

    fn mismatch(&self, field: &FieldDefinition, value: &Value) -> ConstructionError {
        ConstructionError::TypeMismatch {
            field: field.name.clone(),
            expected: field.ty.describe(self.schema()),
            actual: value.kind().to_string(),
        }
    }

    /// Apply a copy plan to a value already known to conform.
    pub(crate) fn copy_value(&self, plan: &CopyPlan, field: &str, value: &Value) -> RuntimeResult<Value> {
        match (plan, value) {
            (_, Value::Null) => Ok(Value::Null),
            (CopyPlan::Alias | CopyPlan::ConvertTemporal { .. }, v) => Ok(v.clone()),
            (CopyPlan::Clone { .. }, Value::Object(object)) => Ok(Value::Object(self.copy(object)?)),
            (CopyPlan::Clone { .. }, v) => Ok(v.clone()),
            (CopyPlan::Array(array), Value::Array(source)) => {
                let elements = source.snapshot();
                if let Some(expected) = array.length {
                    if elements.len() != expected {
                        return Err(ConstructionError::Length {
                            field: field.to_string(),
                            expected,
                            actual: elements.len(),
                        }
                        .into());
                    }
                }
                let copied = if array.per_element {
                    elements
                        .iter()
                        .map(|e| self.copy_value(&array.element, field, e))
                        .collect::<RuntimeResult<Vec<_>>>()?
                } else {
                    elements
                };
                Ok(Value::Array(ArrayRef::new(copied)))
            }
            (CopyPlan::Array(_), v) => Ok(v.clone()),
        }
    }

    /// Whether a non-null value is acceptable for a field of type `ty`.
    pub(crate) fn conforms(&self, ty: &FieldType, value: &Value) -> bool {
        let schema = self.schema();
        match ty {
            FieldType::Primitive(kind) => matches!(
                (kind, value),
                (PrimitiveKind::Bool | PrimitiveKind::Indicator, Value::Bool(_))
                    | (PrimitiveKind::Byte, Value::Byte(_))
                    | (PrimitiveKind::Short, Value::Short(_))
                    | (PrimitiveKind::Int, Value::Int(_))
                    | (PrimitiveKind::Long, Value::Long(_))
                    | (PrimitiveKind::Float, Value::Float(_))
                    | (PrimitiveKind::Double, Value::Double(_))
                    | (PrimitiveKind::String, Value::String(_))
                    | (PrimitiveKind::Date, Value::Date(_))
                    | (PrimitiveKind::Time, Value::Time(_))
                    | (PrimitiveKind::DateTime, Value::DateTime(_))
            ),
            FieldType::Enum(id) => match value {
                Value::Enum(label) => schema.enum_def(*id).member(label).is_some(),
                _ => false,
            },
            FieldType::Message(MessageRef::Null) => false,
            FieldType::Message(MessageRef::Anonymous) => matches!(value, Value::Anonymous(_)),
            FieldType::Message(MessageRef::Defined(id)) => match value {
                Value::Object(object) => self.is_instance_of(object, *id),
                Value::External(_) => schema.message(*id).external,
                _ => false,
            },
            FieldType::User(id) => {
                let def = schema.type_def(*id);
                match value {
                    Value::External(_) => def.external,
                    other => self.conforms(&def.underlying, other),
                }
            }
            FieldType::Array(array) => match value {
                Value::Array(elements) => elements.snapshot().iter().all(|element| {
                    if element.is_null() {
                        !matches!(array.element.underlying(schema), FieldType::Primitive(k) if k != &PrimitiveKind::String && !k.is_temporal())
                    } else {
                        self.conforms(&array.element, element)
                    }
                }),
                _ => false,
            },
        }
    }
}

fn fid_plan(plan: &MessagePlan, fid: wiregen_core::FieldId) -> RuntimeResult<&AssignmentPlan> {
    plan.constructor.assignment(fid).ok_or_else(|| {
        ConstructionError::UnknownField {
            message: plan.qualified_name.clone(),
            field: format!("#{}", fid.index),
        }
        .into()
    })
}

/// A declared default as a runtime value.
pub(crate) fn literal_value(schema: &Schema, ty: &FieldType, literal: &LiteralValue) -> Value {
    match (ty.underlying(schema), literal) {
        (_, LiteralValue::Bool(b)) => Value::Bool(*b),
        (FieldType::Primitive(kind), LiteralValue::Integer(i)) => match kind {
            PrimitiveKind::Byte => Value::Byte(*i as i8),
            PrimitiveKind::Short => Value::Short(*i as i16),
            PrimitiveKind::Int => Value::Int(*i as i32),
            PrimitiveKind::Float => Value::Float(*i as f32),
            PrimitiveKind::Double => Value::Double(*i as f64),
            _ => Value::Long(*i),
        },
        (FieldType::Primitive(PrimitiveKind::Float), LiteralValue::Float(x)) => {
            Value::Float(*x as f32)
        }
        (_, LiteralValue::Float(x)) => Value::Double(*x),
        (_, LiteralValue::Integer(i)) => Value::Long(*i),
        (_, LiteralValue::String(s)) => Value::String(s.clone()),
        (_, LiteralValue::Enum(label)) => Value::Enum(label.clone()),
    }
}

/// Fluent builder; errors are reported by [`Builder::build`].
#[derive(Debug)]
pub struct Builder<'r> {
    runtime: &'r Runtime,
    message: MessageId,
    values: IndexMap<String, Value>,
    error: Option<ConstructionError>,
}

impl<'r> Builder<'r> {
    fn known(&mut self, field: &str) -> Option<&'r FieldDefinition> {
        let runtime: &'r Runtime = self.runtime;
        let schema = runtime.schema();
        let message = schema.message(self.message);
        match message.override_map.get(field) {
            Some(fid) => Some(schema.field(*fid)),
            None => {
                self.error.get_or_insert(ConstructionError::UnknownField {
                    message: message.name.clone(),
                    field: field.to_string(),
                });
                None
            }
        }
    }

    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        if self.known(field).is_some() {
            self.values.insert(field.to_string(), value.into());
        }
        self
    }

    /// Append one value to a repeated field.
    pub fn append(mut self, field: &str, value: impl Into<Value>) -> Self {
        let repeated = match self.known(field) {
            Some(definition) => definition.repeated,
            None => return self,
        };
        if !repeated {
            self.error.get_or_insert(ConstructionError::TypeMismatch {
                field: field.to_string(),
                expected: "a repeated field".to_string(),
                actual: "single-valued field".to_string(),
            });
            return self;
        }
        let value = value.into();
        match self.values.get_mut(field) {
            Some(Value::List(values)) => values.push(value),
            _ => {
                self.values.insert(field.to_string(), Value::List(vec![value]));
            }
        }
        self
    }

    pub fn build(self) -> RuntimeResult<ObjectRef> {
        if let Some(error) = self.error {
            return Err(error.into());
        }
        let runtime = self.runtime;
        let plan = runtime.message_plan(self.message);
        let mut values = self.values;
        let mut slots = IndexMap::new();
        for (fid, field) in runtime.schema().effective_fields(self.message) {
            let value = values.shift_remove(&field.name).unwrap_or(Value::Null);
            let value = runtime.assign_or_default(plan, fid_plan(plan, fid)?, field, value)?;
            slots.insert(field.name.clone(), value);
        }
        Ok(runtime.instantiate(self.message, slots))
    }
}
