//! The runtime entry point: a schema plan plus lookups shared by the
//! construction, codec and value-semantics modules.

use crate::error::{ConstructionError, RuntimeError, RuntimeResult};
use crate::value::ObjectRef;
use std::sync::Arc;
use wiregen_codegen::{MessagePlan, PlanOptions, SchemaPlan};
use wiregen_core::{FieldDefinition, FieldId, MessageId, Schema};

/// Executes the decisions of a [`SchemaPlan`] over dynamic values.
///
/// Cloning is cheap; clones share the plan.
#[derive(Debug, Clone)]
pub struct Runtime {
    plan: Arc<SchemaPlan>,
}

impl Runtime {
    pub fn new(plan: Arc<SchemaPlan>) -> Self {
        Self { plan }
    }

    /// Plan a resolved schema and wrap it.
    pub fn from_schema(schema: Arc<Schema>, options: PlanOptions) -> Self {
        Self::new(Arc::new(SchemaPlan::build(schema, options)))
    }

    pub fn plan(&self) -> &SchemaPlan {
        &self.plan
    }

    pub fn schema(&self) -> &Schema {
        self.plan.schema()
    }

    /// Look a message up by simple, qualified or fully qualified name.
    pub fn message(&self, name: &str) -> RuntimeResult<&MessagePlan> {
        self.plan
            .find(name)
            .ok_or_else(|| RuntimeError::UnknownMessage(name.to_string()))
    }

    pub(crate) fn message_plan(&self, id: MessageId) -> &MessagePlan {
        self.plan.message(id)
    }

    /// The effective definition of `field` in the object's concrete message.
    pub(crate) fn effective_field(
        &self,
        object: &ObjectRef,
        field: &str,
    ) -> RuntimeResult<(FieldId, &FieldDefinition)> {
        let schema = self.schema();
        schema
            .message(object.message())
            .override_map
            .get(field)
            .map(|fid| (*fid, schema.field(*fid)))
            .ok_or_else(|| {
                ConstructionError::UnknownField {
                    message: object.name().to_string(),
                    field: field.to_string(),
                }
                .into()
            })
    }

    /// Whether `object` is an instance of `id` or one of its descendants.
    pub fn is_instance_of(&self, object: &ObjectRef, id: MessageId) -> bool {
        object.message() == id || self.schema().extends_from(object.message(), id)
    }
}
