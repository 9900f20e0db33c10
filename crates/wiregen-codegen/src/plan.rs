//! The per-run plan every backend renders.
//!
//! [`SchemaPlan::build`] asks each planner once per message and keeps the
//! answers, so backends and the runtime read decisions instead of making
//! them.

use crate::analyzer::Analyzer;
use crate::constructor::{ConstructorPlan, ConstructorShape, plan_constructors};
use crate::copy_plan::CopyPlan;
use crate::value_semantics::ValueSemantics;
use crate::wire_plan::{MessageCodec, WirePlanner};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};
use wiregen_core::{CompileConfig, FieldId, MessageId, Schema};

/// Run-level switches that change planning decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanOptions {
    /// Every message uses the context-threading codec form.
    pub to_from_with_context: bool,
}

impl From<&CompileConfig> for PlanOptions {
    fn from(config: &CompileConfig) -> Self {
        Self {
            to_from_with_context: config.to_from_with_context,
        }
    }
}

/// Analyzer answers for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MessageFlags {
    pub has_external_references: bool,
    pub use_builder: bool,
    pub use_copy_constructor: bool,
    pub needs_copy_constructor: bool,
    pub is_abstract: bool,
    pub external: bool,
    pub target: bool,
}

#[derive(Debug, Clone)]
pub struct MessagePlan {
    pub id: MessageId,
    pub name: String,
    pub qualified_name: String,
    pub token: String,
    pub flags: MessageFlags,
    pub constructor: ConstructorPlan,
    pub codec: MessageCodec,
    pub semantics: ValueSemantics,
}

impl MessagePlan {
    /// Direct construction and decode into this exact message are allowed.
    pub fn instantiable(&self) -> bool {
        self.constructor.instantiable
    }

    pub fn with_context(&self) -> bool {
        self.codec.with_context
    }
}

/// Type token to decode entry point, for every concrete generated message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecoderRegistry {
    by_token: BTreeMap<String, MessageId>,
}

impl DecoderRegistry {
    pub fn from_schema(schema: &Schema) -> Self {
        let by_token = schema
            .messages()
            .filter(|(_, m)| !m.is_abstract && !m.external)
            .map(|(id, _)| (schema.type_token(id), id))
            .collect();
        Self { by_token }
    }

    pub fn resolve(&self, token: &str) -> Option<MessageId> {
        self.by_token.get(token).copied()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.by_token.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct SchemaPlan {
    schema: Arc<Schema>,
    options: PlanOptions,
    messages: Vec<MessagePlan>,
    registry: DecoderRegistry,
}

impl SchemaPlan {
    pub fn build(schema: Arc<Schema>, options: PlanOptions) -> Self {
        let analyzer = Analyzer::new(&schema);
        let wire = WirePlanner::new(analyzer, options.to_from_with_context);

        let messages: Vec<MessagePlan> = schema
            .messages()
            .map(|(id, message)| {
                let codec = wire.message_codec(id);
                let flags = MessageFlags {
                    has_external_references: analyzer.has_external_message_references(id),
                    use_builder: analyzer.use_builder_pattern(id),
                    use_copy_constructor: analyzer.use_copy_constructor(id),
                    needs_copy_constructor: analyzer.needs_copy_constructor(id),
                    is_abstract: message.is_abstract,
                    external: message.external,
                    target: message.target,
                };
                MessagePlan {
                    id,
                    name: message.name.clone(),
                    qualified_name: schema.qualified_name(id),
                    token: schema.type_token(id),
                    flags,
                    constructor: plan_constructors(analyzer, id, codec.with_context),
                    codec,
                    semantics: ValueSemantics::plan(&schema, id),
                }
            })
            .collect();

        for (id, message) in schema.messages() {
            if message.is_abstract && !message.external && !Self::has_concrete_descendant(&schema, id)
            {
                warn!(
                    message = %schema.qualified_name(id),
                    "abstract message has no concrete descendant and can never be decoded"
                );
            }
        }

        let registry = DecoderRegistry::from_schema(&schema);
        debug!(
            messages = messages.len(),
            decoders = registry.len(),
            with_context = messages.iter().filter(|m| m.with_context()).count(),
            "built schema plan"
        );

        Self {
            schema,
            options,
            messages,
            registry,
        }
    }

    fn has_concrete_descendant(schema: &Schema, id: MessageId) -> bool {
        schema
            .messages()
            .any(|(sub, m)| !m.is_abstract && !m.external && schema.extends_from(sub, id))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn shared_schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    pub fn options(&self) -> PlanOptions {
        self.options
    }

    pub fn message(&self, id: MessageId) -> &MessagePlan {
        &self.messages[id.index()]
    }

    pub fn messages(&self) -> impl Iterator<Item = &MessagePlan> {
        self.messages.iter()
    }

    pub fn find(&self, name: &str) -> Option<&MessagePlan> {
        self.schema.find_message(name).map(|id| self.message(id))
    }

    pub fn registry(&self) -> &DecoderRegistry {
        &self.registry
    }

    /// Concrete messages to try, in order, when decoding a sub-message whose
    /// header lists `header` and whose static type is `declared`.
    ///
    /// Walks the header most-derived first and stops at the declared type;
    /// names that are unknown here or do not extend the declared type are
    /// skipped.
    pub fn decode_candidates(&self, header: &[String], declared: MessageId) -> Vec<MessageId> {
        let declared_token = self.schema.type_token(declared);
        header
            .iter()
            .take_while(|token| **token != declared_token)
            .filter_map(|token| self.registry.resolve(token))
            .filter(|candidate| self.schema.extends_from(*candidate, declared))
            .collect()
    }

    /// Plan decisions as JSON, for `wiregen describe`.
    pub fn describe(&self) -> Value {
        let messages: Vec<Value> = self
            .messages
            .iter()
            .map(|m| self.describe_message(m.id))
            .collect();
        json!({
            "namespace": self.schema.namespace(),
            "options": self.options,
            "messages": messages,
            "decoders": self.registry.tokens().collect::<Vec<_>>(),
        })
    }

    pub fn describe_message(&self, id: MessageId) -> Value {
        let plan = self.message(id);
        let names = |fields: &[FieldId]| -> Vec<String> {
            fields
                .iter()
                .map(|f| self.schema.field(*f).name.clone())
                .collect()
        };
        let constructor = &plan.constructor;
        let shape = match &constructor.shape {
            ConstructorShape::Direct => json!({ "kind": "direct" }),
            ConstructorShape::Builder(builder) => json!({
                "kind": "builder",
                "bridges_base": builder.bridges_base,
                "appenders": names(&builder.appenders),
            }),
        };
        let assignments: Vec<Value> = constructor
            .assignments
            .iter()
            .map(|a| {
                json!({
                    "field": a.name,
                    "reject_null": a.reject_null,
                    "repeated": a.repeated,
                    "copy": describe_copy(&self.schema, &a.copy),
                })
            })
            .collect();
        let fields: Vec<Value> = plan
            .codec
            .encode_order
            .iter()
            .map(|f| {
                json!({
                    "name": f.name,
                    "key": f.key.to_string(),
                    "type": self.schema.field(f.field).ty.describe(&self.schema),
                    "wire_type": f.wire_type.name(),
                    "required": f.required,
                    "repeated": f.repeated,
                    "codec": f.codec,
                })
            })
            .collect();

        json!({
            "name": plan.qualified_name,
            "token": plan.token,
            "flags": plan.flags,
            "constructor": {
                "shape": shape,
                "required": names(&constructor.required),
                "defaulted": names(&constructor.defaulted),
                "mutators": names(&constructor.mutators),
                "instantiable": constructor.instantiable,
                "copy": constructor.copy.as_ref().map(|c| json!({
                    "exposes_clone": c.exposes_clone,
                    "null_source_allowed": c.null_source_allowed,
                })),
            },
            "assignments": assignments,
            "wire": {
                "with_context": plan.codec.with_context,
                "header": plan.codec.header,
                "fields": fields,
            },
            "equality": plan.semantics.fields.iter().map(|f| f.name.clone()).collect::<Vec<_>>(),
        })
    }
}

fn describe_copy(schema: &Schema, plan: &CopyPlan) -> Value {
    match plan {
        CopyPlan::Alias => json!("alias"),
        CopyPlan::Clone { message } => json!({ "clone": schema.qualified_name(*message) }),
        CopyPlan::ConvertTemporal { temporal } => json!({ "convert": temporal }),
        CopyPlan::Array(array) => json!({
            "array": {
                "length": array.length,
                "per_element": array.per_element,
                "element": describe_copy(schema, &array.element),
            }
        }),
    }
}

#[cfg(test)]
#[path = "plan/plan_tests.rs"]
mod plan_tests;
