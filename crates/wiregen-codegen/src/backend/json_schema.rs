//! JSON Schema generation from a schema plan.

use super::{Backend, Capabilities, GeneratedFile};
use crate::error::CodegenResult;
use crate::plan::SchemaPlan;
use serde_json::{Map, Value, json};
use tracing::debug;
use wiregen_core::{
    EnumCode, EnumEncoding, EnumId, FieldDefinition, FieldType, LiteralValue, MessageId,
    MessageRef, PrimitiveKind, Schema,
};

pub struct JsonSchemaBackend;

impl Backend for JsonSchemaBackend {
    fn name(&self) -> &'static str {
        "json-schema"
    }

    fn render(&self, plan: &SchemaPlan, caps: &Capabilities) -> CodegenResult<Vec<GeneratedFile>> {
        let document = generate_json_schema(plan);
        let file_name = match plan.schema().namespace() {
            "" => "schema.schema.json".to_string(),
            namespace => format!("{namespace}.schema.json"),
        };
        let mut text = serde_json::to_string_pretty(&document)?;
        text.push('\n');
        debug!(file = %file_name, "rendered json schema");
        Ok(vec![GeneratedFile::new(file_name, caps.wrap_json(text))])
    }
}

impl Capabilities {
    /// JSON has no comment syntax, so headers and footers are only applied
    /// when explicitly enabled with the `json.wrap` option.
    fn wrap_json(&self, body: String) -> String {
        if self.option::<bool>("json.wrap").unwrap_or(false) {
            self.wrap(body)
        } else {
            body
        }
    }
}

/// Generate a Draft-07 document with one definition per message and enum.
pub fn generate_json_schema(plan: &SchemaPlan) -> Value {
    let schema = plan.schema();
    let mut definitions = Map::new();

    for (id, message) in schema.messages() {
        if message.external {
            definitions.insert(
                schema.qualified_name(id),
                json!({ "type": "object", "description": "externally defined message" }),
            );
            continue;
        }
        definitions.insert(schema.qualified_name(id), generate_message_schema(schema, id));
    }
    for (id, _) in schema.enums() {
        definitions.insert(schema.qualified_enum_name(id), generate_enum_schema(schema, id));
    }

    let mut document = json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "$id": schema.namespace(),
        "definitions": definitions,
    });

    let taxonomies: Map<String, Value> = schema
        .taxonomies()
        .map(|(_, taxonomy)| {
            let entries: Map<String, Value> = taxonomy
                .entries
                .iter()
                .map(|e| (e.name.clone(), json!(e.ordinal)))
                .collect();
            (taxonomy.name.clone(), Value::Object(entries))
        })
        .collect();
    if !taxonomies.is_empty() {
        document["x-taxonomies"] = Value::Object(taxonomies);
    }
    document
}

/// Schema for the fields a message declares; inherited fields come from
/// the base definition through `allOf`.
fn generate_message_schema(schema: &Schema, id: MessageId) -> Value {
    let message = schema.message(id);
    let mut properties = Map::new();
    let mut required = Vec::new();

    for (_, field) in schema.own_fields(id) {
        properties.insert(field.name.clone(), generate_field_schema(schema, field));
        if field.required && !field.ty.is_indicator() {
            required.push(field.name.clone());
        }
    }

    let mut object = json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        object["required"] = json!(required);
    }

    let mut result = match message.extends {
        Some(base) => json!({
            "allOf": [
                { "$ref": definition_ref(&schema.qualified_name(base)) },
                object,
            ]
        }),
        None => object,
    };
    result["x-token"] = json!(schema.type_token(id));
    if message.is_abstract {
        result["x-abstract"] = json!(true);
    }
    result
}

fn generate_field_schema(schema: &Schema, field: &FieldDefinition) -> Value {
    let mut value = generate_type_schema(schema, &field.ty);
    if let (Some(default), Value::Object(map)) = (&field.default, &mut value) {
        map.insert("default".to_string(), literal_json(schema, &field.ty, default));
    }
    if field.repeated {
        let mut list = json!({ "type": "array", "items": value });
        if field.required {
            list["minItems"] = json!(1);
        }
        return list;
    }
    value
}

fn generate_type_schema(schema: &Schema, ty: &FieldType) -> Value {
    match ty {
        FieldType::Primitive(kind) => primitive_schema(*kind),
        FieldType::Array(array) => {
            let mut value = json!({
                "type": "array",
                "items": generate_type_schema(schema, &array.element),
            });
            if let Some(length) = array.fixed_length {
                value["minItems"] = json!(length);
                value["maxItems"] = json!(length);
            }
            value
        }
        FieldType::Enum(id) => json!({ "$ref": definition_ref(&schema.qualified_enum_name(*id)) }),
        FieldType::Message(MessageRef::Null) => json!({ "type": "null" }),
        FieldType::Message(MessageRef::Anonymous) => json!({ "type": "object" }),
        FieldType::Message(MessageRef::Defined(id)) => {
            json!({ "$ref": definition_ref(&schema.qualified_name(*id)) })
        }
        FieldType::User(id) => {
            let def = schema.type_def(*id);
            let mut value = generate_type_schema(schema, &def.underlying);
            if let Value::Object(map) = &mut value {
                map.insert("title".to_string(), json!(def.name));
            }
            value
        }
    }
}

fn primitive_schema(kind: PrimitiveKind) -> Value {
    match kind {
        PrimitiveKind::Indicator | PrimitiveKind::Bool => json!({ "type": "boolean" }),
        PrimitiveKind::Byte => json!({ "type": "integer", "minimum": i8::MIN, "maximum": i8::MAX }),
        PrimitiveKind::Short => {
            json!({ "type": "integer", "minimum": i16::MIN, "maximum": i16::MAX })
        }
        PrimitiveKind::Int => json!({ "type": "integer", "minimum": i32::MIN, "maximum": i32::MAX }),
        PrimitiveKind::Long => json!({ "type": "integer" }),
        PrimitiveKind::Float | PrimitiveKind::Double => json!({ "type": "number" }),
        PrimitiveKind::String => json!({ "type": "string" }),
        PrimitiveKind::Date => json!({ "type": "string", "format": "date" }),
        PrimitiveKind::Time => json!({ "type": "string", "format": "time" }),
        PrimitiveKind::DateTime => json!({ "type": "string", "format": "date-time" }),
    }
}

fn generate_enum_schema(schema: &Schema, id: EnumId) -> Value {
    let def = schema.enum_def(id);
    let labels: Vec<&str> = def.members.iter().map(|m| m.label.as_str()).collect();
    let mut value = json!({ "type": "string", "enum": labels });
    if def.encoding != EnumEncoding::Symbolic {
        let codes: Map<String, Value> = def
            .members
            .iter()
            .map(|m| {
                let code = match &m.code {
                    EnumCode::Int(i) => json!(i),
                    EnumCode::Str(s) => json!(s),
                };
                (m.label.clone(), code)
            })
            .collect();
        value["x-wire-codes"] = Value::Object(codes);
    }
    value
}

fn literal_json(schema: &Schema, ty: &FieldType, literal: &LiteralValue) -> Value {
    match literal {
        LiteralValue::Bool(b) => json!(b),
        LiteralValue::Integer(i) => match ty.underlying(schema) {
            FieldType::Primitive(PrimitiveKind::Float | PrimitiveKind::Double) => json!(*i as f64),
            _ => json!(i),
        },
        LiteralValue::Float(x) => json!(x),
        LiteralValue::String(s) | LiteralValue::Enum(s) => json!(s),
    }
}

fn definition_ref(name: &str) -> String {
    format!("#/definitions/{name}")
}
