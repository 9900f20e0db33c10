//! Java class generation from a schema plan.
//!
//! One file is written per top-level compilation target; nested messages and
//! enums become static members of their enclosing class. Every constructor of
//! a generated class funnels through one protected constructor that takes the
//! final value of each effective field, so validation and copying happen in
//! per-field static helpers shared by all entry points.
//!
//! A `WireDecoders` class per package maps type tokens to decode entry points
//! and Java classes back to type tokens for the polymorphic header.

use super::jvm_types::{
    field_java_type, is_nullable, map_field_type, parameter_type, zero_value,
};
use super::{Backend, Capabilities, GeneratedFile};
use crate::copy_plan::CopyPlan;
use crate::error::CodegenResult;
use crate::naming::{capitalize, java_identifier, to_camel_case, to_constant_case, to_package_path, to_pascal_case};
use crate::plan::SchemaPlan;
use crate::wire_plan::{FieldCodec, ValueCodec};
use std::path::PathBuf;
use tracing::debug;
use wiregen_core::{
    EnumEncoding, EnumId, FieldDefinition, FieldId, FieldType, LiteralValue, MessageId,
    PrimitiveKind, Schema, TaxonomyId, WireKey,
};

const FUDGE_IMPORTS: &[&str] = &[
    "org.fudgemsg.FudgeField",
    "org.fudgemsg.FudgeMsg",
    "org.fudgemsg.FudgeMsgFactory",
    "org.fudgemsg.MutableFudgeMsg",
    "org.fudgemsg.mapping.FudgeDeserializer",
    "org.fudgemsg.mapping.FudgeSerializer",
    "org.fudgemsg.types.IndicatorType",
];

/// Name of the generated per-package registry class.
pub const DECODERS_CLASS: &str = "WireDecoders";

pub struct JavaBackend;

impl Backend for JavaBackend {
    fn name(&self) -> &'static str {
        "java"
    }

    fn render(&self, plan: &SchemaPlan, caps: &Capabilities) -> CodegenResult<Vec<GeneratedFile>> {
        let schema = plan.schema();
        let dir = PathBuf::from(to_package_path(schema.namespace()));
        let mut files = Vec::new();

        let classes: Vec<MessageId> = plan
            .messages()
            .filter(|m| m.flags.target && !m.flags.external)
            .filter(|m| schema.message(m.id).enclosing.is_none())
            .map(|m| m.id)
            .collect();

        for id in &classes {
            let message = schema.message(*id);
            let mut emitter = JavaEmitter::new(plan, caps);
            emitter.preamble(
                &format!("{}:{}", message.position.source, message.position.line),
                message.bindings.get("java.imports"),
            );
            emitter.message_class(*id, false);
            files.push(GeneratedFile::new(
                dir.join(format!("{}.java", message.name)),
                caps.wrap(emitter.finish()),
            ));
        }

        for (id, def) in schema.enums() {
            if def.enclosing.is_some() || !def.target {
                continue;
            }
            let mut emitter = JavaEmitter::new(plan, caps);
            emitter.preamble(
                &format!("{}:{}", def.position.source, def.position.line),
                def.bindings.get("java.imports"),
            );
            emitter.enum_type(id, false);
            files.push(GeneratedFile::new(
                dir.join(format!("{}.java", def.name)),
                caps.wrap(emitter.finish()),
            ));
        }

        for (id, def) in schema.taxonomies() {
            if !def.target {
                continue;
            }
            let mut emitter = JavaEmitter::new(plan, caps);
            emitter.preamble(
                &format!("{}:{}", def.position.source, def.position.line),
                None,
            );
            emitter.taxonomy_class(id);
            files.push(GeneratedFile::new(
                dir.join(format!("{}.java", to_pascal_case(&def.name))),
                caps.wrap(emitter.finish()),
            ));
        }

        if !classes.is_empty() {
            let mut emitter = JavaEmitter::new(plan, caps);
            emitter.preamble(schema.namespace(), None);
            emitter.decoders_class();
            files.push(GeneratedFile::new(
                dir.join(format!("{DECODERS_CLASS}.java")),
                caps.wrap(emitter.finish()),
            ));
        }

        debug!(files = files.len(), "rendered java");
        Ok(files)
    }
}

/// Where a field's storage lives and what its helpers are called.
struct FieldNames {
    slot: String,
    getter: String,
    setter: String,
    param: String,
    suffix: String,
    key_constant: String,
}

impl FieldNames {
    fn of(field: &FieldDefinition) -> Self {
        let camel = to_camel_case(&field.name);
        let constant = to_constant_case(&field.name);
        let key_constant = match field.key {
            WireKey::Ordinal(_) => format!("{constant}_ORDINAL"),
            WireKey::Name(_) => format!("{constant}_KEY"),
        };
        Self {
            slot: format!("_{camel}"),
            getter: format!("get{}", capitalize(&camel)),
            setter: format!("set{}", capitalize(&camel)),
            param: java_identifier(&field.name),
            suffix: capitalize(&camel),
            key_constant,
        }
    }

    /// Name and ordinal arguments for `MutableFudgeMsg.add`.
    fn add_args(&self, key: &WireKey) -> (String, String) {
        match key {
            WireKey::Ordinal(_) => ("null".to_string(), self.key_constant.clone()),
            WireKey::Name(_) => (self.key_constant.clone(), "null".to_string()),
        }
    }

    fn lookup(&self, key: &WireKey, all: bool) -> String {
        let by = match key {
            WireKey::Ordinal(_) => "Ordinal",
            WireKey::Name(_) => "Name",
        };
        let all = if all { "All" } else { "" };
        format!("get{all}By{by}({})", self.key_constant)
    }
}

struct JavaEmitter<'a> {
    plan: &'a SchemaPlan,
    schema: &'a Schema,
    caps: &'a Capabilities,
    code: String,
    indent: usize,
}

impl<'a> JavaEmitter<'a> {
    fn new(plan: &'a SchemaPlan, caps: &'a Capabilities) -> Self {
        Self {
            plan,
            schema: plan.schema(),
            caps,
            code: String::new(),
            indent: 0,
        }
    }

    fn finish(self) -> String {
        self.code
    }

    fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.code.push_str("    ");
            }
            self.code.push_str(text);
        }
        self.code.push('\n');
    }

    fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.indent += 1;
    }

    fn close(&mut self, text: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    fn preamble(&mut self, origin: &str, imports: Option<&String>) {
        self.line(format!("// Generated by wiregen from {origin} - do not modify"));
        let namespace = self.schema.namespace();
        if !namespace.is_empty() {
            self.line(format!("package {namespace};"));
        }
        self.line("");
        for import in FUDGE_IMPORTS {
            self.line(format!("import {import};"));
        }
        if let Some(imports) = imports {
            for import in imports.split([',', ';']).map(str::trim).filter(|s| !s.is_empty()) {
                self.line(format!("import {import};"));
            }
        }
        self.line("");
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn slot_type(&self, field: &FieldDefinition) -> String {
        field_java_type(field, self.schema, self.caps)
    }

    fn slot_is_primitive(&self, field: &FieldDefinition) -> bool {
        !field.repeated
            && !is_nullable(field)
            && map_field_type(&field.ty, self.schema, self.caps).is_primitive
    }

    /// Type of the value handed to `assign` helpers, builders and mutators.
    fn param_type(&self, field: &FieldDefinition, nullable: bool) -> String {
        let jvm = parameter_type(&field.ty, self.schema, self.caps);
        if field.repeated {
            format!("java.util.List<{}>", jvm.boxed)
        } else if field.ty.is_indicator() {
            "boolean".to_string()
        } else {
            jvm.java_type(nullable).to_string()
        }
    }

    fn element_boxed(&self, ty: &FieldType) -> String {
        map_field_type(ty, self.schema, self.caps).boxed
    }

    fn java_type(&self, ty: &FieldType) -> String {
        map_field_type(ty, self.schema, self.caps).primitive
    }

    fn default_literal(&self, field: &FieldDefinition) -> Option<String> {
        let literal = field.default.as_ref()?;
        let ty = field.ty.underlying(self.schema);
        let text = match (literal, ty) {
            (LiteralValue::Bool(b), _) => b.to_string(),
            (LiteralValue::Integer(i), FieldType::Primitive(kind)) => match kind {
                PrimitiveKind::Byte => format!("(byte) {i}"),
                PrimitiveKind::Short => format!("(short) {i}"),
                PrimitiveKind::Long => format!("{i}L"),
                PrimitiveKind::Float => format!("{i}f"),
                PrimitiveKind::Double => format!("{i}d"),
                _ => i.to_string(),
            },
            (LiteralValue::Float(x), FieldType::Primitive(PrimitiveKind::Float)) => format!("{x:?}f"),
            (LiteralValue::Float(x), _) => format!("{x:?}"),
            (LiteralValue::String(s), _) => java_string(s),
            (LiteralValue::Enum(label), FieldType::Enum(id)) => {
                format!("{}.{label}", self.schema.qualified_enum_name(*id))
            }
            (other, _) => other.to_string(),
        };
        Some(text)
    }

    /// Value a slot holds when nothing was supplied.
    fn absent_value(&self, field: &FieldDefinition) -> String {
        self.default_literal(field)
            .unwrap_or_else(|| zero_value(&self.slot_type(field)).to_string())
    }

    // ========================================================================
    // Messages
    // ========================================================================

    fn message_class(&mut self, id: MessageId, nested: bool) {
        let (schema, plans) = (self.schema, self.plan);
        let plan = plans.message(id);
        let message = schema.message(id);
        debug!(message = %plan.qualified_name, "generating java class");

        let mut modifiers = String::from("public");
        if nested {
            modifiers.push_str(" static");
        }
        if message.is_abstract {
            modifiers.push_str(" abstract");
        }
        let extends = message
            .extends
            .map(|base| format!(" extends {}", schema.qualified_name(base)))
            .unwrap_or_default();
        let mut implements = vec!["java.io.Serializable".to_string()];
        if let Some(extra) = message.bindings.get("java.implements") {
            implements.extend(
                extra
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from),
            );
        }

        self.open(format!(
            "{modifiers} class {}{extends} implements {} {{",
            message.name,
            implements.join(", ")
        ));
        self.line(format!(
            "private static final long serialVersionUID = {}L;",
            serial_version_uid(schema, id)
        ));

        for (_, field) in schema.own_fields(id) {
            let names = FieldNames::of(field);
            let finality = if field.mutable { "" } else { "final " };
            self.line(format!(
                "private {finality}{} {};",
                self.slot_type(field),
                names.slot
            ));
            match &field.key {
                WireKey::Ordinal(ordinal) => self.line(format!(
                    "public static final int {} = {ordinal};",
                    names.key_constant
                )),
                WireKey::Name(name) => self.line(format!(
                    "public static final String {} = {};",
                    names.key_constant,
                    java_string(name)
                )),
            }
        }

        for nested_enum in &message.enums {
            self.line("");
            self.enum_type(*nested_enum, true);
        }
        for nested_message in &message.messages {
            if !schema.message(*nested_message).external {
                self.line("");
                self.message_class(*nested_message, true);
            }
        }

        self.slots_constructor(id);
        if plan.instantiable() {
            if plan.constructor.uses_builder() {
                self.builder(id);
            } else {
                self.direct_constructors(id);
            }
            self.decode_constructor(id);
            if plan.flags.use_copy_constructor {
                self.copy_constructor(id);
            }
        } else if plan.flags.use_copy_constructor {
            self.line("");
            self.line(format!("public abstract {} clone();", message.name));
        }

        self.encoders(id);
        self.from_fudge_msg(id);
        self.accessors(id);
        self.field_helpers(id);
        self.value_semantics(id);

        if let Some(body) = message.bindings.get("java.body") {
            self.line("");
            for line in body.lines() {
                self.line(line);
            }
        }
        self.close("}");
    }

    /// The constructor every other constructor funnels into.
    fn slots_constructor(&mut self, id: MessageId) {
        let schema = self.schema;
        let message = schema.message(id);
        let params: String = schema
            .effective_fields(id)
            .iter()
            .map(|(_, f)| format!(", final {} {}", self.slot_type(f), FieldNames::of(f).param))
            .collect();

        self.line("");
        self.open(format!(
            "protected {}(final {DECODERS_CLASS}.Slots slots{params}) {{",
            message.name
        ));
        if let Some(base) = message.extends {
            // Slots overridden here or below are elided in the base.
            let args: String = schema
                .effective_fields(base)
                .iter()
                .map(|(bid, bf)| {
                    if message.override_map.get(&bf.name) == Some(bid) {
                        format!(", {}", FieldNames::of(bf).param)
                    } else {
                        format!(", {}", zero_value(&self.slot_type(bf)))
                    }
                })
                .collect();
            self.line(format!("super(slots{args});"));
        }
        for (_, field) in schema.own_fields(id) {
            let names = FieldNames::of(field);
            self.line(format!("{} = {};", names.slot, names.param));
        }
        self.close("}");
    }

    fn funnel(&mut self, args: &[String]) {
        let args: String = args.iter().map(|a| format!(", {a}")).collect();
        self.line(format!("this({DECODERS_CLASS}.SLOTS{args});"));
    }

    fn direct_constructors(&mut self, id: MessageId) {
        let (schema, plans) = (self.schema, self.plan);
        let name = schema.message(id).name.clone();
        let plan = plans.message(id);
        let effective = schema.effective_fields(id);

        let params: Vec<String> = plan
            .constructor
            .required
            .iter()
            .map(|fid| {
                let f = schema.field(*fid);
                format!("final {} {}", self.param_type(f, false), FieldNames::of(f).param)
            })
            .collect();
        let args: Vec<String> = effective
            .iter()
            .map(|(_, f)| {
                let names = FieldNames::of(f);
                if f.must_be_supplied() {
                    self.assign_call(f, &names.param)
                } else {
                    self.absent_value(f)
                }
            })
            .collect();
        if self.collides_with_decode(id, &params) {
            debug!(message = %name, "direct constructor shadows the wire-decode constructor; emitting factory");
            self.factory(&name, &params, &args);
        } else {
            self.line("");
            self.open(format!("public {name}({}) {{", params.join(", ")));
            self.funnel(&args);
            self.close("}");
        }

        if plan.constructor.full.is_some() {
            let params: Vec<String> = effective
                .iter()
                .map(|(_, f)| {
                    format!(
                        "final {} {}",
                        self.param_type(f, !f.must_be_supplied()),
                        FieldNames::of(f).param
                    )
                })
                .collect();
            let args: Vec<String> = effective
                .iter()
                .map(|(_, f)| {
                    let names = FieldNames::of(f);
                    match self.default_literal(f) {
                        Some(default) if !f.ty.is_indicator() => format!(
                            "{} != null ? {} : {default}",
                            names.param,
                            self.assign_call(f, &names.param)
                        ),
                        _ => self.assign_call(f, &names.param),
                    }
                })
                .collect();
            if self.collides_with_decode(id, &params) {
                debug!(message = %name, "full constructor shadows the wire-decode constructor; emitting factory");
                self.factory(&name, &params, &args);
            } else {
                self.line("");
                self.open(format!("public {name}({}) {{", params.join(", ")));
                self.funnel(&args);
                self.close("}");
            }
        }
    }

    /// Stands in for a public constructor whose only parameter is a raw
    /// message, which would have the wire-decode constructor's signature.
    fn factory(&mut self, name: &str, params: &[String], args: &[String]) {
        let args: String = args.iter().map(|a| format!(", {a}")).collect();
        self.line("");
        self.open(format!("public static {name} of({}) {{", params.join(", ")));
        self.line(format!("return new {name}({DECODERS_CLASS}.SLOTS{args});"));
        self.close("}");
    }

    fn collides_with_decode(&self, id: MessageId, params: &[String]) -> bool {
        !self.plan.message(id).with_context()
            && params.len() == 1
            && params[0].starts_with("final FudgeMsg ")
    }

    fn assign_call(&self, field: &FieldDefinition, value: &str) -> String {
        if field.ty.is_indicator() && !field.repeated {
            value.to_string()
        } else {
            format!("assign{}({value})", FieldNames::of(field).suffix)
        }
    }

    fn builder(&mut self, id: MessageId) {
        let schema = self.schema;
        let name = schema.message(id).name.clone();
        let effective = schema.effective_fields(id);

        self.line("");
        self.open("public static class Builder {");
        for (_, f) in &effective {
            let names = FieldNames::of(f);
            self.line(format!("private {} {};", self.param_type(f, true), names.slot));
        }
        self.line("");
        self.open("public Builder() {");
        self.close("}");
        for (_, f) in &effective {
            let names = FieldNames::of(f);
            self.line("");
            self.open(format!(
                "public Builder {}(final {} {}) {{",
                names.param,
                self.param_type(f, true),
                names.param
            ));
            self.line(format!("{} = {};", names.slot, names.param));
            self.line("return this;");
            self.close("}");
            if f.repeated {
                let element = parameter_type(&f.ty, schema, self.caps).boxed;
                self.line("");
                self.open(format!(
                    "public Builder add{}(final {element} {}) {{",
                    names.suffix, names.param
                ));
                self.line(format!(
                    "if ({} == null) {} = new java.util.ArrayList<{element}>();",
                    names.slot, names.slot
                ));
                self.line(format!("{}.add({});", names.slot, names.param));
                self.line("return this;");
                self.close("}");
            }
        }
        self.line("");
        self.open(format!("public {name} build() {{"));
        self.line(format!("return new {name}(this);"));
        self.close("}");
        self.close("}");

        let args: Vec<String> = effective
            .iter()
            .map(|(_, f)| {
                let value = format!("builder.{}", FieldNames::of(f).slot);
                match self.default_literal(f) {
                    Some(default) if !f.ty.is_indicator() => format!(
                        "{value} != null ? {} : {default}",
                        self.assign_call(f, &value)
                    ),
                    _ => self.assign_call(f, &value),
                }
            })
            .collect();
        self.line("");
        self.open(format!("protected {name}(final Builder builder) {{"));
        self.funnel(&args);
        self.close("}");
    }

    fn decode_params(&self, with_context: bool) -> &'static str {
        if with_context {
            "final FudgeDeserializer deserializer, final FudgeMsg fudgeMsg"
        } else {
            "final FudgeMsg fudgeMsg"
        }
    }

    fn decode_args(&self, with_context: bool) -> &'static str {
        if with_context {
            "deserializer, fudgeMsg"
        } else {
            "fudgeMsg"
        }
    }

    fn decode_constructor(&mut self, id: MessageId) {
        let schema = self.schema;
        let name = schema.message(id).name.clone();
        let with_context = self.plan.message(id).constructor.wire_decode.with_context;
        let call_args = self.decode_args(with_context);
        let args: Vec<String> = schema
            .effective_fields(id)
            .iter()
            .map(|(_, f)| format!("decode{}({call_args})", FieldNames::of(f).suffix))
            .collect();

        self.line("");
        self.open(format!(
            "protected {name}({}) {{",
            self.decode_params(with_context)
        ));
        self.funnel(&args);
        self.close("}");
    }

    fn copy_constructor(&mut self, id: MessageId) {
        let schema = self.schema;
        let name = schema.message(id).name.clone();
        let plan = self.plan.message(id);
        let null_source_allowed = plan
            .constructor
            .copy
            .as_ref()
            .is_none_or(|c| c.null_source_allowed);

        let mut args = Vec::new();
        for (index, (fid, f)) in schema.effective_fields(id).iter().enumerate() {
            let names = FieldNames::of(f);
            let source = if index == 0 && !null_source_allowed {
                "java.util.Objects.requireNonNull(source, \"'source' must not be null\")"
            } else {
                "source"
            };
            let read = format!("{source}.{}()", names.getter);
            let copied = if self.needs_copy_helper(*fid) {
                format!("copy{}({read})", names.suffix)
            } else {
                read
            };
            if null_source_allowed {
                args.push(format!("source == null ? {} : {copied}", self.absent_value(f)));
            } else {
                args.push(copied);
            }
        }

        self.line("");
        self.open(format!("protected {name}(final {name} source) {{"));
        self.funnel(&args);
        self.close("}");
        self.line("");
        self.open(format!("public {name} clone() {{"));
        self.line(format!("return new {name}(this);"));
        self.close("}");
    }

    fn needs_copy_helper(&self, fid: FieldId) -> bool {
        self.copy_plan(fid).is_some_and(|plan| {
            !matches!(plan, CopyPlan::Alias | CopyPlan::ConvertTemporal { .. })
        })
    }

    fn copy_plan(&self, fid: FieldId) -> Option<&'a CopyPlan> {
        let plan = self.plan;
        plan.message(fid.message)
            .constructor
            .assignment(fid)
            .or_else(|| {
                plan.messages()
                    .flat_map(|m| m.constructor.assignments.iter())
                    .find(|a| a.field == fid)
            })
            .map(|a| &a.copy)
    }

    // ========================================================================
    // Encoding
    // ========================================================================

    fn encode_context(with_context: bool) -> (&'static str, &'static str) {
        if with_context {
            ("FudgeSerializer", "serializer")
        } else {
            ("FudgeMsgFactory", "fudgeContext")
        }
    }

    fn encoders(&mut self, id: MessageId) {
        let schema = self.schema;
        let plan = self.plan.message(id);
        let with_context = plan.with_context();
        let (ctx_type, ctx) = Self::encode_context(with_context);
        let codec = plan.codec.clone();

        self.line("");
        self.open(format!("public FudgeMsg toFudgeMsg(final {ctx_type} {ctx}) {{"));
        self.line(format!(
            "if ({ctx} == null) throw new NullPointerException(\"{ctx} must not be null\");"
        ));
        self.line(format!("final MutableFudgeMsg msg = {ctx}.newMessage();"));
        if schema.message(id).extends.is_some() {
            self.line(format!("{DECODERS_CLASS}.header(msg, getClass(), null);"));
        }
        self.line(format!("toFudgeMsg({ctx}, msg);"));
        self.line("return msg;");
        self.close("}");

        self.line("");
        self.open(format!(
            "public void toFudgeMsg(final {ctx_type} {ctx}, final MutableFudgeMsg msg) {{"
        ));
        for field_codec in &codec.encode_order {
            self.encode_field(field_codec, with_context);
        }
        self.close("}");
    }

    fn encode_field(&mut self, codec: &FieldCodec, with_context: bool) {
        let schema = self.schema;
        let field = schema.field(codec.field);
        let names = FieldNames::of(field);
        let (n, o) = names.add_args(&codec.key);
        let value = format!("{}()", names.getter);

        if codec.repeated {
            let element = self.element_boxed(&field.ty);
            self.open(format!("if ({value} != null) {{"));
            self.open(format!("for (final {element} value : {value}) {{"));
            self.write_value(&codec.codec, "msg", &n, &o, "value", &names.suffix, 0, with_context);
            self.close("}");
            self.close("}");
        } else if codec.codec == ValueCodec::Indicator {
            self.line(format!("if ({value}) msg.add({n}, {o}, IndicatorType.INSTANCE);"));
        } else if self.slot_is_primitive(field) {
            self.write_value(&codec.codec, "msg", &n, &o, &value, &names.suffix, 0, with_context);
        } else {
            self.open(format!("if ({value} != null) {{"));
            self.write_value(&codec.codec, "msg", &n, &o, &value, &names.suffix, 0, with_context);
            self.close("}");
        }
    }

    /// Statement(s) adding `value` to `msg` under the given name and ordinal.
    #[allow(clippy::too_many_arguments)]
    fn write_value(
        &mut self,
        codec: &ValueCodec,
        msg: &str,
        n: &str,
        o: &str,
        value: &str,
        suffix: &str,
        depth: usize,
        with_context: bool,
    ) {
        let (_, ctx) = Self::encode_context(with_context);
        match codec {
            ValueCodec::Scalar { .. }
            | ValueCodec::Temporal { .. }
            | ValueCodec::PrimitiveArray { .. }
            | ValueCodec::Anonymous => self.line(format!("{msg}.add({n}, {o}, {value});")),
            ValueCodec::Indicator => self.line(format!("{msg}.add({n}, {o}, IndicatorType.INSTANCE);")),
            ValueCodec::Enum { .. } => {
                self.line(format!("{msg}.add({n}, {o}, {value}.getFudgeEncoding());"))
            }
            ValueCodec::Message {
                id,
                with_context: nested_context,
                ..
            } => {
                let class = self.schema.qualified_name(*id);
                let arg = match (*nested_context, with_context) {
                    (true, _) => "serializer",
                    (false, true) => "serializer.getFudgeContext()",
                    (false, false) => "fudgeContext",
                };
                let sub = format!("sub{depth}");
                self.open("{");
                self.line(format!("final MutableFudgeMsg {sub} = {ctx}.newMessage();"));
                self.line(format!(
                    "{DECODERS_CLASS}.header({sub}, {value}.getClass(), {class}.class);"
                ));
                self.line(format!("{value}.toFudgeMsg({arg}, {sub});"));
                self.line(format!("{msg}.add({n}, {o}, {sub});"));
                self.close("}");
            }
            ValueCodec::ExternalMessage { id, .. } => {
                let class = self.schema.qualified_name(*id);
                self.line(format!(
                    "serializer.addToMessageWithClassHeaders({msg}, {n}, {o}, {value}, {class}.class);"
                ));
            }
            ValueCodec::ExternalUser { token, .. } => {
                self.line(format!(
                    "serializer.addToMessageWithClassHeaders({msg}, {n}, {o}, {value}, {token}.class);"
                ));
            }
            ValueCodec::Container { .. } => self.line(format!(
                "{msg}.add({n}, {o}, write{suffix}{depth}({ctx}, {value}));"
            )),
        }
    }

    // ========================================================================
    // Decoding
    // ========================================================================

    fn from_fudge_msg(&mut self, id: MessageId) {
        let plan = self.plan.message(id);
        let name = self.schema.message(id).name.clone();
        let token = plan.token.clone();
        let with_context = plan.with_context();
        let instantiable = plan.instantiable();
        let deserializer = if with_context { "deserializer" } else { "null" };

        self.line("");
        self.open(format!(
            "public static {name} fromFudgeMsg({}) {{",
            self.decode_params(with_context)
        ));
        self.open("for (final FudgeField fudgeField : fudgeMsg.getAllByOrdinal(0)) {");
        self.line("final Object token = fudgeField.getValue();");
        self.line(format!("if ({}.equals(token)) break;", java_string(&token)));
        self.open("try {");
        self.line(format!(
            "final Object decoded = {DECODERS_CLASS}.decode(String.valueOf(token), {deserializer}, fudgeMsg);"
        ));
        self.line(format!("if (decoded instanceof {name}) return ({name}) decoded;"));
        self.close("}");
        self.open("catch (RuntimeException e) {");
        self.line("// try the next candidate");
        self.close("}");
        self.close("}");
        if instantiable {
            self.line(format!(
                "return new {name}({});",
                self.decode_args(with_context)
            ));
        } else {
            self.line(format!(
                "throw new IllegalArgumentException(\"Fudge message is not a {name} - no concrete message type in header\");"
            ));
        }
        self.close("}");
    }

    /// Expression reading `fudgeField` of `fudgeMsg` as a value of `ty`.
    fn read_value(&self, codec: &ValueCodec, suffix: &str, depth: usize, with_context: bool) -> String {
        let sub = "fudgeMsg.getFieldValue(FudgeMsg.class, fudgeField)";
        match codec {
            ValueCodec::Scalar { kind } => format!(
                "fudgeMsg.getFieldValue({}.class, fudgeField)",
                self.element_boxed(&FieldType::Primitive(*kind))
            ),
            ValueCodec::Indicator => "Boolean.TRUE".to_string(),
            ValueCodec::Temporal { kind } => format!(
                "fudgeMsg.getFieldValue({}.class, fudgeField)",
                self.java_type(&FieldType::Primitive(*kind))
            ),
            ValueCodec::Enum { id, encoding } => {
                let wire = match encoding {
                    EnumEncoding::Integer => "Integer",
                    EnumEncoding::Symbolic | EnumEncoding::String => "String",
                };
                format!(
                    "{}.fromFudgeEncoding(fudgeMsg.getFieldValue({wire}.class, fudgeField))",
                    self.schema.qualified_enum_name(*id)
                )
            }
            ValueCodec::PrimitiveArray { kind, length } => {
                let read = format!(
                    "fudgeMsg.getFieldValue({}[].class, fudgeField)",
                    kind.keyword()
                );
                match length {
                    Some(n) => format!("{DECODERS_CLASS}.checkLength({read}, {n}, \"{suffix}\")"),
                    None => read,
                }
            }
            ValueCodec::Anonymous => sub.to_string(),
            ValueCodec::Message {
                id,
                with_context: nested_context,
                ..
            } => {
                let deserializer = if *nested_context { "deserializer, " } else { "" };
                format!(
                    "{}.fromFudgeMsg({deserializer}{sub})",
                    self.schema.qualified_name(*id)
                )
            }
            ValueCodec::ExternalMessage { id, .. } => format!(
                "deserializer.fieldValueToObject({}.class, fudgeField)",
                self.schema.qualified_name(*id)
            ),
            ValueCodec::ExternalUser { token, .. } => {
                format!("deserializer.fieldValueToObject({token}.class, fudgeField)")
            }
            ValueCodec::Container { .. } => {
                let deserializer = if with_context { "deserializer, " } else { "" };
                format!("read{suffix}{depth}({deserializer}{sub})")
            }
        }
    }

    // ========================================================================
    // Per-field helpers
    // ========================================================================

    fn field_helpers(&mut self, id: MessageId) {
        let schema = self.schema;
        let plan = self.plan.message(id);
        let message_name = schema.message(id).name.clone();
        let with_context = plan.with_context();
        let codecs = plan.codec.encode_order.clone();
        let effective = schema.effective_fields(id);

        for (fid, field) in &effective {
            let Some(codec) = codecs.iter().find(|c| c.field == *fid) else {
                continue;
            };
            let names = FieldNames::of(field);
            if !(field.ty.is_indicator() && !field.repeated) {
                self.assign_helper(*fid, field, &names);
            }
            if self.needs_copy_helper(*fid) {
                self.copy_helper(*fid, field, &names);
            }
            if let Some(plan) = self.copy_plan(*fid) {
                self.array_copy_helpers(&field.ty, plan, &names.suffix, &field.name, 0);
            }
            self.decode_helper(&message_name, field, codec, &names, with_context);
            self.container_helpers(&field.ty, &codec.codec, &names.suffix, &field.name, 0, with_context);
        }
    }

    fn assign_expr(&self, plan: &CopyPlan, value: &str, suffix: &str) -> String {
        match plan {
            CopyPlan::ConvertTemporal { temporal } => {
                let binding = match temporal {
                    PrimitiveKind::Date => &self.caps.temporal.date,
                    PrimitiveKind::Time => &self.caps.temporal.time,
                    _ => &self.caps.temporal.datetime,
                };
                format!("{value}.{}()", binding.method)
            }
            other => copy_expr(other, value, suffix, 0),
        }
    }

    fn assign_helper(&mut self, fid: FieldId, field: &FieldDefinition, names: &FieldNames) {
        let Some(assignment) = self.plan.message(fid.message).constructor.assignment(fid).cloned()
        else {
            return;
        };
        let slot_type = self.slot_type(field);
        let name = &field.name;

        self.line("");
        self.open(format!(
            "private static {slot_type} assign{}(final {} value) {{",
            names.suffix,
            self.param_type(field, true)
        ));
        self.open("if (value == null) {");
        if assignment.reject_null {
            self.line(format!(
                "throw new NullPointerException(\"'{name}' must not be null\");"
            ));
        } else {
            self.line(format!("return {};", zero_value(&slot_type)));
        }
        self.close("}");

        match assignment.repeated {
            Some(check) => {
                let stored = self.element_boxed(&field.ty);
                let given = parameter_type(&field.ty, self.schema, self.caps).boxed;
                if check.reject_empty {
                    self.line(format!(
                        "if (value.isEmpty()) throw new IllegalArgumentException(\"'{name}' must not be empty\");"
                    ));
                } else {
                    self.line("if (value.isEmpty()) return null;");
                }
                self.line(format!(
                    "final java.util.List<{stored}> copy = new java.util.ArrayList<{stored}>(value.size());"
                ));
                self.open(format!("for (final {given} element : value) {{"));
                self.line(format!(
                    "if (element == null) throw new NullPointerException(\"'{name}' must not contain null\");"
                ));
                self.line(format!(
                    "copy.add({});",
                    self.assign_expr(&assignment.copy, "element", &names.suffix)
                ));
                self.close("}");
                self.line("return java.util.Collections.unmodifiableList(copy);");
            }
            None => {
                self.line(format!(
                    "return {};",
                    self.assign_expr(&assignment.copy, "value", &names.suffix)
                ));
            }
        }
        self.close("}");
    }

    fn copy_helper(&mut self, fid: FieldId, field: &FieldDefinition, names: &FieldNames) {
        let Some(plan) = self.copy_plan(fid) else {
            return;
        };
        let slot_type = self.slot_type(field);

        self.line("");
        self.open(format!(
            "private static {slot_type} copy{}(final {slot_type} value) {{",
            names.suffix
        ));
        self.line("if (value == null) return null;");
        if field.repeated {
            let element = self.element_boxed(&field.ty);
            self.line(format!(
                "final java.util.List<{element}> copy = new java.util.ArrayList<{element}>(value.size());"
            ));
            self.line(format!(
                "for (final {element} element : value) copy.add({});",
                copy_expr(plan, "element", &names.suffix, 0)
            ));
            self.line("return java.util.Collections.unmodifiableList(copy);");
        } else {
            self.line(format!("return {};", copy_expr(plan, "value", &names.suffix, 0)));
        }
        self.close("}");
    }

    fn array_copy_helpers(&mut self, ty: &FieldType, plan: &CopyPlan, suffix: &str, name: &str, depth: usize) {
        let (CopyPlan::Array(copy), FieldType::Array(array)) = (plan, ty.underlying(self.schema)) else {
            return;
        };
        let java = self.java_type(ty);

        self.line("");
        self.open(format!(
            "private static {java} copy{suffix}{depth}(final {java} value) {{"
        ));
        if let Some(length) = copy.length {
            self.line(format!(
                "{DECODERS_CLASS}.checkLength(value, {length}, \"{name}\");"
            ));
        }
        if copy.per_element {
            self.line(format!(
                "final {java} copy = {};",
                new_array(&java, "value.length")
            ));
            self.open("for (int i = 0; i < value.length; i++) {");
            self.line(format!(
                "if (value[i] != null) copy[i] = {};",
                copy_expr(&copy.element, "value[i]", suffix, depth + 1)
            ));
            self.close("}");
            self.line("return copy;");
        } else {
            self.line("return value.clone();");
        }
        self.close("}");

        let element = array.element.as_ref().clone();
        self.array_copy_helpers(&element, &copy.element, suffix, name, depth + 1);
    }

    fn decode_helper(
        &mut self,
        message_name: &str,
        field: &FieldDefinition,
        codec: &FieldCodec,
        names: &FieldNames,
        with_context: bool,
    ) {
        let slot_type = self.slot_type(field);
        let name = &field.name;
        let not_a = format!("Fudge message is not a {message_name} - field '{name}'");

        self.line("");
        self.open(format!(
            "private static {slot_type} decode{}({}) {{",
            names.suffix,
            self.decode_params(with_context)
        ));

        if codec.codec == ValueCodec::Indicator && !codec.repeated {
            // Presence alone decides; there is nothing to type-check.
            self.line(format!(
                "return fudgeMsg.{} != null;",
                names.lookup(&codec.key, false)
            ));
            self.close("}");
            return;
        }

        let read = self.read_value(&codec.codec, &names.suffix, 0, with_context);
        let mismatch = format!(
            "throw new IllegalArgumentException(\"{not_a} is not {}\", e);",
            describe_wire(&codec.codec, codec.wire_type.name())
        );
        if codec.repeated {
            let element = self.element_boxed(&field.ty);
            self.line(format!(
                "final java.util.List<FudgeField> fudgeFields = fudgeMsg.{};",
                names.lookup(&codec.key, true)
            ));
            self.open("if (fudgeFields.isEmpty()) {");
            if codec.required {
                self.line(format!(
                    "throw new IllegalArgumentException(\"{not_a} is not present\");"
                ));
            } else {
                self.line("return null;");
            }
            self.close("}");
            self.line(format!(
                "final java.util.List<{element}> values = new java.util.ArrayList<{element}>(fudgeFields.size());"
            ));
            self.open("try {");
            self.line(format!(
                "for (final FudgeField fudgeField : fudgeFields) values.add({read});"
            ));
            self.close("}");
            self.open("catch (IllegalArgumentException e) {");
            self.line(mismatch);
            self.close("}");
            self.line("return java.util.Collections.unmodifiableList(values);");
        } else {
            self.line(format!(
                "final FudgeField fudgeField = fudgeMsg.{};",
                names.lookup(&codec.key, false)
            ));
            self.open("if (fudgeField == null) {");
            if codec.required {
                self.line(format!(
                    "throw new IllegalArgumentException(\"{not_a} is not present\");"
                ));
            } else {
                self.line(format!("return {};", self.absent_value(field)));
            }
            self.close("}");
            self.open("try {");
            self.line(format!("return {read};"));
            self.close("}");
            self.open("catch (IllegalArgumentException e) {");
            self.line(mismatch);
            self.close("}");
        }
        self.close("}");
    }

    /// `read`/`write` helpers for array fields carried as sub-containers.
    fn container_helpers(
        &mut self,
        ty: &FieldType,
        codec: &ValueCodec,
        suffix: &str,
        name: &str,
        depth: usize,
        with_context: bool,
    ) {
        let (
            ValueCodec::Container {
                element: element_codec,
                length,
                ..
            },
            FieldType::Array(array),
        ) = (codec, ty.underlying(self.schema))
        else {
            return;
        };
        let java = self.java_type(ty);
        let element_type = array.element.as_ref().clone();
        let element_java = self.java_type(&element_type);
        let element_primitive = map_field_type(&element_type, self.schema, self.caps).is_primitive;
        let (ctx_type, ctx) = Self::encode_context(with_context);

        self.line("");
        self.open(format!(
            "private static {java} read{suffix}{depth}({}) {{",
            self.decode_params(with_context)
        ));
        self.line("final java.util.List<FudgeField> fudgeFields = fudgeMsg.getAllFields();");
        self.line(format!(
            "final {java} values = {};",
            new_array(&java, "fudgeFields.size()")
        ));
        self.line("int i = 0;");
        self.open("for (final FudgeField fudgeField : fudgeFields) {");
        self.line(format!(
            "if (!(fudgeField.getValue() instanceof IndicatorType)) values[i] = {};",
            self.read_value(element_codec, suffix, depth + 1, with_context)
        ));
        self.line("i++;");
        self.close("}");
        match length {
            Some(n) => self.line(format!(
                "return {DECODERS_CLASS}.checkLength(values, {n}, \"{name}\");"
            )),
            None => self.line("return values;"),
        }
        self.close("}");

        self.line("");
        self.open(format!(
            "private static FudgeMsg write{suffix}{depth}(final {ctx_type} {ctx}, final {java} values) {{"
        ));
        self.line(format!("final MutableFudgeMsg msg = {ctx}.newMessage();"));
        self.open(format!("for (final {element_java} value : values) {{"));
        if element_primitive {
            self.write_value(element_codec, "msg", "null", "null", "value", suffix, depth + 1, with_context);
        } else {
            self.line("if (value == null) msg.add(null, null, IndicatorType.INSTANCE);");
            self.open("else {");
            self.write_value(element_codec, "msg", "null", "null", "value", suffix, depth + 1, with_context);
            self.close("}");
        }
        self.close("}");
        self.line("return msg;");
        self.close("}");

        self.container_helpers(&element_type, element_codec, suffix, name, depth + 1, with_context);
    }

    // ========================================================================
    // Accessors and value semantics
    // ========================================================================

    fn accessors(&mut self, id: MessageId) {
        let schema = self.schema;
        for (_, field) in schema.own_fields(id) {
            let names = FieldNames::of(field);
            let slot_type = self.slot_type(field);
            self.line("");
            self.open(format!("public {slot_type} {}() {{", names.getter));
            self.line(format!("return {};", names.slot));
            self.close("}");
            if field.mutable {
                self.line("");
                self.open(format!(
                    "public void {}(final {} {}) {{",
                    names.setter,
                    self.param_type(field, true),
                    names.param
                ));
                self.line(format!(
                    "{} = {};",
                    names.slot,
                    self.assign_call(field, &names.param)
                ));
                self.close("}");
            }
        }
    }

    fn value_semantics(&mut self, id: MessageId) {
        let schema = self.schema;
        let plan = self.plan.message(id);
        let semantics = plan.semantics.clone();
        let name = schema.message(id).name.clone();
        let has_base = semantics.base.is_some();

        self.line("");
        self.open("public boolean equals(final Object o) {");
        self.line("if (o == this) return true;");
        self.line("if (o == null || o.getClass() != getClass()) return false;");
        if !semantics.fields.is_empty() {
            self.line(format!("final {name} msg = ({name}) o;"));
        }
        for semantic in &semantics.fields {
            let field = schema.field(semantic.field);
            let slot = FieldNames::of(field).slot;
            let java = self.slot_type(field);
            let check = if semantic.array && !field.repeated {
                format!("!java.util.Objects.deepEquals({slot}, msg.{slot})")
            } else if self.slot_is_primitive(field) {
                match java.as_str() {
                    "float" => format!("Float.compare({slot}, msg.{slot}) != 0"),
                    "double" => format!("Double.compare({slot}, msg.{slot}) != 0"),
                    _ => format!("{slot} != msg.{slot}"),
                }
            } else {
                format!("!java.util.Objects.equals({slot}, msg.{slot})")
            };
            self.line(format!("if ({check}) return false;"));
        }
        self.line(if has_base { "return super.equals(o);" } else { "return true;" });
        self.close("}");

        self.line("");
        self.open("public int hashCode() {");
        self.line(if has_base {
            "int hc = super.hashCode();"
        } else {
            "int hc = 1;"
        });
        for semantic in &semantics.fields {
            let field = schema.field(semantic.field);
            let slot = FieldNames::of(field).slot;
            let component = if semantic.array && !field.repeated {
                format!("java.util.Arrays.deepHashCode(new Object[] {{ {slot} }})")
            } else if self.slot_is_primitive(field) {
                match self.slot_type(field).as_str() {
                    "boolean" => format!("({slot} ? 1231 : 1237)"),
                    "long" => format!("(int) ({slot} ^ ({slot} >>> 32))"),
                    "float" => format!("Float.floatToIntBits({slot})"),
                    "double" => format!("Double.hashCode({slot})"),
                    _ => slot.clone(),
                }
            } else {
                format!("java.util.Objects.hashCode({slot})")
            };
            self.line(format!("hc = hc * 31 + {component};"));
        }
        self.line("return hc;");
        self.close("}");

        let parts: Vec<String> = schema
            .effective_fields(id)
            .iter()
            .enumerate()
            .map(|(i, (_, f))| {
                let separator = if i == 0 { "" } else { ", " };
                format!(
                    "\"{separator}{}=\" + {DECODERS_CLASS}.render({}())",
                    f.name,
                    FieldNames::of(f).getter
                )
            })
            .collect();
        self.line("");
        self.open("public String toString() {");
        if parts.is_empty() {
            self.line(format!("return \"{name}[]\";"));
        } else {
            self.line(format!("return \"{name}[\" + {} + \"]\";", parts.join(" + ")));
        }
        self.close("}");
    }

    // ========================================================================
    // Enums, taxonomies and the registry
    // ========================================================================

    fn enum_type(&mut self, id: EnumId, nested: bool) {
        let schema = self.schema;
        let def = schema.enum_def(id);
        debug!(enum_name = %schema.qualified_enum_name(id), "generating java enum");
        let modifiers = if nested { "public static" } else { "public" };
        let name = def.name.clone();

        self.open(format!("{modifiers} enum {name} {{"));
        let count = def.members.len();
        if count == 0 {
            self.line(";");
        }
        for (i, member) in def.members.iter().enumerate() {
            let terminator = if i + 1 == count { ";" } else { "," };
            match def.encoding {
                EnumEncoding::Symbolic => self.line(format!("{}{terminator}", member.label)),
                EnumEncoding::Integer => {
                    self.line(format!("{}({}){terminator}", member.label, member.code))
                }
                EnumEncoding::String => self.line(format!(
                    "{}({}){terminator}",
                    member.label,
                    java_string(&member.code.to_string())
                )),
            }
        }

        let encoding_type = match def.encoding {
            EnumEncoding::Integer => "int",
            EnumEncoding::Symbolic | EnumEncoding::String => "String",
        };
        if def.encoding != EnumEncoding::Symbolic {
            self.line("");
            self.line(format!("private final {encoding_type} _fudgeEncoding;"));
            self.line("");
            self.open(format!(
                "private {name}(final {encoding_type} fudgeEncoding) {{"
            ));
            self.line("_fudgeEncoding = fudgeEncoding;");
            self.close("}");
        }
        self.line("");
        self.open(format!("public {encoding_type} getFudgeEncoding() {{"));
        if def.encoding == EnumEncoding::Symbolic {
            self.line("return name();");
        } else {
            self.line("return _fudgeEncoding;");
        }
        self.close("}");

        self.line("");
        self.open(format!(
            "public static {name} fromFudgeEncoding(final {encoding_type} fudgeEncoding) {{"
        ));
        let members = def.members.clone();
        if def.encoding == EnumEncoding::Integer {
            self.open("switch (fudgeEncoding) {");
            for member in &members {
                self.line(format!("case {}: return {};", member.code, member.label));
            }
            self.close("}");
        } else {
            for member in &members {
                let code = match def.encoding {
                    EnumEncoding::Symbolic => member.label.clone(),
                    _ => member.code.to_string(),
                };
                self.line(format!(
                    "if ({}.equals(fudgeEncoding)) return {};",
                    java_string(&code),
                    member.label
                ));
            }
        }
        self.line(format!(
            "throw new IllegalArgumentException(\"field is not a {name} - invalid value '\" + fudgeEncoding + \"'\");"
        ));
        self.close("}");
        self.close("}");
    }

    fn taxonomy_class(&mut self, id: TaxonomyId) {
        let schema = self.schema;
        let def = schema.taxonomy(id);
        let name = to_pascal_case(&def.name);
        debug!(taxonomy = %def.name, entries = def.entries.len(), "generating java taxonomy");
        let entries = def.entries.clone();

        self.open(format!(
            "public class {name} extends org.fudgemsg.taxon.MapFudgeTaxonomy {{"
        ));
        for entry in &entries {
            let constant = to_constant_case(&entry.name);
            self.line(format!(
                "public static final String STR_{constant} = {};",
                java_string(&entry.name)
            ));
            self.line(format!(
                "public static final short VAL_{constant} = {};",
                entry.ordinal
            ));
        }
        self.line("");
        self.line(format!("private static final {name} INSTANCE = new {name}();"));
        self.line("");
        self.open(format!("public static {name} getInstance() {{"));
        self.line("return INSTANCE;");
        self.close("}");
        self.line("");
        let ordinals: Vec<String> = entries
            .iter()
            .map(|e| format!("VAL_{}", to_constant_case(&e.name)))
            .collect();
        let names: Vec<String> = entries
            .iter()
            .map(|e| format!("STR_{}", to_constant_case(&e.name)))
            .collect();
        self.open(format!("private {name}() {{"));
        self.line(format!(
            "super(new int[] {{ {} }}, new String[] {{ {} }});",
            ordinals.join(", "),
            names.join(", ")
        ));
        self.close("}");
        self.close("}");
    }

    fn decoders_class(&mut self) {
        let (schema, plans) = (self.schema, self.plan);
        let generated: Vec<MessageId> = plans
            .messages()
            .filter(|m| !m.flags.external && is_generated(schema, m.id))
            .map(|m| m.id)
            .collect();

        self.open(format!("public final class {DECODERS_CLASS} {{"));
        self.open("public static final class Slots {");
        self.open("private Slots() {");
        self.close("}");
        self.close("}");
        self.line("");
        self.line("static final Slots SLOTS = new Slots();");
        self.line("");
        self.line(
            "private static final java.util.Map<Class<?>, String> TOKENS = new java.util.HashMap<Class<?>, String>();",
        );
        self.line("");
        self.open("static {");
        for id in &generated {
            self.line(format!(
                "TOKENS.put({}.class, {});",
                schema.qualified_name(*id),
                java_string(&schema.type_token(*id))
            ));
        }
        self.close("}");
        self.line("");
        self.open(format!("private {DECODERS_CLASS}() {{"));
        self.close("}");

        self.line("");
        self.open(
            "public static Object decode(final String token, final FudgeDeserializer deserializer, final FudgeMsg fudgeMsg) {",
        );
        self.open("switch (token) {");
        for token in plans.registry().tokens() {
            let Some(id) = plans.registry().resolve(token) else {
                continue;
            };
            if !generated.contains(&id) {
                continue;
            }
            let args = if plans.message(id).with_context() {
                "deserializer, fudgeMsg"
            } else {
                "fudgeMsg"
            };
            self.line(format!("case {}:", java_string(token)));
            self.line(format!(
                "    return new {}({args});",
                schema.qualified_name(id)
            ));
        }
        self.line("default:");
        self.line("    return null;");
        self.close("}");
        self.close("}");

        self.line("");
        self.open(
            "public static void header(final MutableFudgeMsg msg, final Class<?> type, final Class<?> declared) {",
        );
        self.open("for (Class<?> c = type; c != null; c = c.getSuperclass()) {");
        self.line("final String token = TOKENS.get(c);");
        self.line("if (token == null) break;");
        self.line("msg.add(null, 0, token);");
        self.line("if (c == declared) break;");
        self.close("}");
        self.close("}");

        self.line("");
        self.open("public static <T> T checkLength(final T array, final int length, final String field) {");
        self.open("if (java.lang.reflect.Array.getLength(array) != length) {");
        self.line(
            "throw new IllegalArgumentException(\"'\" + field + \"' is not the expected length (\" + length + \")\");",
        );
        self.close("}");
        self.line("return array;");
        self.close("}");

        self.line("");
        self.open("public static String render(final Object value) {");
        self.line("final String text = java.util.Arrays.deepToString(new Object[] { value });");
        self.line("return text.substring(1, text.length() - 1);");
        self.close("}");
        self.close("}");
    }
}

/// Emitted as a class: a non-external target, or nested inside one.
fn is_generated(schema: &Schema, id: MessageId) -> bool {
    let message = schema.message(id);
    if message.external {
        return false;
    }
    match message.enclosing {
        Some(outer) => is_generated(schema, outer),
        None => message.target,
    }
}

fn copy_expr(plan: &CopyPlan, value: &str, suffix: &str, depth: usize) -> String {
    match plan {
        CopyPlan::Alias | CopyPlan::ConvertTemporal { .. } => value.to_string(),
        CopyPlan::Clone { .. } => format!("{value}.clone()"),
        CopyPlan::Array(_) => format!("copy{suffix}{depth}({value})"),
    }
}

/// `new T[size][]...` for an array type written `T[]...`.
fn new_array(java: &str, size: &str) -> String {
    match java.find("[]") {
        Some(at) => format!("new {}[{size}]{}", &java[..at], &java[at + 2..]),
        None => format!("new {java}[{size}]"),
    }
}

fn describe_wire(codec: &ValueCodec, wire: &str) -> String {
    match codec {
        ValueCodec::Enum { .. } => "a valid enum value".to_string(),
        ValueCodec::Message { token, .. } => format!("a {token} message"),
        _ => wire.to_string(),
    }
}

fn java_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// FNV-1a over the type token and the effective field signature.
fn serial_version_uid(schema: &Schema, id: MessageId) -> i64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    let mut feed = |text: &str| {
        for byte in text.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
    };
    feed(&schema.type_token(id));
    for (_, field) in schema.effective_fields(id) {
        feed(&field.name);
        feed(&field.ty.describe(schema));
    }
    hash as i64
}

#[cfg(test)]
#[path = "java_tests.rs"]
mod java_tests;
