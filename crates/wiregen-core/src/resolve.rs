//! Resolution pass: turns a [`SchemaDocument`] into a linked, validated [`Schema`].
//!
//! Every forward reference is resolved exactly once. The pass fails fast on
//! the first schema error, reporting the position of the offending definition.

use crate::document::{
    EnumDocument, EnumEncodingDocument, EnumValueDocument, MessageDocument, SchemaDocument,
    TypeExpr,
};
use crate::error::{Position, SchemaError, SchemaResult};
use crate::model::{
    EnumCode, EnumDefinition, EnumEncoding, EnumId, EnumMember, FieldDefinition, FieldId,
    LiteralValue, MessageDefinition, MessageId, Schema, TaxonomyDefinition, TaxonomyEntry,
    TypeDefId, TypeDefinition, WireKey,
};
use crate::types::{FieldType, MessageRef, PrimitiveKind};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Resolve a schema document into a read-only model.
pub fn resolve(document: &SchemaDocument) -> SchemaResult<Schema> {
    let mut resolver = Resolver::new(document);

    for message in &document.messages {
        resolver.declare_message(message, None)?;
    }
    for enum_doc in &document.enums {
        resolver.declare_enum(enum_doc, None)?;
    }
    resolver.declare_type_defs()?;
    resolver.declare_taxonomies()?;

    resolver.resolve_type_defs()?;
    resolver.resolve_extends()?;
    resolver.check_inheritance_cycles()?;
    resolver.resolve_fields()?;

    let schema = resolver.schema;
    debug!(
        source = document.source_name(),
        messages = schema.messages.len(),
        enums = schema.enums.len(),
        types = schema.types.len(),
        taxonomies = schema.taxonomies.len(),
        "schema resolved"
    );
    Ok(schema)
}

#[derive(Debug, Clone, Copy)]
enum Symbol {
    Message(MessageId),
    Enum(EnumId),
    Type(TypeDefId),
}

struct Resolver<'d> {
    document: &'d SchemaDocument,
    schema: Schema,
    symbols: HashMap<String, Symbol>,
    message_docs: Vec<&'d MessageDocument>,
}

impl<'d> Resolver<'d> {
    fn new(document: &'d SchemaDocument) -> Self {
        Self {
            document,
            schema: Schema {
                namespace: document.namespace.clone(),
                ..Schema::default()
            },
            symbols: HashMap::new(),
            message_docs: Vec::new(),
        }
    }

    fn position(&self, line: u32) -> Position {
        Position::new(self.document.source_name(), line)
    }

    fn define(&mut self, name: String, symbol: Symbol, position: &Position) -> SchemaResult<()> {
        if self.symbols.contains_key(&name) {
            return Err(SchemaError::DuplicateDefinition {
                name,
                position: position.clone(),
            });
        }
        self.symbols.insert(name, symbol);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Declaration
    // ------------------------------------------------------------------

    fn declare_message(
        &mut self,
        doc: &'d MessageDocument,
        enclosing: Option<MessageId>,
    ) -> SchemaResult<()> {
        let id = MessageId(self.schema.messages.len() as u32);
        let position = self.position(doc.line);
        // nested definitions of a hand-written message are hand-written too
        let external = doc.external
            || enclosing.is_some_and(|outer| self.schema.message(outer).external);

        self.schema.messages.push(MessageDefinition {
            name: doc.name.clone(),
            enclosing,
            position: position.clone(),
            target: doc.target,
            fields: Vec::new(),
            messages: Vec::new(),
            enums: Vec::new(),
            extends: None,
            is_abstract: doc.is_abstract,
            external,
            bindings: doc.bindings.clone(),
            override_map: IndexMap::new(),
        });
        self.message_docs.push(doc);

        let qualified = self.schema.qualified_name(id);
        self.define(qualified, Symbol::Message(id), &position)?;
        if let Some(outer) = enclosing {
            self.schema.messages[outer.index()].messages.push(id);
        }

        for enum_doc in &doc.enums {
            self.declare_enum(enum_doc, Some(id))?;
        }
        for nested in &doc.messages {
            self.declare_message(nested, Some(id))?;
        }
        Ok(())
    }

    fn declare_enum(&mut self, doc: &EnumDocument, enclosing: Option<MessageId>) -> SchemaResult<()> {
        let id = EnumId(self.schema.enums.len() as u32);
        let position = self.position(doc.line);

        let encoding = match doc.encoding {
            EnumEncodingDocument::Symbolic => EnumEncoding::Symbolic,
            EnumEncodingDocument::Integer => EnumEncoding::Integer,
            EnumEncodingDocument::String => EnumEncoding::String,
        };

        let mut members = Vec::with_capacity(doc.values.len());
        let mut labels = HashSet::new();
        let mut codes = HashSet::new();
        for (index, value) in doc.values.iter().enumerate() {
            let label = value.label().to_string();
            let code = enum_code(encoding, index, value).map_err(|reason| {
                SchemaError::InvalidType {
                    expr: label.clone(),
                    reason,
                    position: position.clone(),
                }
            })?;
            if !labels.insert(label.clone()) {
                return Err(SchemaError::DuplicateEnumValue {
                    name: doc.name.clone(),
                    value: label,
                    position,
                });
            }
            if !codes.insert(code.clone()) {
                return Err(SchemaError::DuplicateEnumValue {
                    name: doc.name.clone(),
                    value: code.to_string(),
                    position,
                });
            }
            members.push(EnumMember { label, code });
        }

        self.schema.enums.push(EnumDefinition {
            name: doc.name.clone(),
            enclosing,
            position: position.clone(),
            target: doc.target,
            encoding,
            members,
            bindings: doc.bindings.clone(),
        });

        let qualified = self.schema.qualified_enum_name(id);
        self.define(qualified, Symbol::Enum(id), &position)?;
        if let Some(outer) = enclosing {
            self.schema.messages[outer.index()].enums.push(id);
        }
        Ok(())
    }

    fn declare_type_defs(&mut self) -> SchemaResult<()> {
        for doc in &self.document.types {
            let id = TypeDefId(self.schema.types.len() as u32);
            let position = self.position(doc.line);
            // underlying type is filled in once every name is declared
            self.schema.types.push(TypeDefinition {
                name: doc.name.clone(),
                enclosing: None,
                position: position.clone(),
                underlying: FieldType::Message(MessageRef::Null),
                external: doc.external,
            });
            self.define(doc.name.clone(), Symbol::Type(id), &position)?;
        }
        Ok(())
    }

    fn declare_taxonomies(&mut self) -> SchemaResult<()> {
        let mut names = HashSet::new();
        for doc in &self.document.taxonomies {
            let position = self.position(doc.line);
            if !names.insert(doc.name.clone()) {
                return Err(SchemaError::DuplicateDefinition {
                    name: doc.name.clone(),
                    position,
                });
            }

            let mut entries: Vec<TaxonomyEntry> = doc
                .entries
                .iter()
                .map(|(name, ordinal)| TaxonomyEntry {
                    ordinal: *ordinal,
                    name: name.clone(),
                })
                .collect();
            entries.sort_by_key(|e| e.ordinal);
            if let Some(pair) = entries.windows(2).find(|w| w[0].ordinal == w[1].ordinal) {
                return Err(SchemaError::DuplicateEnumValue {
                    name: doc.name.clone(),
                    value: pair[1].ordinal.to_string(),
                    position,
                });
            }

            self.schema.taxonomies.push(TaxonomyDefinition {
                name: doc.name.clone(),
                position,
                target: doc.target,
                entries,
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Name lookup
    // ------------------------------------------------------------------

    /// Searches enclosing scopes inner to outer, then the top level.
    fn lookup(&self, scope: Option<MessageId>, name: &str) -> Option<Symbol> {
        let mut current = scope;
        while let Some(id) = current {
            let candidate = format!("{}.{}", self.schema.qualified_name(id), name);
            if let Some(symbol) = self.symbols.get(&candidate) {
                return Some(*symbol);
            }
            current = self.schema.message(id).enclosing;
        }

        if let Some(symbol) = self.symbols.get(name) {
            return Some(*symbol);
        }

        let namespace = self.document.namespace.as_str();
        if namespace.is_empty() {
            return None;
        }
        name.strip_prefix(namespace)
            .and_then(|rest| rest.strip_prefix('.'))
            .and_then(|local| self.symbols.get(local).copied())
    }

    fn resolve_type(
        &self,
        expr: &str,
        scope: Option<MessageId>,
        position: &Position,
    ) -> SchemaResult<FieldType> {
        let parsed = TypeExpr::parse(expr).map_err(|reason| SchemaError::InvalidType {
            expr: expr.to_string(),
            reason,
            position: position.clone(),
        })?;

        let mut ty = if let Some(kind) = PrimitiveKind::from_keyword(&parsed.base) {
            FieldType::Primitive(kind)
        } else if parsed.base == "message" {
            FieldType::Message(MessageRef::Anonymous)
        } else {
            match self.lookup(scope, &parsed.base) {
                Some(Symbol::Message(id)) => FieldType::Message(MessageRef::Defined(id)),
                Some(Symbol::Enum(id)) => FieldType::Enum(id),
                Some(Symbol::Type(id)) => FieldType::User(id),
                None => {
                    return Err(SchemaError::UnresolvedReference {
                        name: parsed.base,
                        position: position.clone(),
                    });
                }
            }
        };

        for dimension in parsed.dimensions.iter().rev() {
            ty = FieldType::array(ty, *dimension);
        }
        Ok(ty)
    }

    // ------------------------------------------------------------------
    // Cross references
    // ------------------------------------------------------------------

    fn resolve_type_defs(&mut self) -> SchemaResult<()> {
        for (index, doc) in self.document.types.iter().enumerate() {
            let position = self.position(doc.line);
            let underlying = self.resolve_type(&doc.ty, None, &position)?;
            self.schema.types[index].underlying = underlying;
        }

        for (index, def) in self.schema.types.iter().enumerate() {
            let start = TypeDefId(index as u32);
            let mut chain = vec![def.name.clone()];
            let mut seen = HashSet::from([start]);
            let mut current = &def.underlying;
            while let FieldType::User(next) = current {
                chain.push(self.schema.type_def(*next).name.clone());
                if !seen.insert(*next) {
                    return Err(SchemaError::AliasCycle {
                        chain,
                        position: def.position.clone(),
                    });
                }
                current = &self.schema.type_def(*next).underlying;
            }
        }
        Ok(())
    }

    fn resolve_extends(&mut self) -> SchemaResult<()> {
        for index in 0..self.schema.messages.len() {
            let doc = self.message_docs[index];
            let Some(base_name) = &doc.extends else {
                continue;
            };
            let id = MessageId(index as u32);
            let scope = self.schema.message(id).enclosing;
            match self.lookup(scope, base_name) {
                Some(Symbol::Message(base)) => {
                    trace!(message = %doc.name, base = %base_name, "resolved extends");
                    self.schema.messages[index].extends = Some(base);
                }
                _ => {
                    return Err(SchemaError::UnresolvedReference {
                        name: base_name.clone(),
                        position: self.schema.message(id).position.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_inheritance_cycles(&self) -> SchemaResult<()> {
        for (start, message) in self.schema.messages() {
            let mut chain = vec![message.name.clone()];
            let mut seen = HashSet::from([start]);
            let mut current = message.extends;
            while let Some(base) = current {
                chain.push(self.schema.message(base).name.clone());
                if base == start {
                    return Err(SchemaError::InheritanceCycle {
                        chain,
                        position: message.position.clone(),
                    });
                }
                if !seen.insert(base) {
                    // a cycle further up, reported when its own members are checked
                    break;
                }
                current = self.schema.message(base).extends;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Fields and override maps
    // ------------------------------------------------------------------

    fn resolve_fields(&mut self) -> SchemaResult<()> {
        // ancestors first so overrides can see resolved base fields
        let mut order: Vec<MessageId> = self.schema.messages().map(|(id, _)| id).collect();
        order.sort_by_key(|id| self.schema.ancestors(*id).len());

        for id in order {
            let fields = self.resolve_message_fields(id)?;
            self.schema.messages[id.index()].fields = fields;
            let override_map = self.build_override_map(id);
            self.check_ordinals(id, &override_map)?;
            self.schema.messages[id.index()].override_map = override_map;
        }
        Ok(())
    }

    fn resolve_message_fields(&self, id: MessageId) -> SchemaResult<Vec<FieldDefinition>> {
        let doc = self.message_docs[id.index()];
        let message_name = self.schema.qualified_name(id);
        let ancestors = self.schema.ancestors(id);
        let mut fields = Vec::with_capacity(doc.fields.len());
        let mut names = HashSet::new();

        for field_doc in &doc.fields {
            let position = self.position(field_doc.line);

            if !names.insert(field_doc.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    message: message_name,
                    field: field_doc.name.clone(),
                    position,
                });
            }

            if let Some(ordinal) = field_doc.ordinal
                && ordinal <= 0
            {
                return Err(SchemaError::ReservedOrdinal {
                    field: field_doc.name.clone(),
                    ordinal,
                    position,
                });
            }

            let ty = self.resolve_type(&field_doc.ty, Some(id), &position)?;

            let inherited = ancestors.iter().find_map(|anc| {
                self.schema
                    .message(*anc)
                    .fields
                    .iter()
                    .position(|f| f.name == field_doc.name)
                    .map(|index| FieldId {
                        message: *anc,
                        index: index as u32,
                    })
            });

            let (key, overrides) = match (field_doc.overrides, inherited) {
                (true, Some(ancestor)) => {
                    let inherited_key = self.schema.field(ancestor).key.clone();
                    if let Some(ordinal) = field_doc.ordinal
                        && inherited_key != WireKey::Ordinal(ordinal)
                    {
                        return Err(SchemaError::OverrideKeyMismatch {
                            field: field_doc.name.clone(),
                            position,
                        });
                    }
                    (inherited_key, Some(ancestor))
                }
                (true, None) => {
                    return Err(SchemaError::UnknownOverride {
                        message: message_name,
                        field: field_doc.name.clone(),
                        position,
                    });
                }
                (false, Some(_)) => {
                    return Err(SchemaError::DuplicateField {
                        message: message_name,
                        field: field_doc.name.clone(),
                        position,
                    });
                }
                (false, None) => {
                    let key = match field_doc.ordinal {
                        Some(ordinal) => WireKey::Ordinal(ordinal),
                        None => WireKey::Name(field_doc.name.clone()),
                    };
                    (key, None)
                }
            };

            let default = match &field_doc.default {
                None => None,
                Some(_) if field_doc.repeated => {
                    return Err(SchemaError::InvalidDefault {
                        field: field_doc.name.clone(),
                        reason: "repeated fields cannot carry a default".to_string(),
                        position,
                    });
                }
                Some(value) => Some(self.literal(&ty, value).map_err(|reason| {
                    SchemaError::InvalidDefault {
                        field: field_doc.name.clone(),
                        reason,
                        position: position.clone(),
                    }
                })?),
            };

            fields.push(FieldDefinition {
                name: field_doc.name.clone(),
                key,
                ty,
                mutable: field_doc.mutable,
                required: field_doc.required,
                repeated: field_doc.repeated,
                default,
                overrides,
                position,
            });
        }
        Ok(fields)
    }

    /// Closest definition wins; `IndexMap::insert` keeps the key's first slot
    /// so the order stays base-first.
    fn build_override_map(&self, id: MessageId) -> IndexMap<String, FieldId> {
        let message = self.schema.message(id);
        let mut map = match message.extends {
            Some(base) => self.schema.message(base).override_map.clone(),
            None => IndexMap::new(),
        };
        for (index, field) in message.fields.iter().enumerate() {
            map.insert(
                field.name.clone(),
                FieldId {
                    message: id,
                    index: index as u32,
                },
            );
        }
        map
    }

    fn check_ordinals(&self, id: MessageId, map: &IndexMap<String, FieldId>) -> SchemaResult<()> {
        let mut seen = HashSet::new();
        for fid in map.values() {
            let field = self.schema.field(*fid);
            if let WireKey::Ordinal(ordinal) = field.key
                && !seen.insert(ordinal)
            {
                return Err(SchemaError::DuplicateOrdinal {
                    message: self.schema.qualified_name(id),
                    ordinal,
                    position: field.position.clone(),
                });
            }
        }
        Ok(())
    }

    fn literal(&self, ty: &FieldType, value: &serde_json::Value) -> Result<LiteralValue, String> {
        match ty {
            FieldType::Primitive(kind) => primitive_literal(*kind, value),
            FieldType::Enum(id) => {
                let def = self.schema.enum_def(*id);
                let label = value
                    .as_str()
                    .ok_or_else(|| format!("expected a member of {}", def.name))?;
                match def.member(label) {
                    Some(_) => Ok(LiteralValue::Enum(label.to_string())),
                    None => Err(format!("'{label}' is not a member of {}", def.name)),
                }
            }
            FieldType::User(id) => {
                let def = self.schema.type_def(*id);
                if def.external {
                    return Err(format!("external type {} cannot carry a default", def.name));
                }
                self.literal(&def.underlying, value)
            }
            FieldType::Array(_) | FieldType::Message(_) => {
                Err("only scalar fields can carry a default".to_string())
            }
        }
    }
}

fn primitive_literal(kind: PrimitiveKind, value: &serde_json::Value) -> Result<LiteralValue, String> {
    match kind {
        PrimitiveKind::Bool | PrimitiveKind::Indicator => value
            .as_bool()
            .map(LiteralValue::Bool)
            .ok_or_else(|| "expected a boolean".to_string()),
        PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Int | PrimitiveKind::Long => {
            let n = value
                .as_i64()
                .ok_or_else(|| "expected an integer".to_string())?;
            let (min, max) = match kind {
                PrimitiveKind::Byte => (i8::MIN as i64, i8::MAX as i64),
                PrimitiveKind::Short => (i16::MIN as i64, i16::MAX as i64),
                PrimitiveKind::Int => (i32::MIN as i64, i32::MAX as i64),
                _ => (i64::MIN, i64::MAX),
            };
            if n < min || n > max {
                return Err(format!("{n} does not fit in {kind}"));
            }
            Ok(LiteralValue::Integer(n))
        }
        PrimitiveKind::Float | PrimitiveKind::Double => value
            .as_f64()
            .map(LiteralValue::Float)
            .ok_or_else(|| "expected a number".to_string()),
        PrimitiveKind::String => value
            .as_str()
            .map(|s| LiteralValue::String(s.to_string()))
            .ok_or_else(|| "expected a string".to_string()),
        PrimitiveKind::Date | PrimitiveKind::Time | PrimitiveKind::DateTime => {
            Err(format!("{kind} fields cannot carry a default"))
        }
    }
}

fn enum_code(
    encoding: EnumEncoding,
    index: usize,
    value: &EnumValueDocument,
) -> Result<EnumCode, String> {
    match (encoding, value) {
        (EnumEncoding::Symbolic, _) => Ok(EnumCode::Str(value.label().to_string())),
        (EnumEncoding::Integer, EnumValueDocument::Label(_)) => i32::try_from(index)
            .map(EnumCode::Int)
            .map_err(|_| "too many members".to_string()),
        (EnumEncoding::Integer, EnumValueDocument::Coded { value, .. }) => value
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(EnumCode::Int)
            .ok_or_else(|| "integer-encoded members need an int code".to_string()),
        (EnumEncoding::String, EnumValueDocument::Label(label)) => Ok(EnumCode::Str(label.clone())),
        (EnumEncoding::String, EnumValueDocument::Coded { value, .. }) => value
            .as_str()
            .map(|s| EnumCode::Str(s.to_string()))
            .ok_or_else(|| "string-encoded members need a string code".to_string()),
    }
}
