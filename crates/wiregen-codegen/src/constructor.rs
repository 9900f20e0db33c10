//! Constructor and accessor planning.
//!
//! Each message gets exactly one construction shape (direct or builder), one
//! wire-decode constructor form, and a copy constructor when one is needed.
//! Field lists are ordered base-first, following the override map.

use crate::analyzer::Analyzer;
use crate::copy_plan::{AssignmentPlan, CopyPlanner};
use serde::Serialize;
use tracing::trace;
use wiregen_core::{FieldId, MessageId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ConstructorShape {
    /// Positional constructor over the fields that must be supplied.
    Direct,
    Builder(BuilderPlan),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuilderPlan {
    /// The base builds without a builder, so this builder carries the
    /// inherited fields itself and constructs the base through its own path.
    pub bridges_base: bool,
    /// One fluent setter per effective field.
    pub setters: Vec<FieldId>,
    /// Append operations for repeated fields.
    pub appenders: Vec<FieldId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireDecodeConstructor {
    /// Threads a decode context.
    pub with_context: bool,
    /// Read first, absence is fatal.
    pub required: Vec<FieldId>,
    /// Read when present, otherwise left at their default.
    pub optional: Vec<FieldId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyConstructor {
    pub required: Vec<FieldId>,
    pub optional: Vec<FieldId>,
    /// Copying null yields a fresh instance with declared defaults.
    pub null_source_allowed: bool,
    /// Public clone operation, as opposed to a constructor kept only for
    /// descendants to chain to.
    pub exposes_clone: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstructorPlan {
    pub message: MessageId,
    pub shape: ConstructorShape,
    /// Fields every construction path must be given, base-first.
    pub required: Vec<FieldId>,
    /// Fields initialised from their declared default when not supplied.
    pub defaulted: Vec<FieldId>,
    /// Every effective field, when some are optional; backs the full-field
    /// constructor.
    pub full: Option<Vec<FieldId>>,
    /// Fields with a generated mutator.
    pub mutators: Vec<FieldId>,
    /// Assignment plan per effective field, base-first.
    pub assignments: Vec<AssignmentPlan>,
    /// Direct construction and decode into this exact message are allowed.
    pub instantiable: bool,
    pub wire_decode: WireDecodeConstructor,
    pub copy: Option<CopyConstructor>,
}

impl ConstructorPlan {
    pub fn uses_builder(&self) -> bool {
        matches!(self.shape, ConstructorShape::Builder(_))
    }

    pub fn assignment(&self, field: FieldId) -> Option<&AssignmentPlan> {
        self.assignments.iter().find(|a| a.field == field)
    }

    pub fn assignment_by_name(&self, name: &str) -> Option<&AssignmentPlan> {
        self.assignments.iter().find(|a| a.name == name)
    }
}

/// Plan construction for a message.
///
/// `with_context` is decided by the caller once per message, from the
/// external-reference scan and the run configuration.
pub fn plan_constructors(
    analyzer: Analyzer<'_>,
    id: MessageId,
    with_context: bool,
) -> ConstructorPlan {
    let schema = analyzer.schema();
    let message = schema.message(id);
    let planner = CopyPlanner::new(analyzer);
    let effective = schema.effective_fields(id);

    let mut required = Vec::new();
    let mut defaulted = Vec::new();
    let mut optional = Vec::new();
    let mut mutators = Vec::new();
    let mut repeated = Vec::new();
    for (fid, field) in &effective {
        if field.must_be_supplied() {
            required.push(*fid);
        } else if field.default.is_some() {
            defaulted.push(*fid);
        }
        if !field.required {
            optional.push(*fid);
        }
        if field.mutable {
            mutators.push(*fid);
        }
        if field.repeated {
            repeated.push(*fid);
        }
    }

    let all: Vec<FieldId> = effective.iter().map(|(fid, _)| *fid).collect();

    let shape = if analyzer.use_builder_pattern(id) {
        let bridges_base = message
            .extends
            .is_some_and(|base| !analyzer.use_builder_pattern(base));
        ConstructorShape::Builder(BuilderPlan {
            bridges_base,
            setters: all.clone(),
            appenders: repeated,
        })
    } else {
        ConstructorShape::Direct
    };

    let wire_required: Vec<FieldId> = effective
        .iter()
        .filter(|(_, f)| f.required)
        .map(|(fid, _)| *fid)
        .collect();
    let wire_decode = WireDecodeConstructor {
        with_context,
        required: wire_required.clone(),
        optional: optional.clone(),
    };

    let copy = analyzer.needs_copy_constructor(id).then(|| CopyConstructor {
        null_source_allowed: wire_required.is_empty(),
        required: wire_required,
        optional: optional.clone(),
        exposes_clone: analyzer.use_copy_constructor(id),
    });

    let assignments = all.iter().map(|fid| planner.assignment(*fid)).collect();

    trace!(
        message = %schema.qualified_name(id),
        builder = matches!(shape, ConstructorShape::Builder(_)),
        with_context,
        copy = copy.is_some(),
        "planned constructors"
    );

    ConstructorPlan {
        message: id,
        shape,
        required,
        defaulted,
        full: (!optional.is_empty()).then_some(all),
        mutators,
        assignments,
        instantiable: !message.is_abstract && !message.external,
        wire_decode,
        copy,
    }
}
