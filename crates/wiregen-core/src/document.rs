//! Schema document: the serde interchange format a schema parser hands to the compiler.
//!
//! Documents are loaded from TOML or JSON. Names are still unresolved strings
//! here; [`crate::resolve`] turns a document into a linked [`crate::Schema`].
//!
//! ```toml
//! namespace = "org.example.shapes"
//!
//! [[messages]]
//! name = "Point"
//!
//! [[messages.fields]]
//! name = "x"
//! type = "int"
//! ordinal = 1
//! required = true
//! ```

use crate::error::{SchemaError, SchemaResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// File name used in error positions
    #[serde(default)]
    pub source: Option<String>,

    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub messages: Vec<MessageDocument>,

    #[serde(default)]
    pub enums: Vec<EnumDocument>,

    #[serde(default)]
    pub types: Vec<TypeDocument>,

    #[serde(default)]
    pub taxonomies: Vec<TaxonomyDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageDocument {
    pub name: String,

    #[serde(default)]
    pub extends: Option<String>,

    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,

    #[serde(default)]
    pub external: bool,

    /// Compile this message in this run (default: true)
    #[serde(default = "default_true")]
    pub target: bool,

    #[serde(default)]
    pub fields: Vec<FieldDocument>,

    #[serde(default)]
    pub messages: Vec<MessageDocument>,

    #[serde(default)]
    pub enums: Vec<EnumDocument>,

    #[serde(default)]
    pub bindings: BTreeMap<String, String>,

    #[serde(default)]
    pub line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDocument {
    pub name: String,

    /// Type expression, e.g. `int`, `string[]`, `Point[3][]`
    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default)]
    pub ordinal: Option<i16>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub mutable: bool,

    #[serde(default)]
    pub repeated: bool,

    #[serde(default)]
    pub default: Option<serde_json::Value>,

    /// Replaces the same-named field of the closest ancestor declaring it
    #[serde(default, rename = "override")]
    pub overrides: bool,

    #[serde(default)]
    pub line: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumEncodingDocument {
    #[default]
    Symbolic,
    Integer,
    String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumDocument {
    pub name: String,

    #[serde(default)]
    pub encoding: EnumEncodingDocument,

    pub values: Vec<EnumValueDocument>,

    #[serde(default = "default_true")]
    pub target: bool,

    #[serde(default)]
    pub bindings: BTreeMap<String, String>,

    #[serde(default)]
    pub line: u32,
}

/// An enum member: a bare label, or a label with an explicit code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumValueDocument {
    Label(String),
    Coded {
        label: String,
        value: serde_json::Value,
    },
}

impl EnumValueDocument {
    pub fn label(&self) -> &str {
        match self {
            EnumValueDocument::Label(label) | EnumValueDocument::Coded { label, .. } => label,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDocument {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: String,

    #[serde(default)]
    pub external: bool,

    #[serde(default)]
    pub line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaxonomyDocument {
    pub name: String,

    /// Field name to ordinal
    pub entries: BTreeMap<String, i16>,

    #[serde(default = "default_true")]
    pub target: bool,

    #[serde(default)]
    pub line: u32,
}

fn default_true() -> bool {
    true
}

impl SchemaDocument {
    /// Parse a document from TOML text
    pub fn from_toml_str(content: &str) -> SchemaResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Parse a document from JSON text
    pub fn from_json_str(content: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a document, picking the format from the file extension
    ///
    /// `.json` files are read as JSON, anything else as TOML. The file name
    /// becomes the document's `source` unless the document sets one.
    pub fn from_path(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Document(format!("failed to read {path:?}: {e}")))?;

        let mut document = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            _ => Self::from_toml_str(&content)?,
        };

        if document.source.is_none() {
            document.source = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
        }
        Ok(document)
    }

    pub fn source_name(&self) -> &str {
        self.source.as_deref().unwrap_or("<schema>")
    }
}

/// A parsed type expression: a base name and its array dimensions.
///
/// Dimensions are listed outermost first, so `int[3][]` is a fixed array of
/// three variable-length `int` arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    pub base: String,
    pub dimensions: Vec<Option<usize>>,
}

impl TypeExpr {
    pub fn parse(expr: &str) -> Result<Self, String> {
        let expr = expr.trim();
        let (base, mut rest) = match expr.find('[') {
            Some(at) => (expr[..at].trim(), &expr[at..]),
            None => (expr, ""),
        };

        if base.is_empty() {
            return Err("missing base type".to_string());
        }
        let valid_base = base
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_'));
        if !valid_base {
            return Err(format!("'{base}' is not a type name"));
        }

        let mut dimensions = Vec::new();
        while !rest.is_empty() {
            let Some(inner) = rest.strip_prefix('[') else {
                return Err(format!("unexpected '{rest}'"));
            };
            let Some(close) = inner.find(']') else {
                return Err("unclosed '['".to_string());
            };
            let length = inner[..close].trim();
            if length.is_empty() {
                dimensions.push(None);
            } else {
                let n: usize = length
                    .parse()
                    .map_err(|_| format!("'{length}' is not an array length"))?;
                if n == 0 {
                    return Err("array length must be positive".to_string());
                }
                dimensions.push(Some(n));
            }
            rest = inner[close + 1..].trim_start();
        }

        Ok(Self {
            base: base.to_string(),
            dimensions,
        })
    }
}
