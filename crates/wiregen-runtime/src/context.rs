//! Decode context: converters for external messages and types.
//!
//! Messages whose plan uses the context form must be encoded and decoded
//! with a [`DecodeContext`]; the context resolves an external type token to
//! the converter that owns its wire representation.

use crate::value::{ExternalValue, Value};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use wiregen_transport::WireValue;

/// Converts between an opaque runtime value and its wire form.
pub trait ExternalConverter: Send + Sync {
    fn to_wire(&self, value: &Value) -> Result<WireValue, String>;

    fn from_wire(&self, value: &WireValue) -> Result<Value, String>;
}

/// Stores the wire value as-is inside an [`ExternalValue`].
#[derive(Debug, Clone)]
pub struct PassThroughConverter {
    token: String,
}

impl PassThroughConverter {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl ExternalConverter for PassThroughConverter {
    fn to_wire(&self, value: &Value) -> Result<WireValue, String> {
        match value {
            Value::External(external) => Ok(external.payload.clone()),
            other => Err(format!("expected an external value, got {}", other.kind())),
        }
    }

    fn from_wire(&self, value: &WireValue) -> Result<Value, String> {
        Ok(Value::External(ExternalValue::new(&self.token, value.clone())))
    }
}

/// Converters keyed by type token; shareable across threads.
#[derive(Default)]
pub struct DecodeContext {
    converters: RwLock<HashMap<String, Arc<dyn ExternalConverter>>>,
}

impl DecodeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter, replacing any previous one for the token.
    pub fn register(&self, token: impl Into<String>, converter: Arc<dyn ExternalConverter>) {
        let token = token.into();
        debug!(token = %token, "registered external converter");
        self.converters.write().insert(token, converter);
    }

    /// Builder-style registration.
    pub fn with_converter(
        self,
        token: impl Into<String>,
        converter: impl ExternalConverter + 'static,
    ) -> Self {
        self.register(token, Arc::new(converter));
        self
    }

    pub fn converter(&self, token: &str) -> Option<Arc<dyn ExternalConverter>> {
        self.converters.read().get(token).cloned()
    }

    pub fn len(&self) -> usize {
        self.converters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.read().is_empty()
    }
}

impl std::fmt::Debug for DecodeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tokens: Vec<String> = self.converters.read().keys().cloned().collect();
        tokens.sort();
        f.debug_struct("DecodeContext")
            .field("converters", &tokens)
            .finish()
    }
}

#[cfg(test)]
#[path = "context/context_tests.rs"]
mod context_tests;
