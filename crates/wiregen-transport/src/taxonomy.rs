//! Taxonomy compression of field names
//!
//! A taxonomy maps small ordinals to field names. Compressing a message
//! replaces names the taxonomy knows with their ordinals; expanding restores
//! the names while keeping the ordinals, so both lookups keep working.

use std::collections::{BTreeMap, HashMap};
use wiregen_core::TaxonomyDefinition;

use crate::wire::{WireField, WireMessage, WireValue};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Taxonomy {
    names: BTreeMap<i16, String>,
    ordinals: HashMap<String, i16>,
}

impl Taxonomy {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (i16, S)>,
        S: Into<String>,
    {
        let mut taxonomy = Self::default();
        for (ordinal, name) in entries {
            let name = name.into();
            taxonomy.ordinals.insert(name.clone(), ordinal);
            taxonomy.names.insert(ordinal, name);
        }
        taxonomy
    }

    pub fn from_definition(definition: &TaxonomyDefinition) -> Self {
        Self::new(
            definition
                .entries
                .iter()
                .map(|e| (e.ordinal, e.name.clone())),
        )
    }

    pub fn ordinal_of(&self, name: &str) -> Option<i16> {
        self.ordinals.get(name).copied()
    }

    pub fn name_of(&self, ordinal: i16) -> Option<&str> {
        self.names.get(&ordinal).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Replace known names with ordinals, recursing into sub-messages
    pub fn compress(&self, message: &WireMessage) -> WireMessage {
        let fields = message
            .iter()
            .map(|field| {
                let known = match (&field.name, field.ordinal) {
                    (Some(name), None) => self.ordinal_of(name),
                    _ => None,
                };
                WireField {
                    name: if known.is_some() {
                        None
                    } else {
                        field.name.clone()
                    },
                    ordinal: known.or(field.ordinal),
                    value: self.map_value(&field.value, Self::compress),
                }
            })
            .collect();
        WireMessage { fields }
    }

    /// Fill in names for ordinals the taxonomy knows, recursing into sub-messages
    pub fn expand(&self, message: &WireMessage) -> WireMessage {
        let fields = message
            .iter()
            .map(|field| {
                let name = match (&field.name, field.ordinal) {
                    (None, Some(ordinal)) => self.name_of(ordinal).map(str::to_string),
                    (name, _) => name.clone(),
                };
                WireField {
                    name,
                    ordinal: field.ordinal,
                    value: self.map_value(&field.value, Self::expand),
                }
            })
            .collect();
        WireMessage { fields }
    }

    fn map_value(&self, value: &WireValue, f: fn(&Self, &WireMessage) -> WireMessage) -> WireValue {
        match value {
            WireValue::Message(inner) => WireValue::Message(f(self, inner)),
            other => other.clone(),
        }
    }
}
