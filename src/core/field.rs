//! Fields of a block definition and their key index

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::content::{Content, ValueType};
use super::types::TypeIndicator;

/// One input row of a block
#[derive(Debug, Clone)]
pub enum Field {
    /// Content-only row; contributes no connection
    Content(Vec<Content>),
    /// Value slot accepting a single child expression
    Value {
        key: String,
        check: TypeIndicator,
        content: Vec<Content>,
    },
    /// Statement slot accepting a chain of child statements
    Statement { key: String, check: TypeIndicator },
}

impl Field {
    /// Slot key; `None` for content-only rows
    pub fn slot_key(&self) -> Option<&str> {
        match self {
            Field::Content(_) => None,
            Field::Value { key, .. } | Field::Statement { key, .. } => Some(key),
        }
    }

    /// Content rendered on this row
    pub fn content(&self) -> &[Content] {
        match self {
            Field::Content(content) | Field::Value { content, .. } => content,
            Field::Statement { .. } => &[],
        }
    }

    /// Every key this field introduces, slot key first
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slot_key()
            .into_iter()
            .chain(self.content().iter().filter_map(Content::key))
    }
}

/// A widget value read from a live block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

/// Kind of a declared slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Value,
    Statement,
}

/// Key-indexed lookup table over a frozen field list
///
/// Built once per registered block. When a key is declared more than once the
/// later declaration wins; finalize rejects such definitions, so this only
/// matters for hand-assembled field lists.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    fields: HashMap<String, ValueType>,
    slots: HashMap<String, SlotKind>,
}

impl FieldIndex {
    pub fn build(fields: &[Field]) -> Self {
        let mut index = FieldIndex::default();
        for field in fields {
            match field {
                Field::Value { key, .. } => {
                    index.slots.insert(key.clone(), SlotKind::Value);
                }
                Field::Statement { key, .. } => {
                    index.slots.insert(key.clone(), SlotKind::Statement);
                }
                Field::Content(_) => {}
            }
            for item in field.content() {
                if let (Some(key), Some(ty)) = (item.key(), item.value_type()) {
                    index.fields.insert(key.to_string(), ty);
                }
            }
        }
        index
    }

    /// Declared value type of a widget key
    pub fn field_type(&self, key: &str) -> Option<ValueType> {
        self.fields.get(key).copied()
    }

    /// Declared kind of a slot key
    pub fn slot_kind(&self, key: &str) -> Option<SlotKind> {
        self.slots.get(key).copied()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

/// First key declared twice across all fields, in declaration order
pub fn find_duplicate_key(fields: &[Field]) -> Option<&str> {
    let mut seen = HashSet::new();
    fields
        .iter()
        .flat_map(|field| field.keys())
        .find(|key| !seen.insert(*key))
}
