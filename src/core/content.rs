//! Row content: labels and keyed widgets
//!
//! A row of content is assembled left to right with a [`ContentAssembler`].
//! Labels carry no key; every other widget is stored under a key that the
//! block's implementation later uses to read the widget's value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::types::TypeIndicator;
use crate::host::FieldWidget;

/// Type of the value a keyed widget holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Free text or a dropdown selection
    Text,
    /// Numeric value
    Number,
    /// Reference to a workspace variable (read as text)
    Variable,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Text => f.write_str("text"),
            ValueType::Number => f.write_str("number"),
            ValueType::Variable => f.write_str("variable"),
        }
    }
}

type OptionFactory = Arc<dyn Fn() -> Vec<(String, String)> + Send + Sync>;

/// Options of a dropdown widget as ordered `(label, value)` pairs
#[derive(Clone)]
pub enum DropdownOptions {
    /// Options fixed at definition time
    Static(Vec<(String, String)>),
    /// Options recomputed every time the host asks for them
    Dynamic(OptionFactory),
}

impl DropdownOptions {
    /// Options whose labels equal their values
    pub fn values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DropdownOptions::Static(
            values
                .into_iter()
                .map(|value| {
                    let value = value.into();
                    (value.clone(), value)
                })
                .collect(),
        )
    }

    /// Options from explicit `(label, value)` pairs, kept in order
    pub fn labelled<I, L, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<String>,
        V: Into<String>,
    {
        DropdownOptions::Static(
            pairs
                .into_iter()
                .map(|(label, value)| (label.into(), value.into()))
                .collect(),
        )
    }

    /// Options produced on demand by `factory`
    pub fn dynamic<F, O>(factory: F) -> Self
    where
        F: Fn() -> O + Send + Sync + 'static,
        O: Into<DropdownOptions>,
    {
        DropdownOptions::Dynamic(Arc::new(move || factory().into().entries()))
    }

    /// Current `(label, value)` pairs
    pub fn entries(&self) -> Vec<(String, String)> {
        match self {
            DropdownOptions::Static(entries) => entries.clone(),
            DropdownOptions::Dynamic(factory) => factory(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, DropdownOptions::Dynamic(_))
    }
}

impl fmt::Debug for DropdownOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropdownOptions::Static(entries) => f.debug_tuple("Static").field(entries).finish(),
            DropdownOptions::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl<const N: usize> From<[&str; N]> for DropdownOptions {
    fn from(values: [&str; N]) -> Self {
        DropdownOptions::values(values)
    }
}

impl From<Vec<&str>> for DropdownOptions {
    fn from(values: Vec<&str>) -> Self {
        DropdownOptions::values(values)
    }
}

impl From<Vec<String>> for DropdownOptions {
    fn from(values: Vec<String>) -> Self {
        DropdownOptions::values(values)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for DropdownOptions {
    fn from(pairs: [(&str, &str); N]) -> Self {
        DropdownOptions::labelled(pairs)
    }
}

impl From<Vec<(String, String)>> for DropdownOptions {
    fn from(pairs: Vec<(String, String)>) -> Self {
        DropdownOptions::Static(pairs)
    }
}

/// One item of row content
#[derive(Debug, Clone)]
pub enum Content {
    /// Static label
    Text(String),
    /// Dropdown selection
    Dropdown { key: String, options: DropdownOptions },
    /// Number box with its default
    Number { key: String, value: f64 },
    /// Text box with its default
    Textbox { key: String, value: String },
    /// Variable picker restricted to the given types
    Variable { key: String, types: Vec<TypeIndicator> },
}

impl Content {
    /// Key of a keyed widget; `None` for labels
    pub fn key(&self) -> Option<&str> {
        match self {
            Content::Text(_) => None,
            Content::Dropdown { key, .. }
            | Content::Number { key, .. }
            | Content::Textbox { key, .. }
            | Content::Variable { key, .. } => Some(key),
        }
    }

    /// Value type of a keyed widget; `None` for labels
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Content::Text(_) => None,
            Content::Dropdown { .. } | Content::Textbox { .. } => Some(ValueType::Text),
            Content::Number { .. } => Some(ValueType::Number),
            Content::Variable { .. } => Some(ValueType::Variable),
        }
    }

    /// The native widget the host must construct for this item
    pub fn widget(&self) -> FieldWidget {
        match self {
            Content::Text(value) => FieldWidget::Label(value.clone()),
            Content::Dropdown { options, .. } => FieldWidget::Dropdown(options.clone()),
            Content::Number { value, .. } => FieldWidget::Number(*value),
            Content::Textbox { value, .. } => FieldWidget::TextInput(value.clone()),
            Content::Variable { types, .. } => {
                let types: Vec<String> = types.iter().map(|ty| ty.name().to_string()).collect();
                FieldWidget::Variable {
                    default_type: types.first().cloned(),
                    types,
                }
            }
        }
    }
}

/// Appends content items to one row, in call order
///
/// ```
/// use block_builder::core::content::ContentAssembler;
///
/// let row = ContentAssembler::new()
///     .text("repeat")
///     .number("TIMES", 10.0)
///     .text("times");
/// assert_eq!(row.keys().collect::<Vec<_>>().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContentAssembler {
    items: Vec<Content>,
}

impl ContentAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a static label
    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.items.push(Content::Text(value.into()));
        self
    }

    /// Append a dropdown under `key`
    pub fn dropdown(mut self, key: impl Into<String>, options: impl Into<DropdownOptions>) -> Self {
        self.items.push(Content::Dropdown {
            key: key.into(),
            options: options.into(),
        });
        self
    }

    /// Append a number box under `key`
    pub fn number(mut self, key: impl Into<String>, value: f64) -> Self {
        self.items.push(Content::Number {
            key: key.into(),
            value,
        });
        self
    }

    /// Append a text box under `key`
    pub fn textbox(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.push(Content::Textbox {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Append a variable picker under `key`; the first type is the default
    pub fn variable<I, T>(mut self, key: impl Into<String>, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeIndicator>,
    {
        self.items.push(Content::Variable {
            key: key.into(),
            types: types.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Mount a reusable content view under `key`
    pub fn custom<F>(self, key: impl Into<String>, view: F) -> Self
    where
        F: FnOnce(ContentAssembler, &str) -> ContentAssembler,
    {
        let key = key.into();
        view(self, &key)
    }

    /// Keys introduced so far with their value types, in declaration order
    pub fn keys(&self) -> impl Iterator<Item = (&str, ValueType)> {
        self.items
            .iter()
            .filter_map(|item| Some((item.key()?, item.value_type()?)))
    }

    pub fn items(&self) -> &[Content] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Content> {
        self.items
    }
}
