//! In-memory host
//!
//! [`BlockNode`] is a plain tree of block instances and [`RenderedShape`]
//! records what a shape asked the host to draw. Both are enough to run the
//! whole registration and code generation pipeline without an editor.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use super::{BlockInstance, BlockSurface, FieldWidget, InputRow, LiveBlock};
use crate::core::field::FieldValue;
use crate::core::types::Colour;

/// Unique identifier for a block instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub Uuid);

impl BlockId {
    /// Generate a new random block ID
    pub fn new() -> Self {
        BlockId(Uuid::new_v4())
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A block instance with its attached children
#[derive(Debug, Clone)]
pub struct BlockNode {
    id: BlockId,
    block_type: String,
    fields: HashMap<String, FieldValue>,
    inputs: HashMap<String, BlockNode>,
    next: Option<Box<BlockNode>>,
    attached: bool,
    dragging: bool,
    warning: Option<String>,
}

impl BlockNode {
    /// Create an attached block of the given registered type
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            id: BlockId::new(),
            block_type: block_type.into(),
            fields: HashMap::new(),
            inputs: HashMap::new(),
            next: None,
            attached: true,
            dragging: false,
            warning: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Attach `child` to the value or statement input `key`
    pub fn with_input(mut self, key: impl Into<String>, child: BlockNode) -> Self {
        self.inputs.insert(key.into(), child);
        self
    }

    /// Attach `next` below this block
    pub fn with_next(mut self, next: BlockNode) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    /// Build a statement chain from the given blocks, top to bottom
    pub fn chain(blocks: impl IntoIterator<Item = BlockNode>) -> Option<BlockNode> {
        let mut blocks: Vec<_> = blocks.into_iter().collect();
        let mut head = blocks.pop()?;
        while let Some(block) = blocks.pop() {
            head = block.with_next(head);
        }
        Some(head)
    }

    /// Remove the block from the workspace
    pub fn detached(mut self) -> Self {
        self.attached = false;
        self
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    pub fn block_id(&self) -> BlockId {
        self.id
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }
}

impl BlockInstance for BlockNode {
    fn block_type(&self) -> &str {
        &self.block_type
    }

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn field_value(&self, key: &str) -> Option<FieldValue> {
        self.fields.get(key).cloned()
    }

    fn next_block(&self) -> Option<&dyn BlockInstance> {
        self.next.as_deref().map(|next| next as &dyn BlockInstance)
    }

    fn input_target(&self, key: &str) -> Option<&dyn BlockInstance> {
        self.inputs.get(key).map(|child| child as &dyn BlockInstance)
    }
}

impl LiveBlock for BlockNode {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn is_dragging(&self) -> bool {
        self.dragging
    }

    fn set_warning_text(&mut self, text: Option<String>) {
        self.warning = text;
    }

    fn as_instance(&self) -> &dyn BlockInstance {
        self
    }
}

/// Kind of a rendered input row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Dummy,
    Value,
    Statement,
}

/// One rendered input row
#[derive(Debug, Clone)]
pub struct RenderedInput {
    pub kind: InputKind,
    pub name: Option<String>,
    pub check: Option<String>,
    pub widgets: Vec<(Option<String>, FieldWidget)>,
}

impl RenderedInput {
    /// Keys of the keyed widgets on this row, left to right
    pub fn widget_keys(&self) -> Vec<&str> {
        self.widgets.iter().filter_map(|(key, _)| key.as_deref()).collect()
    }
}

impl InputRow for RenderedInput {
    fn append_field(&mut self, widget: FieldWidget, key: Option<&str>) {
        self.widgets.push((key.map(str::to_string), widget));
    }
}

/// Records every call a shape makes while initializing a block
///
/// Connections are `None` when absent, `Some(None)` when present without a
/// type check, and `Some(Some(check))` otherwise.
#[derive(Debug, Clone, Default)]
pub struct RenderedShape {
    pub colour: Option<Colour>,
    pub tooltip: Option<String>,
    pub help_url: Option<String>,
    pub previous: Option<Option<String>>,
    pub next: Option<Option<String>>,
    pub output: Option<Option<String>>,
    pub inline: Option<bool>,
    pub inputs: Vec<RenderedInput>,
}

impl RenderedShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find an input row by name
    pub fn input(&self, name: &str) -> Option<&RenderedInput> {
        self.inputs.iter().find(|input| input.name.as_deref() == Some(name))
    }

    fn push_input(&mut self, kind: InputKind, name: Option<&str>, check: Option<&str>) -> &mut RenderedInput {
        let index = self.inputs.len();
        self.inputs.push(RenderedInput {
            kind,
            name: name.map(str::to_string),
            check: check.map(str::to_string),
            widgets: Vec::new(),
        });
        &mut self.inputs[index]
    }
}

impl BlockSurface for RenderedShape {
    fn set_colour(&mut self, colour: &Colour) {
        self.colour = Some(colour.clone());
    }

    fn set_tooltip(&mut self, tooltip: &str) {
        self.tooltip = Some(tooltip.to_string());
    }

    fn set_help_url(&mut self, url: &str) {
        self.help_url = Some(url.to_string());
    }

    fn set_previous_statement(&mut self, check: Option<&str>) {
        self.previous = Some(check.map(str::to_string));
    }

    fn set_next_statement(&mut self, check: Option<&str>) {
        self.next = Some(check.map(str::to_string));
    }

    fn set_output(&mut self, check: Option<&str>) {
        self.output = Some(check.map(str::to_string));
    }

    fn set_inputs_inline(&mut self, inline: bool) {
        self.inline = Some(inline);
    }

    fn append_dummy_input(&mut self) -> &mut dyn InputRow {
        self.push_input(InputKind::Dummy, None, None)
    }

    fn append_value_input(&mut self, name: &str, check: Option<&str>) -> &mut dyn InputRow {
        self.push_input(InputKind::Value, Some(name), check)
    }

    fn append_statement_input(&mut self, name: &str, check: Option<&str>) -> &mut dyn InputRow {
        self.push_input(InputKind::Statement, Some(name), check)
    }
}
