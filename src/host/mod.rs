//! Boundary between the builder and the visual editor that hosts its blocks
//!
//! The editor owns rendering, drag-and-drop and the widgets themselves. The
//! builder only talks to it through these traits:
//! - [`BlockSurface`] / [`InputRow`]: receive a shape while a block initializes
//! - [`BlockInstance`]: read field values and connected children during code generation
//! - [`LiveBlock`]: a block on a workspace that can carry a warning decoration
//!
//! [`memory`] provides an in-memory implementation of all of them.

pub mod memory;

use std::sync::Arc;

use crate::core::content::DropdownOptions;
use crate::core::field::FieldValue;
use crate::core::types::Colour;

/// Native widget requested from the host
#[derive(Debug, Clone)]
pub enum FieldWidget {
    /// Non-editable label
    Label(String),
    /// Dropdown; the host calls [`DropdownOptions::entries`] whenever it opens
    Dropdown(DropdownOptions),
    /// Number input with its default
    Number(f64),
    /// Text input with its default
    TextInput(String),
    /// Variable picker
    Variable {
        types: Vec<String>,
        default_type: Option<String>,
    },
}

/// One input row being rendered
pub trait InputRow {
    /// Append a widget to the right of the row; `key` is `None` for labels
    fn append_field(&mut self, widget: FieldWidget, key: Option<&str>);
}

/// A block being initialized from a registered shape
///
/// A `check` of `None` means the connection exists but accepts any type.
pub trait BlockSurface {
    fn set_colour(&mut self, colour: &Colour);
    fn set_tooltip(&mut self, tooltip: &str);
    fn set_help_url(&mut self, url: &str);
    fn set_previous_statement(&mut self, check: Option<&str>);
    fn set_next_statement(&mut self, check: Option<&str>);
    fn set_output(&mut self, check: Option<&str>);
    fn set_inputs_inline(&mut self, inline: bool);
    fn append_dummy_input(&mut self) -> &mut dyn InputRow;
    fn append_value_input(&mut self, name: &str, check: Option<&str>) -> &mut dyn InputRow;
    fn append_statement_input(&mut self, name: &str, check: Option<&str>) -> &mut dyn InputRow;
}

/// Read-only view of a block instance on a workspace
pub trait BlockInstance {
    /// Registered name of the block's definition
    fn block_type(&self) -> &str;

    /// Identity of this instance, unique on its workspace
    fn id(&self) -> String;

    /// Current value of the widget stored under `key`
    fn field_value(&self, key: &str) -> Option<FieldValue>;

    /// Block attached below this one, if any
    fn next_block(&self) -> Option<&dyn BlockInstance>;

    /// Block attached to the value or statement input `key`, if any
    fn input_target(&self, key: &str) -> Option<&dyn BlockInstance>;
}

/// A block that receives change notifications
pub trait LiveBlock: BlockInstance {
    /// Whether the block sits on a live workspace
    fn is_attached(&self) -> bool;

    /// Whether the workspace is in the middle of a drag
    fn is_dragging(&self) -> bool;

    /// Replace the block's warning decoration; `None` clears it
    fn set_warning_text(&mut self, text: Option<String>);

    fn as_instance(&self) -> &dyn BlockInstance;
}

/// Change notification delivered to a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    Create,
    FieldChanged { key: String },
    Connected,
    Disconnected,
    Moved,
}

/// Handler run for every change event, in installation order
pub type ChangeHandler = Arc<dyn Fn(&mut dyn LiveBlock, &ChangeEvent) + Send + Sync>;
