//! Frozen block shape
//!
//! A [`BlockShape`] is the immutable snapshot taken from a block definition at
//! finalize. The host calls [`BlockShape::init`] for every new instance of the
//! block and [`BlockShape::on_change`] for every change event it sees.

use std::fmt;

use super::block::BlockDefinition;
use super::content::Content;
use super::field::Field;
use super::types::{Colour, TypeIndicator};
use crate::host::{BlockSurface, ChangeEvent, ChangeHandler, InputRow, LiveBlock};

/// Snapshot of a finalized block definition
#[derive(Clone)]
pub struct BlockShape {
    name: String,
    previous: Option<TypeIndicator>,
    next: Option<TypeIndicator>,
    output: Option<TypeIndicator>,
    colour: Colour,
    tooltip: String,
    help_url: String,
    inline: Option<bool>,
    fields: Vec<Field>,
    change_handlers: Vec<ChangeHandler>,
}

impl BlockShape {
    pub(crate) fn snapshot(definition: &BlockDefinition) -> Self {
        Self {
            name: definition.name().to_string(),
            previous: definition.previous().cloned(),
            next: definition.next().cloned(),
            output: definition.output().cloned(),
            colour: definition.colour().clone(),
            tooltip: definition.tooltip().to_string(),
            help_url: definition.help_url().to_string(),
            inline: definition.inline(),
            fields: definition.fields().to_vec(),
            change_handlers: definition.change_handlers().to_vec(),
        }
    }

    /// Replay the shape onto a new block instance
    pub fn init(&self, surface: &mut dyn BlockSurface) {
        surface.set_colour(&self.colour);
        surface.set_tooltip(&self.tooltip);
        surface.set_help_url(&self.help_url);

        if let Some(next) = &self.next {
            surface.set_next_statement(next.check());
        }
        if let Some(previous) = &self.previous {
            surface.set_previous_statement(previous.check());
        }
        if let Some(output) = &self.output {
            surface.set_output(output.check());
        }
        if let Some(inline) = self.inline {
            surface.set_inputs_inline(inline);
        }

        for field in &self.fields {
            match field {
                Field::Content(content) => render_content(surface.append_dummy_input(), content),
                Field::Value { key, check, content } => {
                    render_content(surface.append_value_input(key, check.check()), content)
                }
                Field::Statement { key, check } => {
                    surface.append_statement_input(key, check.check());
                }
            }
        }
    }

    /// Run every change handler in installation order
    pub fn on_change(&self, block: &mut dyn LiveBlock, event: &ChangeEvent) {
        for handler in &self.change_handlers {
            handler(&mut *block, event);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn previous(&self) -> Option<&TypeIndicator> {
        self.previous.as_ref()
    }

    pub fn next(&self) -> Option<&TypeIndicator> {
        self.next.as_ref()
    }

    pub fn output(&self) -> Option<&TypeIndicator> {
        self.output.as_ref()
    }

    pub fn is_expression(&self) -> bool {
        self.output.is_some()
    }

    pub fn colour(&self) -> &Colour {
        &self.colour
    }

    pub fn inline(&self) -> Option<bool> {
        self.inline
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn change_handler_count(&self) -> usize {
        self.change_handlers.len()
    }
}

fn render_content(row: &mut dyn InputRow, content: &[Content]) {
    for item in content {
        row.append_field(item.widget(), item.key());
    }
}

impl fmt::Debug for BlockShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockShape")
            .field("name", &self.name)
            .field("previous", &self.previous)
            .field("next", &self.next)
            .field("output", &self.output)
            .field("colour", &self.colour)
            .field("inline", &self.inline)
            .field("fields", &self.fields)
            .field("change_handlers", &self.change_handlers.len())
            .finish()
    }
}
