//! Runtime validation warnings
//!
//! A block that carries a [`Validator`] under [`VALIDATE`] gets a change
//! handler appended to its definition. The handler runs the validator on every
//! change event once the block sits on a workspace and no drag is in
//! progress, then shows the last warning the validator raised or clears the
//! warning if it raised none.

use std::cell::RefCell;
use std::sync::Arc;

use crate::core::block::BlockDefinition;
use crate::core::meta::MetaKey;
use crate::core::plugin::BlockPlugin;
use crate::host::{BlockInstance, ChangeEvent, LiveBlock};

/// Callback checking a live block
pub type Validator = Arc<dyn Fn(&ValidationScope<'_>) + Send + Sync>;

/// Metadata key holding a block's validator
pub const VALIDATE: MetaKey<Validator> = MetaKey::new("validate");

/// Wrap a closure as a [`Validator`]
pub fn validator<F>(check: F) -> Validator
where
    F: Fn(&ValidationScope<'_>) + Send + Sync + 'static,
{
    Arc::new(check)
}

/// What a validator sees during one run
pub struct ValidationScope<'a> {
    block: &'a dyn BlockInstance,
    warning: RefCell<Option<String>>,
}

impl<'a> ValidationScope<'a> {
    fn new(block: &'a dyn BlockInstance) -> Self {
        Self {
            block,
            warning: RefCell::new(None),
        }
    }

    /// Raise a warning; only the last one raised in a run is shown
    pub fn warn(&self, message: impl Into<String>) {
        *self.warning.borrow_mut() = Some(message.into());
    }

    /// The block being validated
    pub fn block(&self) -> &'a dyn BlockInstance {
        self.block
    }

    fn into_warning(self) -> Option<String> {
        self.warning.into_inner()
    }
}

/// Plugin attaching validators as change handlers
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationPlugin;

impl ValidationPlugin {
    pub fn new() -> Self {
        Self
    }

    pub fn register(&self) -> Arc<dyn BlockPlugin> {
        Arc::new(*self)
    }
}

impl BlockPlugin for ValidationPlugin {
    fn name(&self) -> &str {
        "validation"
    }

    fn will_register(&self, definition: &mut BlockDefinition) {
        let Some(check) = definition.meta().get(VALIDATE).cloned() else {
            return;
        };
        let block_type = definition.name().to_string();

        definition.add_change_handler(Arc::new(move |block: &mut dyn LiveBlock, _event: &ChangeEvent| {
            if !block.is_attached() || block.is_dragging() {
                return;
            }

            let warning = {
                let scope = ValidationScope::new(block.as_instance());
                check(&scope);
                scope.into_warning()
            };

            if let Some(message) = &warning {
                tracing::debug!(
                    component = "validation",
                    operation = "on_change",
                    block = %block_type,
                    id = %block.id(),
                    warning = %message,
                    "validator raised a warning"
                );
            }
            block.set_warning_text(warning);
        }));
    }
}
