//! Registration hooks
//!
//! Plugins are handed to a [`BlockFactory`](super::factory::BlockFactory) in
//! order. For every block that passes validation, each plugin's
//! `will_register` runs (in list order) before the block reaches the host
//! registry and each plugin's `did_register` runs (in list order) after it.

use super::block::BlockDefinition;

/// A registration hook pair
pub trait BlockPlugin: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Runs before the block is installed; may adjust colour, tooltip,
    /// metadata and change handlers
    fn will_register(&self, _definition: &mut BlockDefinition) {}

    /// Runs after the block is installed
    fn did_register(&self, _definition: &BlockDefinition) {}
}
