//! Bundled registration plugins
//!
//! Both plugins read their inputs from the definition's metadata bag under
//! the keys they export, and neither touches code generation.

pub mod toolbox;
pub mod validation;

pub use toolbox::{Shadow, ShadowConfig, ToolboxConfig, ToolboxDefinition, ToolboxItem, ToolboxPlugin};
pub use validation::{validator, ValidationPlugin, ValidationScope, Validator};
