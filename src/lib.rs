//! Block Builder - declarative block definitions for visual block editors
//!
//! This crate lets an author describe a block once (its connections, colour,
//! widgets and slots) together with the code it generates, and installs both
//! the render shape and the generator in a host registry. Plugins hook into
//! registration; the bundled ones attach validation warnings and assemble a
//! categorized toolbox.

pub mod codegen;
pub mod core;
pub mod host;
pub mod plugins;
mod tests;

// Re-export commonly used types
pub use codegen::{BlockImpl, CodegenError, ExprCode, Generator, GeneratorConfig, Order};
pub use core::{BlockBuilder, BlockFactory, BuildError, FactoryConfig, HostRegistry, SlotDef};

/// Everything needed to define blocks and generate code from them
pub mod prelude {
    pub use crate::codegen::{BlockImpl, CodeHost, CodegenError, Emission, ExprCode, Generator, GeneratorConfig, Order};
    pub use crate::core::{
        BlockBuilder, BlockDefinition, BlockFactory, BlockPlugin, BuildError, Colour, ContentAssembler,
        DropdownOptions, FactoryConfig, HostRegistry, MetaKey, SlotDef, TypeIndicator,
    };
    pub use crate::host::{BlockInstance, ChangeEvent, LiveBlock};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
