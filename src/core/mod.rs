//! Core block-definition types
//!
//! This module holds everything needed to describe a block and register it:
//! type indicators, content and field declarations, the fluent builder, the
//! factory that finalizes definitions and the registry it installs them in.

pub mod block;
pub mod content;
pub mod factory;
pub mod field;
pub mod meta;
pub mod plugin;
pub mod registry;
pub mod shape;
pub mod types;

pub use block::{BlockBuilder, BlockDefinition, BlockKind, BuildError, Expression, SlotDef, Statement};
pub use content::{Content, ContentAssembler, DropdownOptions, ValueType};
pub use factory::{BlockFactory, FactoryConfig};
pub use field::{Field, FieldValue};
pub use meta::{MetaBag, MetaKey};
pub use plugin::BlockPlugin;
pub use registry::{HostRegistry, RegisteredBlock, RegistryError};
pub use shape::BlockShape;
pub use types::{BuiltinType, Colour, TypeIndicator};
