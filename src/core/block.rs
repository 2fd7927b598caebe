//! Block definitions and the fluent builder
//!
//! A [`BlockBuilder`] is obtained from a [`BlockFactory`] per block name and
//! accumulates a [`BlockDefinition`] through chained calls. It is consumed by
//! [`BlockBuilder::implement`], which hands the definition and the code
//! implementation to the factory for registration.
//!
//! The builder's kind parameter tracks whether the block is a statement or an
//! expression. Only statement builders can set previous/next typing, and
//! [`BlockBuilder::outputs`] turns a statement builder into an expression
//! builder for good.

use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

use super::content::{Content, ContentAssembler};
use super::factory::{BlockFactory, FactoryConfig};
use super::field::{find_duplicate_key, Field};
use super::meta::{MetaBag, MetaKey};
use super::types::{Colour, TypeIndicator};
use crate::codegen::resolver::{self, BlockImpl};
use crate::codegen::{CodeHost, CodegenError, Emission, ExprCode};
use crate::host::{BlockInstance, ChangeHandler};

/// Everything known about a block before it is registered
///
/// Plugins see the definition in their hooks. Structural parts (fields,
/// connection typing) are read-only there; colour, tooltip, metadata and
/// change handlers may be changed in `will_register`.
#[derive(Clone)]
pub struct BlockDefinition {
    name: String,
    previous: Option<TypeIndicator>,
    next: Option<TypeIndicator>,
    output: Option<TypeIndicator>,
    colour: Colour,
    tooltip: String,
    help_url: String,
    inline: Option<bool>,
    fields: Vec<Field>,
    meta: MetaBag,
    change_handlers: Vec<ChangeHandler>,
}

impl BlockDefinition {
    pub(crate) fn new(name: impl Into<String>, config: &FactoryConfig) -> Self {
        Self {
            name: name.into(),
            previous: Some(TypeIndicator::Any),
            next: Some(TypeIndicator::Any),
            output: None,
            colour: config.default_colour.clone(),
            tooltip: config.default_tooltip.clone(),
            help_url: config.default_help_url.clone(),
            inline: None,
            fields: Vec::new(),
            meta: MetaBag::new(),
            change_handlers: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type accepted by the previous connection; `None` if there is none
    pub fn previous(&self) -> Option<&TypeIndicator> {
        self.previous.as_ref()
    }

    /// Type accepted by the next connection; `None` if there is none
    pub fn next(&self) -> Option<&TypeIndicator> {
        self.next.as_ref()
    }

    /// Output type; present only on expression blocks
    pub fn output(&self) -> Option<&TypeIndicator> {
        self.output.as_ref()
    }

    pub fn is_expression(&self) -> bool {
        self.output.is_some()
    }

    pub fn colour(&self) -> &Colour {
        &self.colour
    }

    pub fn set_colour(&mut self, colour: impl Into<Colour>) {
        self.colour = colour.into();
    }

    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    pub fn set_tooltip(&mut self, tooltip: impl Into<String>) {
        self.tooltip = tooltip.into();
    }

    pub fn help_url(&self) -> &str {
        &self.help_url
    }

    /// Forced input layout; `None` leaves it to the host
    pub fn inline(&self) -> Option<bool> {
        self.inline
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn meta(&self) -> &MetaBag {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut MetaBag {
        &mut self.meta
    }

    pub fn change_handlers(&self) -> &[ChangeHandler] {
        &self.change_handlers
    }

    /// Append a change handler; handlers run in the order they were added
    pub fn add_change_handler(&mut self, handler: ChangeHandler) {
        self.change_handlers.push(handler);
    }

    /// Check the definition against the factory's declared custom types
    pub(crate) fn validate(&self, custom_types: &HashSet<String>) -> Result<(), BuildError> {
        if self.name.trim().is_empty() {
            return Err(BuildError::EmptyName);
        }

        let declared = |ty: &TypeIndicator| match ty.custom_name() {
            Some(name) if !custom_types.contains(name) => Err(BuildError::UndeclaredType {
                block: self.name.clone(),
                ty: name.to_string(),
            }),
            _ => Ok(()),
        };
        let invalid = |ty: &TypeIndicator, position: &'static str| BuildError::InvalidIndicator {
            block: self.name.clone(),
            indicator: ty.name().to_string(),
            position,
        };

        for ty in self.previous.iter().chain(self.next.iter()) {
            declared(ty)?;
        }

        if let Some(output) = &self.output {
            if matches!(output, TypeIndicator::Any | TypeIndicator::Never) {
                return Err(invalid(output, "an output type"));
            }
            declared(output)?;
        }

        for field in &self.fields {
            if let Field::Value { check, .. } | Field::Statement { check, .. } = field {
                if *check == TypeIndicator::Never {
                    return Err(invalid(check, "a slot check"));
                }
                declared(check)?;
            }
            for item in field.content() {
                if let Content::Variable { types, .. } = item {
                    for ty in types {
                        if matches!(ty, TypeIndicator::Any | TypeIndicator::Never) {
                            return Err(invalid(ty, "a variable type"));
                        }
                        declared(ty)?;
                    }
                }
            }
        }

        if let Some(key) = find_duplicate_key(&self.fields) {
            return Err(BuildError::DuplicateKey {
                block: self.name.clone(),
                key: key.to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Debug for BlockDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockDefinition")
            .field("name", &self.name)
            .field("previous", &self.previous)
            .field("next", &self.next)
            .field("output", &self.output)
            .field("colour", &self.colour)
            .field("inline", &self.inline)
            .field("fields", &self.fields)
            .field("meta", &self.meta)
            .field("change_handlers", &self.change_handlers.len())
            .finish()
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Statement {}
    impl Sealed for super::Expression {}
}

/// Whether a builder produces a statement or an expression block
pub trait BlockKind: sealed::Sealed + 'static {
    /// What the block's implementation returns
    type Return;

    #[doc(hidden)]
    fn emit(output: Self::Return, block: &dyn BlockInstance, host: &dyn CodeHost) -> Result<Emission, CodegenError>;
}

/// Statement block: stacks with previous/next, emits a line of code
#[derive(Debug, Clone, Copy)]
pub struct Statement;

/// Expression block: plugs into value slots, emits a value with a precedence
#[derive(Debug, Clone, Copy)]
pub struct Expression;

impl BlockKind for Statement {
    type Return = String;

    fn emit(output: String, block: &dyn BlockInstance, host: &dyn CodeHost) -> Result<Emission, CodegenError> {
        resolver::chain_statement(output, block, host)
    }
}

impl BlockKind for Expression {
    type Return = ExprCode;

    fn emit(output: ExprCode, _block: &dyn BlockInstance, _host: &dyn CodeHost) -> Result<Emission, CodegenError> {
        Ok(resolver::expression(output))
    }
}

/// Declaration of a value slot
#[derive(Debug, Clone)]
pub struct SlotDef {
    allow: TypeIndicator,
    content: ContentAssembler,
}

impl SlotDef {
    /// Slot accepting expressions of type `allow` (`*` for any)
    pub fn allow(allow: impl Into<TypeIndicator>) -> Self {
        Self {
            allow: allow.into(),
            content: ContentAssembler::new(),
        }
    }

    /// Slot accepting any expression
    pub fn any() -> Self {
        Self::allow(TypeIndicator::Any)
    }

    /// Content rendered on the slot's own row
    pub fn content<F>(mut self, build: F) -> Self
    where
        F: FnOnce(ContentAssembler) -> ContentAssembler,
    {
        self.content = build(self.content);
        self
    }
}

/// Fluent builder for one block definition
///
/// ```
/// use block_builder::prelude::*;
///
/// let factory = BlockFactory::new(HostRegistry::new(), FactoryConfig::default(), vec![]).unwrap();
/// factory
///     .block("repeat")
///     .hue(120)
///     .content(|row| row.text("repeat").number("TIMES", 10.0).text("times"))
///     .stmt("BODY", "*")
///     .implement(|block| {
///         let times = block.fields().number("TIMES")?;
///         let body = block.resolve("BODY")?;
///         Ok(format!("for (let i = 0; i < {times}; i++) {{\n{body}}}"))
///     })
///     .unwrap();
/// assert!(factory.registry().contains("repeat"));
/// ```
pub struct BlockBuilder<K: BlockKind = Statement> {
    factory: BlockFactory,
    definition: BlockDefinition,
    _kind: PhantomData<K>,
}

impl BlockBuilder<Statement> {
    pub(crate) fn new(factory: BlockFactory, name: impl Into<String>) -> Self {
        let definition = BlockDefinition::new(name, factory.config());
        Self {
            factory,
            definition,
            _kind: PhantomData,
        }
    }

    /// Type of the block this one may be stacked below; `none` removes the connection
    pub fn follows(mut self, ty: impl Into<TypeIndicator>) -> Self {
        self.definition.previous = connection(ty.into());
        self
    }

    /// Type of the block that may be stacked below this one; `none` removes the connection
    pub fn precedes(mut self, ty: impl Into<TypeIndicator>) -> Self {
        self.definition.next = connection(ty.into());
        self
    }

    /// Turn the block into an expression of type `ty`, dropping both stack connections
    pub fn outputs(mut self, ty: impl Into<TypeIndicator>) -> BlockBuilder<Expression> {
        self.definition.output = Some(ty.into());
        self.definition.previous = None;
        self.definition.next = None;
        BlockBuilder {
            factory: self.factory,
            definition: self.definition,
            _kind: PhantomData,
        }
    }
}

impl<K: BlockKind> BlockBuilder<K> {
    /// Colour the block by hue
    pub fn hue(mut self, hue: u16) -> Self {
        self.definition.colour = Colour::Hue(hue);
        self
    }

    /// Colour the block by hue or explicit colour string
    pub fn color(mut self, colour: impl Into<Colour>) -> Self {
        self.definition.colour = colour.into();
        self
    }

    /// Render inputs inline
    pub fn inline(mut self) -> Self {
        self.definition.inline = Some(true);
        self
    }

    /// Render inputs stacked
    pub fn external(mut self) -> Self {
        self.definition.inline = Some(false);
        self
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.definition.tooltip = tooltip.into();
        self
    }

    pub fn help_url(mut self, url: impl Into<String>) -> Self {
        self.definition.help_url = url.into();
        self
    }

    /// Set a plugin metadata entry; later calls with the same key overwrite
    pub fn meta<T: std::any::Any + Send + Sync>(mut self, key: MetaKey<T>, value: T) -> Self {
        self.definition.meta.insert(key, value);
        self
    }

    /// Append a content-only row
    pub fn content<F>(mut self, build: F) -> Self
    where
        F: FnOnce(ContentAssembler) -> ContentAssembler,
    {
        let row = build(ContentAssembler::new());
        self.definition.fields.push(Field::Content(row.into_items()));
        self
    }

    /// Append a value slot named `key`
    pub fn slot(mut self, key: impl Into<String>, def: SlotDef) -> Self {
        self.definition.fields.push(Field::Value {
            key: key.into(),
            check: def.allow,
            content: def.content.into_items(),
        });
        self
    }

    /// Append a statement slot named `key`
    pub fn stmt(mut self, key: impl Into<String>, allow: impl Into<TypeIndicator>) -> Self {
        self.definition.fields.push(Field::Statement {
            key: key.into(),
            check: allow.into(),
        });
        self
    }

    /// The definition accumulated so far
    pub fn definition(&self) -> &BlockDefinition {
        &self.definition
    }

    /// Supply the code implementation and register the block
    ///
    /// The implementation runs once here against the declared defaults, with
    /// every slot empty and dynamic dropdowns left blank. Undeclared keys on
    /// that path are rejected; keys reached only through other field values
    /// surface as codegen errors when the block is generated.
    ///
    /// # Errors
    /// Any [`BuildError`]; nothing is registered and no plugin hook runs
    /// when the definition is rejected.
    pub fn implement<F>(self, implementation: F) -> Result<(), BuildError>
    where
        F: Fn(&BlockImpl<'_>) -> Result<K::Return, CodegenError> + Send + Sync + 'static,
    {
        let BlockBuilder { factory, definition, .. } = self;
        factory.register::<K, F>(definition, implementation)
    }
}

fn connection(ty: TypeIndicator) -> Option<TypeIndicator> {
    match ty {
        TypeIndicator::Never => None,
        other => Some(other),
    }
}

/// Errors raised while defining or registering a block
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A custom type reuses a reserved indicator
    #[error("'{0}' is a reserved type indicator and may not be used as a custom type")]
    ReservedType(String),

    /// A definition uses a custom type the factory never declared
    #[error("Block `{block}` uses undeclared type `{ty}`")]
    UndeclaredType { block: String, ty: String },

    /// An indicator used where it has no meaning, such as `*` as an output type
    #[error("Block `{block}` cannot use `{indicator}` as {position}")]
    InvalidIndicator {
        block: String,
        indicator: String,
        position: &'static str,
    },

    /// Two fields or slots share a key
    #[error("Block `{block}` declares key `{key}` more than once")]
    DuplicateKey { block: String, key: String },

    /// The implementation reads a field or resolves a slot that was never declared
    #[error("Implementation of block `{block}` references undeclared key `{key}`")]
    UndeclaredKey { block: String, key: String },

    /// Block name cannot be empty
    #[error("Block name cannot be empty")]
    EmptyName,
}
