//! Code generation
//!
//! Every registered block owns a [`GeneratorFn`]. Given a live block and a
//! [`CodeHost`], it reads the block's field values, asks the host to resolve
//! child slots, runs the author's implementation and returns an [`Emission`].
//! [`Generator`] is the crate's own host: it dispatches blocks to their
//! registered generators and handles indentation and parenthesization.

pub mod generator;
pub mod resolver;

pub use generator::{Generator, GeneratorConfig};
pub use resolver::{BlockImpl, Fields};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::content::ValueType;
use crate::host::BlockInstance;

/// Operator precedence of an emitted expression
///
/// Lower values bind tighter. [`Order::ATOMIC`] never needs parentheses;
/// [`Order::NONE`] is the weakest binding and the default used when no order
/// is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Order(pub u8);

impl Order {
    pub const ATOMIC: Order = Order(0);
    pub const NONE: Order = Order(99);

    /// Whether an expression of precedence `inner` must be wrapped in
    /// parentheses when placed in a context of precedence `outer`
    pub fn needs_parens(outer: Order, inner: Order) -> bool {
        if outer > inner {
            return false;
        }
        !(outer == inner && (outer == Order::ATOMIC || outer == Order::NONE))
    }
}

impl Default for Order {
    fn default() -> Self {
        Order::NONE
    }
}

impl From<u8> for Order {
    fn from(order: u8) -> Self {
        Order(order)
    }
}

/// Code emitted by one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    /// Statement code, already chained with the blocks below it
    Statement(String),
    /// Expression code with its precedence
    Expression { value: String, order: Order },
}

impl Emission {
    pub fn code(&self) -> &str {
        match self {
            Emission::Statement(code) => code,
            Emission::Expression { value, .. } => value,
        }
    }

    pub fn into_code(self) -> String {
        match self {
            Emission::Statement(code) => code,
            Emission::Expression { value, .. } => value,
        }
    }

    pub fn order(&self) -> Option<Order> {
        match self {
            Emission::Statement(_) => None,
            Emission::Expression { order, .. } => Some(*order),
        }
    }
}

/// What an expression block's implementation returns
///
/// A plain string is emitted at [`Order::NONE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprCode {
    pub value: String,
    pub order: Option<Order>,
}

impl ExprCode {
    pub fn new(value: impl Into<String>, order: impl Into<Order>) -> Self {
        Self {
            value: value.into(),
            order: Some(order.into()),
        }
    }

    pub fn plain(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            order: None,
        }
    }
}

impl From<String> for ExprCode {
    fn from(value: String) -> Self {
        ExprCode::plain(value)
    }
}

impl From<&str> for ExprCode {
    fn from(value: &str) -> Self {
        ExprCode::plain(value)
    }
}

impl<S: Into<String>> From<(S, Order)> for ExprCode {
    fn from((value, order): (S, Order)) -> Self {
        ExprCode::new(value, order)
    }
}

/// Errors raised while generating code for a block
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// The implementation asked for a widget key that was never declared
    #[error("Failed to find input by key: {key}")]
    UnknownField { key: String },

    /// The implementation asked to resolve a key that is not a declared slot
    #[error("Failed to resolve slot: {key}")]
    UnresolvableSlot { key: String },

    /// A typed accessor was used on a widget of another type
    #[error("Field `{key}` holds a {declared} value, not a {requested} value")]
    FieldType {
        key: String,
        declared: ValueType,
        requested: ValueType,
    },

    /// A number widget holds text that does not parse as a number
    #[error("Field `{key}` holds `{value}`, which is not a number")]
    NotANumber { key: String, value: String },

    /// The live block has no value for a declared widget
    #[error("Block `{block}` ({id}) has no value for field `{key}`")]
    MissingFieldValue { block: String, id: String, key: String },

    /// No generator is registered under the block's type
    #[error("No generator registered for block type `{block}` ({id})")]
    UnregisteredBlock { block: String, id: String },

    /// A block plugged into a value slot emitted statement code
    #[error("Block `{block}` ({id}) is plugged into a value slot but does not produce an expression")]
    NotAnExpression { block: String, id: String },

    /// A block in a statement position emitted an expression
    #[error("Block `{block}` ({id}) is in a statement position but produces an expression")]
    NotAStatement { block: String, id: String },

    /// Failure raised by an implementation itself
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The host's code emitter, as seen by a block's generator
pub trait CodeHost {
    /// Generate code for `block` through its registered generator
    fn block_to_code(&self, block: &dyn BlockInstance) -> Result<Emission, CodegenError>;

    /// Code of the statement chain attached to the statement input `key`
    fn statement_to_code(&self, block: &dyn BlockInstance, key: &str) -> Result<String, CodegenError>;

    /// Code of the expression attached to the value input `key`, placed in a
    /// context of precedence `order`
    fn value_to_code(
        &self,
        block: &dyn BlockInstance,
        key: &str,
        order: Order,
    ) -> Result<String, CodegenError>;
}

/// Generator installed for one block type
pub type GeneratorFn =
    Arc<dyn Fn(&dyn BlockInstance, &dyn CodeHost) -> Result<Emission, CodegenError> + Send + Sync>;
