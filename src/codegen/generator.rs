//! Host-side code emitter
//!
//! [`Generator`] looks blocks up in a [`HostRegistry`] by type and runs their
//! generators. It owns the two pieces of policy a block's generator leaves to
//! the host: indenting statement bodies and parenthesizing sub-expressions.

use super::{CodeHost, CodegenError, Emission, Order};
use crate::core::registry::HostRegistry;
use crate::host::BlockInstance;

/// Code emitter configuration
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Prefix applied to every line of a statement slot's code
    pub indent: String,
    /// Separator between the code of top-level blocks
    pub block_separator: String,
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the statement indent
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Set the separator placed between top-level blocks
    pub fn with_block_separator(mut self, separator: impl Into<String>) -> Self {
        self.block_separator = separator.into();
        self
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            block_separator: "\n".to_string(),
        }
    }
}

/// Emits code for block trees using the generators in a registry
#[derive(Clone)]
pub struct Generator {
    registry: HostRegistry,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(registry: HostRegistry) -> Self {
        Self::with_config(registry, GeneratorConfig::default())
    }

    pub fn with_config(registry: HostRegistry, config: GeneratorConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Code for one top-level block and everything attached to it
    pub fn generate(&self, block: &dyn BlockInstance) -> Result<String, CodegenError> {
        Ok(self.block_to_code(block)?.into_code())
    }

    /// Code for several top-level blocks; empty results are skipped
    pub fn workspace_to_code(&self, blocks: &[&dyn BlockInstance]) -> Result<String, CodegenError> {
        let mut parts = Vec::with_capacity(blocks.len());
        for block in blocks {
            let code = self.generate(*block)?;
            if !code.is_empty() {
                parts.push(code);
            }
        }
        Ok(parts.join(&self.config.block_separator))
    }
}

impl CodeHost for Generator {
    fn block_to_code(&self, block: &dyn BlockInstance) -> Result<Emission, CodegenError> {
        let generator = self
            .registry
            .generator(block.block_type())
            .ok_or_else(|| CodegenError::UnregisteredBlock {
                block: block.block_type().to_string(),
                id: block.id(),
            })?;
        generator(block, self)
    }

    fn statement_to_code(&self, block: &dyn BlockInstance, key: &str) -> Result<String, CodegenError> {
        let Some(child) = block.input_target(key) else {
            return Ok(String::new());
        };
        match self.block_to_code(child)? {
            Emission::Statement(code) if code.is_empty() => Ok(code),
            Emission::Statement(code) => Ok(prefix_lines(&code, &self.config.indent)),
            Emission::Expression { .. } => Err(CodegenError::NotAStatement {
                block: child.block_type().to_string(),
                id: child.id(),
            }),
        }
    }

    fn value_to_code(&self, block: &dyn BlockInstance, key: &str, order: Order) -> Result<String, CodegenError> {
        let Some(child) = block.input_target(key) else {
            return Ok(String::new());
        };
        match self.block_to_code(child)? {
            Emission::Expression { value, .. } if value.is_empty() => Ok(value),
            Emission::Expression { value, order: inner } => {
                if Order::needs_parens(order, inner) {
                    Ok(format!("({value})"))
                } else {
                    Ok(value)
                }
            }
            Emission::Statement(_) => Err(CodegenError::NotAnExpression {
                block: child.block_type().to_string(),
                id: child.id(),
            }),
        }
    }
}

/// Prefix every line of `text` with `prefix`, leaving a trailing newline bare
pub fn prefix_lines(text: &str, prefix: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let last = lines.len() - 1;
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == last && line.is_empty() && last > 0 {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
