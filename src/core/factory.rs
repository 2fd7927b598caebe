//! Block factory
//!
//! A [`BlockFactory`] binds a host registry, the declared custom types and an
//! ordered plugin list. Builders it hands out register through it, so every
//! block defined by one factory sees the same types and plugins.

use std::collections::HashSet;
use std::sync::Arc;

use super::block::{BlockBuilder, BlockDefinition, BlockKind, BuildError, Statement};
use super::plugin::BlockPlugin;
use super::registry::{HostRegistry, RegisteredBlock};
use super::shape::BlockShape;
use super::types::{Colour, TypeIndicator};
use crate::codegen::resolver::{self, BlockImpl};
use crate::codegen::CodegenError;

/// Factory configuration
#[derive(Debug, Clone)]
pub struct FactoryConfig {
    /// Names of the custom types blocks may use, in addition to the builtins
    pub custom_types: Vec<String>,
    /// Colour of blocks that never set one
    pub default_colour: Colour,
    pub default_tooltip: String,
    pub default_help_url: String,
}

impl FactoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare one custom type
    pub fn with_custom_type(mut self, name: impl Into<String>) -> Self {
        self.custom_types.push(name.into());
        self
    }

    /// Declare several custom types
    pub fn with_custom_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_types.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_default_colour(mut self, colour: impl Into<Colour>) -> Self {
        self.default_colour = colour.into();
        self
    }

    pub fn with_default_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.default_tooltip = tooltip.into();
        self
    }

    pub fn with_default_help_url(mut self, url: impl Into<String>) -> Self {
        self.default_help_url = url.into();
        self
    }
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            custom_types: Vec::new(),
            default_colour: Colour::default(),
            default_tooltip: String::new(),
            default_help_url: String::new(),
        }
    }
}

struct FactoryInner {
    registry: HostRegistry,
    config: FactoryConfig,
    custom_types: HashSet<String>,
    plugins: Vec<Arc<dyn BlockPlugin>>,
}

/// Entry point for defining blocks
///
/// Cheap to clone; clones share the registry, configuration and plugins.
#[derive(Clone)]
pub struct BlockFactory {
    inner: Arc<FactoryInner>,
}

impl BlockFactory {
    /// Create a factory
    ///
    /// # Arguments
    /// * `registry` - Where finalized blocks are installed
    /// * `config` - Custom types and block defaults
    /// * `plugins` - Registration hooks, run in this order
    ///
    /// # Errors
    /// [`BuildError::ReservedType`] if a custom type is named like a builtin
    /// or one of the wildcard indicators.
    pub fn new(
        registry: HostRegistry,
        config: FactoryConfig,
        plugins: Vec<Arc<dyn BlockPlugin>>,
    ) -> Result<Self, BuildError> {
        if let Some(reserved) = config.custom_types.iter().find(|name| TypeIndicator::is_reserved(name)) {
            return Err(BuildError::ReservedType(reserved.clone()));
        }

        let custom_types = config.custom_types.iter().cloned().collect();
        tracing::debug!(
            component = "factory",
            operation = "new",
            custom_types = config.custom_types.len(),
            plugins = plugins.len(),
            "block factory created"
        );

        Ok(Self {
            inner: Arc::new(FactoryInner {
                registry,
                config,
                custom_types,
                plugins,
            }),
        })
    }

    /// Start defining the block `name`
    pub fn block(&self, name: impl Into<String>) -> BlockBuilder<Statement> {
        BlockBuilder::new(self.clone(), name)
    }

    pub fn registry(&self) -> &HostRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.inner.config
    }

    /// Names of the registered plugins, in hook order
    pub fn plugin_names(&self) -> Vec<&str> {
        self.inner.plugins.iter().map(|plugin| plugin.name()).collect()
    }

    /// Finalize a definition: validate, run hooks and install it
    pub(crate) fn register<K, F>(&self, mut definition: BlockDefinition, implementation: F) -> Result<(), BuildError>
    where
        K: BlockKind,
        F: Fn(&BlockImpl<'_>) -> Result<K::Return, CodegenError> + Send + Sync + 'static,
    {
        if let Err(err) = definition.validate(&self.inner.custom_types) {
            tracing::warn!(component = "factory", operation = "register", error = %err, "definition rejected");
            return Err(err);
        }

        if let Err(key) = resolver::dry_run(definition.fields(), &implementation) {
            let err = BuildError::UndeclaredKey {
                block: definition.name().to_string(),
                key,
            };
            tracing::warn!(component = "factory", operation = "register", error = %err, "implementation rejected");
            return Err(err);
        }

        for plugin in &self.inner.plugins {
            tracing::debug!(
                component = "factory",
                operation = "will_register",
                plugin = plugin.name(),
                block = definition.name()
            );
            plugin.will_register(&mut definition);
        }

        let shape = Arc::new(BlockShape::snapshot(&definition));
        let generator = resolver::generator_for(definition.name(), definition.fields(), implementation, K::emit);
        self.inner
            .registry
            .install(definition.name(), RegisteredBlock { shape, generator });

        for plugin in &self.inner.plugins {
            tracing::debug!(
                component = "factory",
                operation = "did_register",
                plugin = plugin.name(),
                block = definition.name()
            );
            plugin.did_register(&definition);
        }

        tracing::info!(
            component = "factory",
            operation = "register",
            block = definition.name(),
            expression = definition.is_expression(),
            fields = definition.fields().len(),
            "block registered"
        );
        Ok(())
    }
}

impl std::fmt::Debug for BlockFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockFactory")
            .field("config", &self.inner.config)
            .field("plugins", &self.plugin_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_custom_types_rejected() {
        for name in ["String", "Boolean", "Number", "*", "none"] {
            let config = FactoryConfig::new().with_custom_type(name);
            let err = BlockFactory::new(HostRegistry::new(), config, vec![]).unwrap_err();
            assert_eq!(err, BuildError::ReservedType(name.to_string()));
        }
    }

    #[test]
    fn test_config_builders() {
        let config = FactoryConfig::new()
            .with_custom_types(["Player", "Item"])
            .with_default_colour(210u16)
            .with_default_tooltip("tip")
            .with_default_help_url("https://example.org");

        assert_eq!(config.custom_types, vec!["Player", "Item"]);
        assert_eq!(config.default_colour, Colour::Hue(210));
        assert_eq!(config.default_tooltip, "tip");
        assert_eq!(config.default_help_url, "https://example.org");
    }

    #[test]
    fn test_defaults_flow_into_definitions() {
        let config = FactoryConfig::new().with_default_colour("#ff0000").with_default_tooltip("tip");
        let factory = BlockFactory::new(HostRegistry::new(), config, vec![]).unwrap();
        let builder = factory.block("b");

        assert_eq!(builder.definition().colour(), &Colour::Hex("#ff0000".into()));
        assert_eq!(builder.definition().tooltip(), "tip");
    }

    #[test]
    fn test_clones_share_registry() {
        let factory = BlockFactory::new(HostRegistry::new(), FactoryConfig::default(), vec![]).unwrap();
        let clone = factory.clone();
        clone.block("x").implement(|_| Ok(String::new())).unwrap();
        assert!(factory.registry().contains("x"));
    }
}
