//! Host Registry - name-keyed store of registered blocks
//!
//! Every finalized block definition produces two artifacts that the host
//! consumes: a [`BlockShape`] used to initialize block instances and a
//! [`GeneratorFn`] used to emit code. They are always stored together as one
//! [`RegisteredBlock`] so that a reader never observes one without the other.
//!
//! Registering a name that already exists replaces the previous entry
//! (last write wins).

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::shape::BlockShape;
use crate::codegen::GeneratorFn;

/// Shape and generator installed under one block name
#[derive(Clone)]
pub struct RegisteredBlock {
    pub shape: Arc<BlockShape>,
    pub generator: GeneratorFn,
}

impl std::fmt::Debug for RegisteredBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredBlock")
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// Registry of block shapes and generators, shared by clones
///
/// The map sits behind `Arc<RwLock<..>>` so a factory and any number of code
/// generators can hold the same registry. Entries are cloned out before use;
/// no lock is held while a generator runs.
#[derive(Clone, Default)]
pub struct HostRegistry {
    blocks: Arc<RwLock<HashMap<String, RegisteredBlock>>>,
}

impl HostRegistry {
    /// Create a new empty registry
    ///
    /// # Example
    /// ```
    /// use block_builder::core::registry::HostRegistry;
    ///
    /// let registry = HostRegistry::new();
    /// assert_eq!(registry.count(), 0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Install both artifacts of a block under `name`
    ///
    /// # Returns
    /// `true` if an earlier registration under the same name was replaced
    pub fn install(&self, name: impl Into<String>, entry: RegisteredBlock) -> bool {
        let name = name.into();
        let replaced = self.blocks.write().insert(name.clone(), entry).is_some();
        if replaced {
            tracing::warn!(
                component = "registry",
                operation = "install",
                block = %name,
                "block re-registered, previous definition replaced"
            );
        } else {
            tracing::debug!(component = "registry", operation = "install", block = %name, "block registered");
        }
        replaced
    }

    /// Remove a block from the registry
    ///
    /// # Returns
    /// * `Ok(())` if the block was registered
    /// * `Err(RegistryError::BlockNotFound)` otherwise
    pub fn unregister(&self, name: &str) -> Result<(), RegistryError> {
        self.blocks
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RegistryError::BlockNotFound(name.to_string()))
    }

    /// Get both artifacts registered under `name`
    pub fn get(&self, name: &str) -> Result<RegisteredBlock, RegistryError> {
        self.blocks
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::BlockNotFound(name.to_string()))
    }

    /// Shape registered under `name`
    pub fn shape(&self, name: &str) -> Option<Arc<BlockShape>> {
        self.blocks.read().get(name).map(|entry| Arc::clone(&entry.shape))
    }

    /// Generator registered under `name`
    pub fn generator(&self, name: &str) -> Option<GeneratorFn> {
        self.blocks.read().get(name).map(|entry| Arc::clone(&entry.generator))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blocks.read().contains_key(name)
    }

    /// Names of all registered blocks, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.blocks.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn count(&self) -> usize {
        self.blocks.read().len()
    }

    /// Remove every registered block
    pub fn clear(&self) {
        self.blocks.write().clear();
    }
}

/// Registry error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// No block is registered under the given name
    #[error("Block not found: {0}")]
    BlockNotFound(String),
}
