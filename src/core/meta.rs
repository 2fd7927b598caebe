//! Plugin-populated metadata attached to a block definition
//!
//! Plugins publish typed keys ([`MetaKey`]) and block authors fill them in
//! through the builder's `meta` call. The key space is shared by every plugin
//! active on a factory; two plugins choosing the same name for different value
//! types will read `None` back from each other's entries.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Typed key into a [`MetaBag`]
pub struct MetaKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> MetaKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for MetaKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for MetaKey<T> {}

impl<T> fmt::Debug for MetaKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MetaKey").field(&self.name).finish()
    }
}

/// String-keyed bag of arbitrary values
#[derive(Clone, Default)]
pub struct MetaBag {
    entries: HashMap<&'static str, Arc<dyn Any + Send + Sync>>,
}

impl MetaBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the entry for `key`
    pub fn insert<T: Any + Send + Sync>(&mut self, key: MetaKey<T>, value: T) {
        self.entries.insert(key.name, Arc::new(value));
    }

    /// Read the entry for `key`, if present and of the key's type
    pub fn get<T: Any + Send + Sync>(&self, key: MetaKey<T>) -> Option<&T> {
        self.entries.get(key.name)?.downcast_ref::<T>()
    }

    pub fn remove<T>(&mut self, key: MetaKey<T>) -> bool {
        self.entries.remove(key.name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names of all entries, sorted
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for MetaBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}
