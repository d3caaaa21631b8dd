//! Event-local store for named collections.
//!
//! Algorithms read their inputs from and publish their outputs to a
//! [`WhiteBoard`]. Each collection is added exactly once and is read-only
//! afterwards.

use crate::error::StoreError;
use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;

/// Type-erased map from collection name to collection.
#[derive(Default)]
pub struct WhiteBoard {
    store: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl WhiteBoard {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a collection under the given name.
    ///
    /// # Errors
    /// Fails if the name is empty or already taken.
    pub fn add<T: Any + Send + Sync>(
        &mut self,
        name: impl Into<String>,
        object: T,
    ) -> Result<(), StoreError> {
        let name = name.into();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if self.store.contains_key(&name) {
            return Err(StoreError::Duplicate(name));
        }
        log::debug!("added collection '{}' of type {}", name, type_name::<T>());
        self.store.insert(name, Box::new(object));
        Ok(())
    }

    /// Reads a collection.
    ///
    /// # Errors
    /// Fails if no collection has this name or it holds a different type.
    pub fn get<T: Any>(&self, name: &str) -> Result<&T, StoreError> {
        let object = self
            .store
            .get(name)
            .ok_or_else(|| StoreError::Missing(name.to_string()))?;
        object
            .downcast_ref::<T>()
            .ok_or_else(|| StoreError::TypeMismatch {
                name: name.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Returns true if a collection with this name exists.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.store.contains_key(name)
    }

    /// Number of stored collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if nothing was added yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Collection names in lexical order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.store.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for WhiteBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhiteBoard")
            .field("collections", &self.names())
            .finish()
    }
}
