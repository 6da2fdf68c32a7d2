//! In-memory catalog store
//!
//! Holds every loaded item for the lifetime of the session. Filtering only
//! ever reads from here.

use std::sync::Arc;

use super::{CatalogError, Item};

/// Loaded items, written once
#[derive(Debug, Default)]
pub struct CatalogStore {
    items: Vec<Arc<Item>>,
    loaded: bool,
}

impl CatalogStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign the loaded dataset wholesale. Only the first call succeeds.
    pub fn populate(&mut self, items: Vec<Item>) -> Result<(), CatalogError> {
        if self.loaded {
            return Err(CatalogError::AlreadyLoaded);
        }
        self.items = items.into_iter().map(Arc::new).collect();
        self.loaded = true;
        Ok(())
    }

    /// All items in dataset order
    pub fn items(&self) -> &[Arc<Item>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether a dataset has been assigned (possibly an empty one)
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}
