//! Inventory collaborator
//!
//! The puzzle never owns the player's items. It asks an [`Inventory`]
//! whether an element is held, takes it on placement and hands it back on
//! pick-up.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Inventory refused an operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("element '{0}' is not held")]
    NotHeld(String),
    #[error("element '{0}' is locked by the inventory")]
    Unavailable(String),
}

/// External holder of unplaced elements
pub trait Inventory {
    fn has_element(&self, element_id: &str) -> bool;

    /// Take an element out for placement
    fn remove_element(&mut self, element_id: &str) -> Result<(), InventoryError>;

    /// Give back an element removed from a slot
    fn return_element(&mut self, element_id: &str);
}

/// Set-backed inventory for sessions without a game-side inventory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryInventory {
    items: BTreeSet<String>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns false if the element was already held
    pub fn insert(&mut self, element_id: impl Into<String>) -> bool {
        self.items.insert(element_id.into())
    }

    /// Held element ids, sorted
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Inventory for MemoryInventory {
    fn has_element(&self, element_id: &str) -> bool {
        self.items.contains(element_id)
    }

    fn remove_element(&mut self, element_id: &str) -> Result<(), InventoryError> {
        if self.items.remove(element_id) {
            Ok(())
        } else {
            Err(InventoryError::NotHeld(element_id.to_string()))
        }
    }

    fn return_element(&mut self, element_id: &str) {
        self.items.insert(element_id.to_string());
    }
}
