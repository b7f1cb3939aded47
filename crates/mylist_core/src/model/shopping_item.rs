//! Shopping item domain model.
//!
//! # Responsibility
//! - Define the single record persisted in `shopping_items`.
//! - Provide copy helpers used by toggle/rename intents.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused for another item.
//! - `name` is never empty or whitespace-only once persisted.
//! - `is_bought` starts as `false`.
//!
//! # See also
//! - crates/mylist_core/src/db/migrations/0001_init.sql

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned item identifier (SQLite rowid).
pub type ItemId = i64;

/// Placeholder id for items that have not been inserted yet.
///
/// The store replaces it with an auto-generated id on insert.
pub const UNASSIGNED_ITEM_ID: ItemId = 0;

/// Validation failures for item writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    /// Name is empty or contains only whitespace.
    EmptyName,
    /// Ids are positive rowids or the unassigned placeholder.
    NegativeId(ItemId),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "item name cannot be empty"),
            Self::NegativeId(id) => write!(f, "item id cannot be negative, got {id}"),
        }
    }
}

impl Error for ItemValidationError {}

/// One entry of the shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingItem {
    /// Store-assigned id; `UNASSIGNED_ITEM_ID` until inserted.
    pub id: ItemId,
    /// User-visible label.
    pub name: String,
    /// Completion flag shown as a checkbox.
    pub is_bought: bool,
}

impl ShoppingItem {
    /// Creates an item that is not persisted yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(UNASSIGNED_ITEM_ID, name, false)
    }

    /// Creates an item with a known id, e.g. when reading rows back.
    pub fn with_id(id: ItemId, name: impl Into<String>, is_bought: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_bought,
        }
    }

    /// Returns whether the store has assigned an id yet.
    pub fn is_persisted(&self) -> bool {
        self.id != UNASSIGNED_ITEM_ID
    }

    /// Returns a copy with `is_bought` flipped. `id` and `name` are kept.
    pub fn toggled(&self) -> Self {
        Self {
            is_bought: !self.is_bought,
            ..self.clone()
        }
    }

    /// Returns a copy with a new name. `id` and `is_bought` are kept.
    pub fn renamed(&self, new_name: impl Into<String>) -> Self {
        Self {
            name: new_name.into(),
            ..self.clone()
        }
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.id < 0 {
            return Err(ItemValidationError::NegativeId(self.id));
        }
        if is_blank_item_name(&self.name) {
            return Err(ItemValidationError::EmptyName);
        }
        Ok(())
    }
}

/// Returns `true` when `name` would be rejected as an item label.
///
/// Presentation code calls this before issuing an add intent.
pub fn is_blank_item_name(name: &str) -> bool {
    name.trim().is_empty()
}
