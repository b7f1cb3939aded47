//! Domain model for the shopping list.
//!
//! # Responsibility
//! - Define the record shared by store, controller and presentation.
//!
//! # Invariants
//! - Every persisted item is identified by a store-assigned `ItemId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod shopping_item;
