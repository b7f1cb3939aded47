//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the item store contract used by the list controller.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `ShoppingItem::validate()` before persistence.
//! - Missing ids on update/delete are reported, not raised as errors.

pub mod item_repo;
pub mod item_store;
