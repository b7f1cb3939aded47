//! Core domain logic for the MyList shopping list.
//! This crate is the single source of truth for item invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::shopping_item::{
    is_blank_item_name, ItemId, ItemValidationError, ShoppingItem, UNASSIGNED_ITEM_ID,
};
pub use repo::item_repo::{
    ItemRepository, RepoError, RepoResult, SqliteItemRepository, WriteOutcome,
};
pub use repo::item_store::ItemStore;
pub use service::list_controller::{
    ControllerError, ControllerResult, ListController, ListState, PendingIntent,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
