//! Shared, owned handle to the shopping item store.
//!
//! # Responsibility
//! - Own the single SQLite connection for the process.
//! - Hand out repository access from any thread.
//!
//! # Invariants
//! - The handle is opened once at startup and cloned into consumers; there is
//!   no hidden global instance.
//! - Each operation holds the connection lock for its whole duration.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::shopping_item::{ItemId, ShoppingItem};
use crate::repo::item_repo::{
    ItemRepository, RepoError, RepoResult, SqliteItemRepository, WriteOutcome,
};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Cloneable, thread-safe item store backed by one SQLite connection.
#[derive(Clone)]
pub struct ItemStore {
    conn: Arc<Mutex<Connection>>,
}

impl ItemStore {
    /// Opens the store at `path`, creating and migrating the file as needed.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already bootstrapped connection.
    ///
    /// The caller is responsible for having applied migrations.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn with_repo<T>(
        &self,
        f: impl FnOnce(&SqliteItemRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let conn = self.conn.lock().map_err(|_| {
            RepoError::StoreUnavailable("connection lock poisoned by a panicked writer".to_string())
        })?;
        f(&SqliteItemRepository::new(&conn))
    }
}

impl ItemRepository for ItemStore {
    fn get_all_items(&self) -> RepoResult<Vec<ShoppingItem>> {
        self.with_repo(|repo| repo.get_all_items())
    }

    fn insert_item(&self, item: &ShoppingItem) -> RepoResult<ItemId> {
        self.with_repo(|repo| repo.insert_item(item))
    }

    fn update_item(&self, item: &ShoppingItem) -> RepoResult<WriteOutcome> {
        self.with_repo(|repo| repo.update_item(item))
    }

    fn delete_item(&self, item: &ShoppingItem) -> RepoResult<WriteOutcome> {
        self.with_repo(|repo| repo.delete_item(item))
    }
}

#[cfg(test)]
mod tests {
    use super::ItemStore;
    use crate::model::shopping_item::ShoppingItem;
    use crate::repo::item_repo::ItemRepository;
    use std::thread;

    #[test]
    fn clones_share_one_connection() {
        let store = ItemStore::open_in_memory().unwrap();
        let clone = store.clone();

        clone.insert_item(&ShoppingItem::new("bread")).unwrap();

        let items = store.get_all_items().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "bread");
    }

    #[test]
    fn concurrent_inserts_get_distinct_ids() {
        let store = ItemStore::open_in_memory().unwrap();

        let handles = (0..8)
            .map(|index| {
                let store = store.clone();
                thread::spawn(move || {
                    store
                        .insert_item(&ShoppingItem::new(format!("item {index}")))
                        .unwrap()
                })
            })
            .collect::<Vec<_>>();

        let mut ids = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(store.get_all_items().unwrap().len(), 8);
    }
}
