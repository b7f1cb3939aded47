//! Shopping item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the four item store operations over `shopping_items`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `get_all_items` is ordered by `id DESC` (most recently created first).
//! - Insert with an explicit id replaces the whole row (last writer wins).
//! - Update/delete of a missing id is a no-op reported as `WriteOutcome::Missing`.
//! - Write paths call `ShoppingItem::validate()` before SQL mutations.

use crate::db::DbError;
use crate::model::shopping_item::{ItemId, ItemValidationError, ShoppingItem};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_SELECT_SQL: &str = "SELECT id, name, is_bought FROM shopping_items";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ItemValidationError),
    Db(DbError),
    InvalidData(String),
    /// The store handle can no longer be used (e.g. poisoned connection lock).
    StoreUnavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
            Self::StoreUnavailable(message) => write!(f, "item store unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) | Self::StoreUnavailable(_) => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of an update/delete that targets a row by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A row matched and was written.
    Applied,
    /// No row with that id exists; nothing changed.
    Missing,
}

impl WriteOutcome {
    fn from_changed_rows(changed: usize) -> Self {
        if changed == 0 {
            Self::Missing
        } else {
            Self::Applied
        }
    }

    /// Returns whether a row was actually written.
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

/// Repository interface for the shopping item store.
pub trait ItemRepository {
    /// Returns every item, newest id first.
    fn get_all_items(&self) -> RepoResult<Vec<ShoppingItem>>;
    /// Inserts `item` and returns its id. An unassigned id is generated.
    fn insert_item(&self, item: &ShoppingItem) -> RepoResult<ItemId>;
    /// Replaces `name` and `is_bought` of the row matching `item.id`.
    fn update_item(&self, item: &ShoppingItem) -> RepoResult<WriteOutcome>;
    /// Removes the row matching `item.id`.
    fn delete_item(&self, item: &ShoppingItem) -> RepoResult<WriteOutcome>;
}

/// SQLite-backed item repository over a borrowed connection.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn get_all_items(&self) -> RepoResult<Vec<ShoppingItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} ORDER BY id DESC;"))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }

    fn insert_item(&self, item: &ShoppingItem) -> RepoResult<ItemId> {
        item.validate()?;

        if !item.is_persisted() {
            self.conn.execute(
                "INSERT INTO shopping_items (name, is_bought) VALUES (?1, ?2);",
                params![item.name.as_str(), item.is_bought],
            )?;
            return Ok(self.conn.last_insert_rowid());
        }

        self.conn.execute(
            "INSERT OR REPLACE INTO shopping_items (id, name, is_bought) VALUES (?1, ?2, ?3);",
            params![item.id, item.name.as_str(), item.is_bought],
        )?;
        Ok(item.id)
    }

    fn update_item(&self, item: &ShoppingItem) -> RepoResult<WriteOutcome> {
        item.validate()?;

        let changed = self.conn.execute(
            "UPDATE shopping_items SET name = ?1, is_bought = ?2 WHERE id = ?3;",
            params![item.name.as_str(), item.is_bought, item.id],
        )?;

        Ok(WriteOutcome::from_changed_rows(changed))
    }

    fn delete_item(&self, item: &ShoppingItem) -> RepoResult<WriteOutcome> {
        let changed = self
            .conn
            .execute("DELETE FROM shopping_items WHERE id = ?1;", [item.id])?;

        Ok(WriteOutcome::from_changed_rows(changed))
    }
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<ShoppingItem> {
    let id: ItemId = row.get("id")?;

    let is_bought = match row.get::<_, i64>("is_bought")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_bought value `{other}` for shopping_items.id={id}"
            )));
        }
    };

    let item = ShoppingItem::with_id(id, row.get::<_, String>("name")?, is_bought);
    item.validate().map_err(|err| {
        RepoError::InvalidData(format!("{err} for shopping_items.id={id}"))
    })?;
    Ok(item)
}
