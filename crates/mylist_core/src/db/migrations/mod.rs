//! Schema bootstrap for the shopping database.
//!
//! # Responsibility
//! - Create `shopping_items` on a fresh database.
//! - Refuse databases written by a newer schema.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`; `0` means empty.
//! - Table creation and the version stamp commit together.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

const SCHEMA_VERSION: u32 = 1;
const SCHEMA_SQL: &str = include_str!("0001_init.sql");

/// Returns the schema version this binary writes.
pub fn latest_version() -> u32 {
    SCHEMA_VERSION
}

/// Brings the connection up to `latest_version()`.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    match found {
        SCHEMA_VERSION => Ok(()),
        0 => {
            let tx = conn.transaction()?;
            tx.execute_batch(SCHEMA_SQL)?;
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            tx.commit()?;
            info!("event=db_migrate module=db status=ok to_version={SCHEMA_VERSION}");
            Ok(())
        }
        newer => Err(DbError::UnsupportedSchemaVersion {
            db_version: newer,
            latest_supported: SCHEMA_VERSION,
        }),
    }
}
