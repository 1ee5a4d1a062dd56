//! Destination store connection handling and batched writes.

use crate::error::Result;
use crate::transfer::quote_ident;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use tracing::debug;

/// Handle on the new SQLite database.
///
/// The destination schema is created by the application's own migration
/// step before this engine runs; this handle only counts and inserts.
pub struct DestinationStore {
    conn: Connection,
}

impl DestinationStore {
    /// Open the destination database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        debug!("Opened destination store {}", path.as_ref().display());
        Ok(Self { conn })
    }

    /// Row count of a table.
    pub fn row_count(&self, table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }

    /// Execute one batch of parameter-bound rows as a single unit of work.
    ///
    /// Each batch commits independently; there is no transaction spanning
    /// tables or the whole migration.
    pub fn write_batch(&self, insert_sql: &str, rows: &[Vec<Value>]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(insert_sql)?;
            for row in rows {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
