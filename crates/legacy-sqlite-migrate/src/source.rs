//! Legacy store connection handling.

use crate::error::Result;
use crate::schema;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use tracing::debug;

/// Handle on the legacy database file.
///
/// Opened read-write without create: the schema upgrade mutates the store,
/// but a missing file is the guard's business, not ours. The connection
/// releases on drop on every exit path.
pub struct LegacyStore {
    conn: Connection,
}

impl LegacyStore {
    /// Open the legacy database file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI,
        )?;
        debug!("Opened legacy store {}", path.as_ref().display());
        Ok(Self { conn })
    }

    /// Bring the store's schema to the latest known version.
    pub fn upgrade_schema(&mut self) -> Result<()> {
        schema::upgrade(&mut self.conn)
    }

    /// Current schema version.
    pub fn schema_version(&self) -> Result<i32> {
        schema::schema_version(&self.conn)
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_does_not_create_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");

        assert!(LegacyStore::open(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_open_and_upgrade_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.db");
        Connection::open(&path).unwrap();

        let mut store = LegacyStore::open(&path).unwrap();
        store.upgrade_schema().unwrap();
        assert_eq!(store.schema_version().unwrap(), schema::SCHEMA_VERSION);
    }
}
