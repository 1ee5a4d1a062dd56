//! Versioned schema upgrades for the legacy store.
//!
//! The legacy store must be at its latest known schema before extraction,
//! so the column set discovered per table matches the configured table
//! order. Versions are tracked through `PRAGMA user_version`; each script
//! applies in its own transaction.

use crate::error::{MigrateError, Result};
use rusqlite::Connection;
use tracing::{debug, info};

/// Latest known schema version of the legacy store.
pub const SCHEMA_VERSION: i32 = 3;

const UPGRADES: [(i32, &str); 3] = [
    (1, include_str!("../migrations/V1__baseline.sql")),
    (2, include_str!("../migrations/V2__collections.sql")),
    (3, include_str!("../migrations/V3__page_file_size.sql")),
];

/// Current schema version of a store.
pub fn schema_version(conn: &Connection) -> Result<i32> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

/// Apply all upgrade scripts newer than the store's current version.
///
/// A failing script aborts the whole migration; the transaction keeps the
/// store at the last fully applied version.
pub fn upgrade(conn: &mut Connection) -> Result<()> {
    let current = schema_version(conn)?;
    if current >= SCHEMA_VERSION {
        debug!("Legacy schema already at version {}", current);
        return Ok(());
    }

    for (version, sql) in UPGRADES {
        if version <= current {
            continue;
        }

        info!("Applying legacy schema upgrade V{}", version);
        let tx = conn.transaction()?;
        tx.execute_batch(sql)
            .map_err(|e| MigrateError::SchemaUpgrade {
                version,
                message: e.to_string(),
            })?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        names
    }

    #[test]
    fn test_upgrade_from_empty_reaches_latest() {
        let mut conn = Connection::open_in_memory().unwrap();
        upgrade(&mut conn).unwrap();

        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
        let names = table_names(&conn);
        for table in crate::config::TABLE_ORDER {
            assert!(names.iter().any(|n| n == table), "missing table {}", table);
        }
    }

    #[test]
    fn test_upgrade_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        upgrade(&mut conn).unwrap();
        upgrade(&mut conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_upgrade_from_v1_applies_remainder() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(include_str!("../migrations/V1__baseline.sql"))
            .unwrap();
        conn.pragma_update(None, "user_version", 1).unwrap();

        upgrade(&mut conn).unwrap();

        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
        let names = table_names(&conn);
        assert!(names.iter().any(|n| n == "collection"));
        assert!(names.iter().any(|n| n == "collection_series"));

        // V3 added media_page.file_size
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('media_page') WHERE name = 'file_size'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
