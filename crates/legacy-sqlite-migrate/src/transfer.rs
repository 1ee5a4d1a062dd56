//! Per-table streaming copy from the legacy store into the destination.
//!
//! Each table is read with an unconstrained full-table select. The column
//! list and declared types come from the statement metadata at run time,
//! never from hardcoded per-table lists; the insert statement mirrors the
//! discovered columns positionally. Rows accumulate into bounded batches
//! that execute as one unit of work each.

use crate::error::{MigrateError, Result};
use crate::source::LegacyStore;
use crate::target::DestinationStore;
use rusqlite::types::{Value, ValueRef};
use rusqlite::Statement;
use tracing::{debug, trace};

/// Statistics from copying one table.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TableCopyStats {
    /// Table name.
    pub table: String,

    /// Rows copied.
    pub rows: i64,

    /// Batch executes performed.
    pub batches: i64,
}

/// A column discovered from the source result metadata.
#[derive(Debug, Clone)]
struct ColumnDescriptor {
    name: String,
    is_blob: bool,
}

/// Copy one table completely, in batches of `batch_size` rows.
pub fn copy_table(
    source: &LegacyStore,
    target: &DestinationStore,
    table: &str,
    batch_size: usize,
) -> Result<TableCopyStats> {
    copy_table_inner(source, target, table, batch_size).map_err(|e| match e {
        MigrateError::Copy { .. } => e,
        other => MigrateError::copy(table, other.to_string()),
    })
}

fn copy_table_inner(
    source: &LegacyStore,
    target: &DestinationStore,
    table: &str,
    batch_size: usize,
) -> Result<TableCopyStats> {
    let select_sql = format!("SELECT * FROM {}", quote_ident(table));
    let mut select = source.connection().prepare(&select_sql)?;

    let columns = column_descriptors(&select);
    let insert_sql = build_insert(table, &columns);
    debug!("{}: discovered {} columns", table, columns.len());

    let mut stats = TableCopyStats {
        table: table.to_string(),
        rows: 0,
        batches: 0,
    };
    let mut batch: Vec<Vec<Value>> = Vec::with_capacity(batch_size);

    let mut rows = select.query([])?;
    while let Some(row) = rows.next()? {
        let mut bound = Vec::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            let value = if column.is_blob {
                // Binary columns are materialized in full before binding.
                match row.get_ref(idx)? {
                    ValueRef::Null => Value::Null,
                    ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
                    other => Value::from(other),
                }
            } else {
                // Opaque passthrough: both stores negotiate the type.
                Value::from(row.get_ref(idx)?)
            };
            bound.push(value);
        }

        batch.push(bound);
        if batch.len() == batch_size {
            target.write_batch(&insert_sql, &batch)?;
            stats.rows += batch.len() as i64;
            stats.batches += 1;
            trace!("{}: flushed batch {} ({} rows)", table, stats.batches, batch_size);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        target.write_batch(&insert_sql, &batch)?;
        stats.rows += batch.len() as i64;
        stats.batches += 1;
    }

    Ok(stats)
}

fn column_descriptors(stmt: &Statement<'_>) -> Vec<ColumnDescriptor> {
    stmt.columns()
        .iter()
        .map(|column| ColumnDescriptor {
            name: column.name().to_string(),
            is_blob: column
                .decl_type()
                .map(|decl| decl.to_ascii_uppercase().contains("BLOB"))
                .unwrap_or(false),
        })
        .collect()
}

fn build_insert(table: &str, columns: &[ColumnDescriptor]) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        column_list,
        placeholders
    )
}

/// Quote an identifier, escaping embedded double quotes.
///
/// Identifiers cannot be bound as statement parameters, so dynamic table
/// and column names are quoted instead.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::path::PathBuf;

    const ITEM_DDL: &str = "CREATE TABLE item (
        id INTEGER PRIMARY KEY,
        name TEXT,
        score REAL,
        payload BLOB
    )";

    fn stores(dir: &tempfile::TempDir) -> (LegacyStore, DestinationStore, PathBuf) {
        let source_path = dir.path().join("source.db");
        let dest_path = dir.path().join("dest.sqlite");

        let source_conn = Connection::open(&source_path).unwrap();
        source_conn.execute_batch(ITEM_DDL).unwrap();
        drop(source_conn);

        let dest_conn = Connection::open(&dest_path).unwrap();
        dest_conn.execute_batch(ITEM_DDL).unwrap();
        drop(dest_conn);

        let source = LegacyStore::open(&source_path).unwrap();
        let target = DestinationStore::open(&dest_path).unwrap();
        (source, target, dest_path)
    }

    #[test]
    fn test_batches_of_500_with_partial_trailer() {
        let dir = tempfile::tempdir().unwrap();
        let (source, target, _) = stores(&dir);

        for i in 0..1001 {
            source
                .connection()
                .execute(
                    "INSERT INTO item (id, name, score, payload) VALUES (?, ?, ?, NULL)",
                    rusqlite::params![i, format!("item-{}", i), i as f64 / 2.0],
                )
                .unwrap();
        }

        let stats = copy_table(&source, &target, "item", 500).unwrap();
        assert_eq!(stats.rows, 1001);
        assert_eq!(stats.batches, 3);
        assert_eq!(target.row_count("item").unwrap(), 1001);
    }

    #[test]
    fn test_values_survive_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let (source, target, dest_path) = stores(&dir);

        let payload: Vec<u8> = (0u16..=255).map(|b| b as u8).collect();
        source
            .connection()
            .execute(
                "INSERT INTO item (id, name, score, payload) VALUES (?, ?, ?, ?)",
                rusqlite::params![7, "séries", -1.5, payload],
            )
            .unwrap();
        source
            .connection()
            .execute(
                "INSERT INTO item (id, name, score, payload) VALUES (?, NULL, NULL, NULL)",
                rusqlite::params![8],
            )
            .unwrap();

        let stats = copy_table(&source, &target, "item", 500).unwrap();
        assert_eq!(stats.rows, 2);
        assert_eq!(stats.batches, 1);

        let dest = Connection::open(&dest_path).unwrap();
        let (name, score, copied): (String, f64, Vec<u8>) = dest
            .query_row(
                "SELECT name, score, payload FROM item WHERE id = 7",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(name, "séries");
        assert_eq!(score, -1.5);
        assert_eq!(copied, payload);

        let nulls: (Option<String>, Option<Vec<u8>>) = dest
            .query_row("SELECT name, payload FROM item WHERE id = 8", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(nulls, (None, None));
    }

    #[test]
    fn test_empty_table_copies_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (source, target, _) = stores(&dir);

        let stats = copy_table(&source, &target, "item", 500).unwrap();
        assert_eq!(stats.rows, 0);
        assert_eq!(stats.batches, 0);
    }

    #[test]
    fn test_missing_destination_table_is_copy_error() {
        let dir = tempfile::tempdir().unwrap();
        let (source, _, _) = stores(&dir);

        let other_path = dir.path().join("other.sqlite");
        Connection::open(&other_path).unwrap();
        let target = DestinationStore::open(&other_path).unwrap();

        source
            .connection()
            .execute("INSERT INTO item (id) VALUES (1)", [])
            .unwrap();

        let err = copy_table(&source, &target, "item", 500).unwrap_err();
        match err {
            MigrateError::Copy { table, .. } => assert_eq!(table, "item"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_build_insert_quotes_identifiers() {
        let columns = vec![
            ColumnDescriptor {
                name: "id".into(),
                is_blob: false,
            },
            ColumnDescriptor {
                name: "payload".into(),
                is_blob: true,
            },
        ];
        assert_eq!(
            build_insert("user", &columns),
            "INSERT INTO \"user\" (\"id\", \"payload\") VALUES (?, ?)"
        );
    }
}
