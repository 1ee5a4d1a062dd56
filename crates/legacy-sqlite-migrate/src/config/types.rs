//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Dependency-safe copy order for the legacy schema.
///
/// Every table appears after all tables it references by foreign key. The
/// list is maintained by hand alongside the schema upgrade scripts; it is
/// configuration, not something derived at run time.
pub const TABLE_ORDER: [&str; 14] = [
    "library",
    "user",
    "user_library_sharing",
    "series",
    "series_metadata",
    "book",
    "media",
    "media_page",
    "media_file",
    "book_metadata",
    "book_metadata_author",
    "read_progress",
    "collection",
    "collection_series",
];

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Legacy store configuration.
    pub source: SourceConfig,

    /// New SQLite database configuration.
    pub destination: DestinationConfig,

    /// Migration behavior configuration.
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// Legacy store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Connection locator of the legacy store, e.g.
    /// `legacy:file:/var/lib/app/database;LOCK=none`. In-memory, SSL, TCP
    /// and archive-backed locators are not eligible for migration.
    pub locator: String,
}

/// New SQLite database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Path of the destination database file. The destination schema is
    /// created by the application's own migration step before this engine
    /// runs.
    pub path: PathBuf,
}

/// Migration behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Rows per insert batch (default: 500).
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Tables to copy, in dependency-safe order.
    #[serde(default = "default_table_order")]
    pub tables: Vec<String>,

    /// Table whose row count decides whether the destination is still
    /// empty (default: `user`).
    #[serde(default = "default_check_table")]
    pub check_table: String,

    /// Write the completion marker even when the copy fails (default:
    /// true). Disabling this allows another attempt on next startup, at
    /// the cost of re-copying into a possibly part-populated destination.
    #[serde(default = "default_true")]
    pub mark_on_failure: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            tables: default_table_order(),
            check_table: default_check_table(),
            mark_on_failure: default_true(),
        }
    }
}

fn default_batch_size() -> usize {
    500
}

fn default_table_order() -> Vec<String> {
    TABLE_ORDER.iter().map(|s| s.to_string()).collect()
}

fn default_check_table() -> String {
    "user".to_string()
}

fn default_true() -> bool {
    true
}
