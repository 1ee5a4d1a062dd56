//! Configuration validation.

use super::Config;
use crate::error::{MigrateError, Result};
use std::collections::HashSet;

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.source.locator.is_empty() {
        return Err(MigrateError::Config("source.locator is required".into()));
    }
    if config.destination.path.as_os_str().is_empty() {
        return Err(MigrateError::Config("destination.path is required".into()));
    }

    if config.migration.batch_size == 0 {
        return Err(MigrateError::Config(
            "migration.batch_size must be at least 1".into(),
        ));
    }
    if config.migration.tables.is_empty() {
        return Err(MigrateError::Config(
            "migration.tables must name at least one table".into(),
        ));
    }

    let mut seen = HashSet::new();
    for table in &config.migration.tables {
        if table.is_empty() {
            return Err(MigrateError::Config(
                "migration.tables contains an empty table name".into(),
            ));
        }
        if !seen.insert(table.as_str()) {
            return Err(MigrateError::Config(format!(
                "migration.tables lists '{}' more than once",
                table
            )));
        }
    }

    if !seen.contains(config.migration.check_table.as_str()) {
        return Err(MigrateError::Config(format!(
            "migration.check_table '{}' is not in migration.tables",
            config.migration.check_table
        )));
    }

    Ok(())
}
