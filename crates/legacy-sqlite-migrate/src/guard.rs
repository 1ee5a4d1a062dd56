//! Run-once gate for the migration.
//!
//! Four independent short-circuiting checks decide whether an attempt
//! should run. Any failing check is a normal skip with zero side effects,
//! never an error.

use crate::error::Result;
use crate::locator;
use crate::marker;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

/// Outcome of evaluating the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// All checks passed; copy from `source_file`, then create `marker_file`.
    Proceed {
        source_file: PathBuf,
        marker_file: PathBuf,
    },

    /// A check failed; the migration does not apply.
    Skip(SkipReason),
}

/// Why a migration attempt was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The locator does not point at a local database file.
    NotFileBacked,

    /// The marker file exists: an attempt already occurred.
    AlreadyAttempted,

    /// No legacy database file on disk: nothing to migrate.
    SourceMissing,

    /// The destination already holds data.
    DestinationNotEmpty { rows: i64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFileBacked => write!(f, "source store is not file-backed"),
            SkipReason::AlreadyAttempted => write!(f, "marker file exists"),
            SkipReason::SourceMissing => write!(f, "legacy database file does not exist"),
            SkipReason::DestinationNotEmpty { rows } => {
                write!(f, "destination already holds {} rows", rows)
            }
        }
    }
}

/// Evaluate the four guard checks in order.
///
/// `destination_rows` is only invoked once the three filesystem checks have
/// passed, so a pre-existing marker means neither store is touched at all.
/// An error from it propagates: the caller decides how to contain it.
pub fn evaluate<F>(source_locator: &str, destination_rows: F) -> Result<GuardDecision>
where
    F: FnOnce() -> Result<i64>,
{
    let source_file = match locator::database_file_path(source_locator) {
        Some(path) => path,
        None => {
            info!("Source store is not file-backed, skipping migration");
            return Ok(GuardDecision::Skip(SkipReason::NotFileBacked));
        }
    };

    // database_file_path succeeded, so marker_file_path does too.
    let marker_file = match locator::marker_file_path(source_locator) {
        Some(path) => path,
        None => return Ok(GuardDecision::Skip(SkipReason::NotFileBacked)),
    };

    if marker::exists(&marker_file) {
        info!(
            "Marker file {} exists, migration already attempted, skipping",
            marker_file.display()
        );
        return Ok(GuardDecision::Skip(SkipReason::AlreadyAttempted));
    }

    if !source_file.exists() {
        info!(
            "Legacy database file {} does not exist, nothing to migrate",
            source_file.display()
        );
        return Ok(GuardDecision::Skip(SkipReason::SourceMissing));
    }

    let rows = destination_rows()?;
    if rows != 0 {
        info!(
            "Destination already holds {} rows, skipping migration",
            rows
        );
        return Ok(GuardDecision::Skip(SkipReason::DestinationNotEmpty { rows }));
    }

    debug!(
        "Guard passed: migrating {} into empty destination",
        source_file.display()
    );
    Ok(GuardDecision::Proceed {
        source_file,
        marker_file,
    })
}
