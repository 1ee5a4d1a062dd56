//! Migration orchestrator - main workflow coordinator.
//!
//! Runs once at host startup: gate, pause consumers, upgrade the legacy
//! schema, copy each table in order, write the marker, resume consumers.
//! Whatever happens, the host keeps starting up; the outcome is returned,
//! never raised.

use crate::config::Config;
use crate::consumer::ConsumerRegistry;
use crate::error::{MigrateError, Result};
use crate::guard::{self, GuardDecision, SkipReason};
use crate::marker;
use crate::source::LegacyStore;
use crate::target::DestinationStore;
use crate::transfer::{self, TableCopyStats};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Migration orchestrator.
pub struct Orchestrator {
    config: Config,
    consumers: Arc<dyn ConsumerRegistry>,
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationOutcome {
    /// Unique run identifier.
    pub run_id: Uuid,

    /// Final status.
    pub status: MigrationStatus,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Per-table statistics for tables that copied completely, in copy
    /// order. On failure this is the part of the destination that is
    /// fully populated.
    pub tables_completed: Vec<TableCopyStats>,

    /// Total rows copied into the destination.
    pub rows_copied: i64,
}

/// Final status of a migration run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MigrationStatus {
    /// The guard declined the attempt; nothing was touched.
    Skipped { reason: SkipReason },

    /// Every table copied completely.
    Completed,

    /// The attempt failed partway; the destination may be partially
    /// populated up to and including `failed_table`.
    Failed {
        error: String,
        failed_table: Option<String>,
    },
}

impl Orchestrator {
    /// Create a new orchestrator.
    pub fn new(config: Config, consumers: Arc<dyn ConsumerRegistry>) -> Self {
        Self { config, consumers }
    }

    /// Run the migration.
    ///
    /// Never returns an error: skips and failures are both reported in the
    /// outcome so host startup continues regardless.
    pub fn run(&self) -> MigrationOutcome {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let clock = Instant::now();

        info!("Evaluating legacy store migration (run {})", run_id);

        let decision = match guard::evaluate(&self.config.source.locator, || {
            let destination = DestinationStore::open(&self.config.destination.path)?;
            destination.row_count(&self.config.migration.check_table)
        }) {
            Ok(decision) => decision,
            Err(e) => {
                // The attempt never began: no marker, consumers untouched.
                error!(
                    "Could not inspect the destination store: {}",
                    e.format_detailed()
                );
                return self.outcome(
                    run_id,
                    started_at,
                    clock,
                    MigrationStatus::Failed {
                        error: e.to_string(),
                        failed_table: None,
                    },
                    Vec::new(),
                );
            }
        };

        let (source_file, marker_file) = match decision {
            GuardDecision::Skip(reason) => {
                return self.outcome(
                    run_id,
                    started_at,
                    clock,
                    MigrationStatus::Skipped { reason },
                    Vec::new(),
                );
            }
            GuardDecision::Proceed {
                source_file,
                marker_file,
            } => (source_file, marker_file),
        };

        info!(
            "Migrating {} into {}",
            source_file.display(),
            self.config.destination.path.display()
        );
        self.consumers.pause();

        let mut completed = Vec::new();
        let copy_result = self.execute_copy(&source_file, &mut completed);

        let status = match copy_result {
            Ok(()) => {
                info!(
                    "Migration complete: {} tables, {} rows in {:.1}s",
                    completed.len(),
                    completed.iter().map(|s| s.rows).sum::<i64>(),
                    clock.elapsed().as_secs_f64()
                );
                MigrationStatus::Completed
            }
            Err(e) => {
                error!("Migration failed: {}", e.format_detailed());
                let failed_table = match &e {
                    MigrateError::Copy { table, .. } => Some(table.clone()),
                    _ => None,
                };
                MigrationStatus::Failed {
                    error: e.to_string(),
                    failed_table,
                }
            }
        };

        // Single-attempt policy: the marker records the attempt itself, not
        // its success. Failures here are logged, never raised, so resume()
        // below runs on every path out of the copy window.
        let mark = self.config.migration.mark_on_failure || status == MigrationStatus::Completed;
        if mark {
            if let Err(e) = marker::write(&marker_file) {
                warn!(
                    "Could not write marker file {}: {}",
                    marker_file.display(),
                    e
                );
            }
        } else {
            warn!("Copy failed and mark_on_failure is off, next startup will retry");
        }

        self.consumers.resume();

        self.outcome(run_id, started_at, clock, status, completed)
    }

    /// Upgrade the legacy schema, then copy every table in configured order.
    ///
    /// Stats for each fully copied table land in `completed` before the next
    /// table starts, so a failure leaves an exact record of what made it.
    fn execute_copy(&self, source_file: &Path, completed: &mut Vec<TableCopyStats>) -> Result<()> {
        let mut source = LegacyStore::open(source_file)?;
        let target = DestinationStore::open(&self.config.destination.path)?;

        source.upgrade_schema()?;

        for table in &self.config.migration.tables {
            let stats = transfer::copy_table(
                &source,
                &target,
                table,
                self.config.migration.batch_size,
            )?;
            info!(
                "{}: copied {} rows in {} batches",
                stats.table, stats.rows, stats.batches
            );
            completed.push(stats);
        }

        Ok(())
    }

    fn outcome(
        &self,
        run_id: Uuid,
        started_at: DateTime<Utc>,
        clock: Instant,
        status: MigrationStatus,
        tables_completed: Vec<TableCopyStats>,
    ) -> MigrationOutcome {
        let rows_copied = tables_completed.iter().map(|s| s.rows).sum();
        MigrationOutcome {
            run_id,
            status,
            started_at,
            completed_at: Utc::now(),
            duration_seconds: clock.elapsed().as_secs_f64(),
            tables_completed,
            rows_copied,
        }
    }
}

impl MigrationOutcome {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
