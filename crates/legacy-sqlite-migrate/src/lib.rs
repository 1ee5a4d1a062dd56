//! # legacy-sqlite-migrate
//!
//! One-time, idempotent migration of the legacy embedded database into
//! the SQLite database that replaces it.
//!
//! The engine runs once at host startup, before consumer traffic resumes:
//!
//! - **Run-once guard** backed by a marker file next to the legacy store
//! - **Schema upgrade** bringing the legacy store to its latest version
//! - **Ordered table copy** streaming rows in batches of 500, with
//!   byte-faithful handling of binary columns
//! - **Consumer pause/resume** around the copy window
//!
//! All failures are contained: the host process keeps starting up whatever
//! the outcome, and the outcome is reported rather than raised.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use legacy_sqlite_migrate::{Config, NoopConsumerRegistry, Orchestrator};
//!
//! fn main() -> legacy_sqlite_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let orchestrator = Orchestrator::new(config, Arc::new(NoopConsumerRegistry));
//!     let outcome = orchestrator.run();
//!     println!("{}", outcome.to_json()?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod consumer;
pub mod error;
pub mod guard;
pub mod locator;
pub mod marker;
pub mod orchestrator;
pub mod schema;
pub mod source;
pub mod target;
pub mod transfer;

// Re-exports for convenient access
pub use config::{Config, DestinationConfig, MigrationConfig, SourceConfig, TABLE_ORDER};
pub use consumer::{ConsumerRegistry, NoopConsumerRegistry};
pub use error::{MigrateError, Result};
pub use guard::{GuardDecision, SkipReason};
pub use orchestrator::{MigrationOutcome, MigrationStatus, Orchestrator};
pub use source::LegacyStore;
pub use target::DestinationStore;
pub use transfer::TableCopyStats;
