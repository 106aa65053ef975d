//! Core engine for dbferry, a SQLite to PostgreSQL data migration tool.
//!
//! This crate moves an existing dataset from a SQLite file into a PostgreSQL
//! database whose schema was already created by a schema-migration tool. It
//! discovers columns on both sides, copies rows table by table with
//! idempotent inserts, reconciles row counts, and can drop the target's
//! tables wholesale when a run fails.
//!
//! # Security Guarantees
//! - No credentials stored or logged in any data structures
//! - The source is opened read-only
//! - Passwords are zeroized on drop and redacted from `Debug` output
//!
//! # Architecture
//! - `adapters`: store traits plus the SQLite source and PostgreSQL target
//! - `migration`: ordering, transcoding, transfer, verification, rollback and
//!   the run state machine
//! - `config`, `security`, `logging`, `error`: ambient plumbing

pub mod adapters;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod migration;
pub mod models;
pub mod security;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use adapters::{PostgresTarget, SourceStore, SqliteSource, TargetStore};
pub use config::{
    AppEnvironment, ConnectionConfig, MigrationConfig, MigrationOptions, SourceConfig,
};
pub use error::{MigrationError, Result};
pub use migration::log::MigrationLog;
pub use migration::{MigrationEngine, run_migration, run_rollback};
pub use models::{
    CellValue, ColumnInfo, MigrationLogEntry, RowRecord, RunOutcome, RunPhase, RunReport,
    TableDescriptor, VerificationResult,
};
pub use security::Credentials;
