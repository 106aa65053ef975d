//! Store adapter traits and constructors for both sides of a migration.
//!
//! The engine only talks to stores through two object-safe traits:
//! [`SourceStore`] for the read-only SQLite side and [`TargetStore`] for the
//! PostgreSQL side. Keeping the seam here lets the pipeline run against
//! in-memory doubles in tests.
//!
//! # Module Structure
//! - `helpers`: Shared helper utilities (identifier quoting, row access)
//! - `sqlite`: Source adapter (`SqliteSource`)
//! - `postgres`: Target adapter (`PostgresTarget`)

pub mod helpers;
pub mod postgres;
pub mod sqlite;

use crate::Result;
use crate::config::MigrationConfig;
use crate::migration::transcode::InsertPlan;
use crate::models::{CellValue, ColumnInfo, RowRecord};
use async_trait::async_trait;

pub use postgres::PostgresTarget;
pub use sqlite::SqliteSource;

/// Read-only access to the source store.
///
/// # Object Safety
/// This trait is object-safe, allowing for dynamic dispatch through
/// `Box<dyn SourceStore>`.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Verifies the store answers a trivial query.
    ///
    /// # Errors
    /// Returns a connection error when the store is unreachable.
    async fn test_connection(&self) -> Result<()>;

    /// User tables in natural (lexical) order.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Ordered column metadata for one table.
    async fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    /// The complete row set of a table in enumeration order.
    async fn fetch_rows(&self, table: &str) -> Result<Vec<RowRecord>>;

    /// Row count of a table.
    async fn count_rows(&self, table: &str) -> Result<u64>;

    /// Releases the underlying connection.
    async fn close(&self);
}

/// Write access to the target store.
///
/// Table listings exclude nothing; callers filter bookkeeping tables.
#[async_trait]
pub trait TargetStore: Send + Sync {
    /// Verifies the store answers a trivial query.
    ///
    /// # Errors
    /// Returns a connection error when the store is unreachable.
    async fn test_connection(&self) -> Result<()>;

    /// Base tables of the default schema in natural order.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Ordered column metadata for one table.
    async fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Inserts one row, silently skipping it on a uniqueness conflict.
    ///
    /// `values` align with `plan.columns`. Returns `true` when the row was
    /// stored, `false` when the target ignored it.
    ///
    /// # Errors
    /// Returns a write error for anything other than a uniqueness conflict.
    async fn insert_ignore(&self, plan: &InsertPlan, values: &[CellValue]) -> Result<bool>;

    /// Row count of a table.
    async fn count_rows(&self, table: &str) -> Result<u64>;

    /// Drops a table together with dependent objects.
    async fn drop_table(&self, table: &str) -> Result<()>;

    /// Discards any cached catalog data so the next listing hits the store.
    fn invalidate_catalog(&self) {}

    /// Releases the underlying connection.
    async fn close(&self);
}

/// Opens the source store selected by the configured environment.
///
/// # Errors
/// Returns a connection error if the file cannot be opened.
pub async fn open_source(config: &MigrationConfig) -> Result<Box<dyn SourceStore>> {
    let source = SqliteSource::open(config.source.path()).await?;
    Ok(Box::new(source))
}

/// Connects to the target store.
///
/// # Errors
/// Returns a connection error if the server cannot be reached or rejects
/// the credentials.
pub async fn open_target(config: &MigrationConfig) -> Result<Box<dyn TargetStore>> {
    let target = PostgresTarget::connect(
        &config.target,
        &config.credentials,
        config.options.catalog_cache_ttl,
    )
    .await?;
    Ok(Box::new(target))
}
