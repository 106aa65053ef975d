//! SQLite source adapter.
//!
//! # Module Structure
//! - `connection`: Opening the source file read-only on a single connection
//! - `introspection`: Table and column discovery via `sqlite_master` and PRAGMA
//! - `rows`: Full-table reads decoded into [`CellValue`](crate::models::CellValue)s
//!
//! # Security Guarantees
//! - All operations are read-only (SELECT/PRAGMA only)
//! - The file is opened with `read_only` and never created
//! - No network access required

pub mod connection;
pub mod introspection;
pub mod rows;


use super::SourceStore;
use crate::Result;
use crate::models::{ColumnInfo, RowRecord};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::path::PathBuf;

/// Read-only SQLite source.
///
/// SQLite is file-based, so a single connection is sufficient and keeps the
/// run strictly sequential.
pub struct SqliteSource {
    /// Connection pool (single connection)
    pub pool: SqlitePool,
    /// File the pool was opened on; `None` for pools handed in directly
    pub path: Option<PathBuf>,
}

impl std::fmt::Debug for SqliteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSource")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SourceStore for SqliteSource {
    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                crate::error::MigrationError::connection_failed("SQLite source did not respond", e)
            })?;

        if connectivity_result != 1 {
            return Err(crate::error::MigrationError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        introspection::list_tables(&self.pool).await
    }

    async fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        introspection::table_columns(&self.pool, table).await
    }

    async fn fetch_rows(&self, table: &str) -> Result<Vec<RowRecord>> {
        rows::fetch_all_rows(&self.pool, table).await
    }

    async fn count_rows(&self, table: &str) -> Result<u64> {
        rows::count_rows(&self.pool, table).await
    }

    async fn close(&self) {
        SqliteSource::close(self).await;
    }
}
