//! PostgreSQL target adapter.
//!
//! # Module Structure
//! - `connection`: Pool creation with per-session settings
//! - `introspection`: Table and column discovery in the default schema
//! - `writer`: Idempotent row inserts and table drops
//!
//! # Security Features
//! - Credentials are passed as connect options, never as a URL
//! - Statement timeout applied to every session
//! - Identifiers are always quoted

pub mod connection;
pub mod introspection;
pub mod writer;


use super::TargetStore;
use crate::Result;
use crate::cache::TtlCache;
use crate::config::ConnectionConfig;
use crate::migration::transcode::InsertPlan;
use crate::models::{CellValue, ColumnInfo};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::trace;

/// PostgreSQL target store.
///
/// The table listing of the default schema is cached for the configured
/// TTL; dropping a table or calling
/// [`TargetStore::invalidate_catalog`] clears it.
pub struct PostgresTarget {
    /// Connection pool (single connection)
    pub pool: PgPool,
    /// Settings the pool was opened with; `schema` scopes every query
    pub config: ConnectionConfig,
    table_cache: TtlCache<Vec<String>>,
}

impl std::fmt::Debug for PostgresTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresTarget")
            .field("config", &self.config)
            .field("catalog_ttl", &self.table_cache.ttl())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TargetStore for PostgresTarget {
    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                crate::error::MigrationError::connection_failed(
                    format!("PostgreSQL target {} did not respond", self.config),
                    e,
                )
            })?;

        if connectivity_result != 1 {
            return Err(crate::error::MigrationError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        if let Some(tables) = self.table_cache.get() {
            trace!("Using cached target table listing ({} tables)", tables.len());
            return Ok(tables);
        }

        let tables = introspection::list_tables(&self.pool, &self.config.schema).await?;
        self.table_cache.insert(tables.clone());
        Ok(tables)
    }

    async fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        introspection::table_columns(&self.pool, &self.config.schema, table).await
    }

    async fn insert_ignore(&self, plan: &InsertPlan, values: &[CellValue]) -> Result<bool> {
        writer::insert_ignore(&self.pool, &self.config.schema, plan, values).await
    }

    async fn count_rows(&self, table: &str) -> Result<u64> {
        introspection::count_rows(&self.pool, &self.config.schema, table).await
    }

    async fn drop_table(&self, table: &str) -> Result<()> {
        self.table_cache.clear();
        writer::drop_table(&self.pool, &self.config.schema, table).await
    }

    fn invalidate_catalog(&self) {
        self.table_cache.clear();
    }

    async fn close(&self) {
        PostgresTarget::close(self).await;
    }
}
