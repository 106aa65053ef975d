//! Run behavior options.

use crate::migration::ordering::DEFAULT_TABLE_PRIORITY;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Relative path the migration log is written to.
pub const DEFAULT_LOG_PATH: &str = "migration-log.json";

/// Tables owned by schema-migration tools; never migrated, never dropped.
pub const DEFAULT_BOOKKEEPING_TABLES: &[&str] = &[
    "knex_migrations",
    "knex_migrations_lock",
    "_prisma_migrations",
    "schema_migrations",
    "__diesel_schema_migrations",
    "_sqlx_migrations",
];

/// Options controlling a migration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// Where the migration log is persisted after a successful run
    pub log_path: PathBuf,
    /// Tables that must be migrated first, in this order
    pub table_priority: Vec<String>,
    /// Bookkeeping tables excluded from migration and rollback
    pub bookkeeping_tables: Vec<String>,
    /// Drop the target's tables when a run fails
    pub rollback_on_failure: bool,
    /// Time-to-live of the cached target table listing
    pub catalog_cache_ttl: Duration,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            table_priority: DEFAULT_TABLE_PRIORITY
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
            bookkeeping_tables: DEFAULT_BOOKKEEPING_TABLES
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
            rollback_on_failure: true,
            catalog_cache_ttl: Duration::from_secs(60),
        }
    }
}

impl MigrationOptions {
    /// Builder method to set the log path.
    pub fn with_log_path(mut self, log_path: PathBuf) -> Self {
        self.log_path = log_path;
        self
    }

    /// Builder method to replace the table priority list.
    pub fn with_table_priority(mut self, priority: Vec<String>) -> Self {
        self.table_priority = priority;
        self
    }

    /// Builder method to enable or disable automatic rollback.
    pub fn with_rollback_on_failure(mut self, enabled: bool) -> Self {
        self.rollback_on_failure = enabled;
        self
    }

    /// Whether a table belongs to the schema-migration tool.
    pub fn is_bookkeeping(&self, table: &str) -> bool {
        self.bookkeeping_tables.iter().any(|t| t == table)
    }

    /// Validates option values.
    ///
    /// # Errors
    /// Returns a configuration error for an empty log path or blank
    /// priority entries.
    pub fn validate(&self) -> crate::Result<()> {
        if self.log_path.as_os_str().is_empty() {
            return Err(crate::error::MigrationError::configuration(
                "log path cannot be empty",
            ));
        }
        if self.table_priority.iter().any(|t| t.trim().is_empty()) {
            return Err(crate::error::MigrationError::configuration(
                "table priority list contains an empty name",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MigrationOptions::default();
        assert_eq!(options.log_path, PathBuf::from("migration-log.json"));
        assert_eq!(options.table_priority.first().map(String::as_str), Some("users"));
        assert!(options.rollback_on_failure);
        assert!(options.is_bookkeeping("knex_migrations"));
        assert!(!options.is_bookkeeping("users"));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_blank_priority_entry_rejected() {
        let options = MigrationOptions::default()
            .with_table_priority(vec!["users".to_string(), " ".to_string()]);
        assert!(options.validate().is_err());
    }
}
