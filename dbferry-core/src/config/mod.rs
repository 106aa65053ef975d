//! Configuration types for a migration run.
//!
//! - `ConnectionConfig`: target (PostgreSQL) connection settings
//! - `SourceConfig`: source (SQLite) file selection per environment
//! - `MigrationOptions`: run behavior (log path, table priority, rollback)
//! - `MigrationConfig`: everything above plus target credentials
//!
//! # Security
//! Only `MigrationConfig` holds the password, inside `Credentials`; the other
//! structs are safe to log and serialize.

mod connection;
mod migration;
mod source;

pub use connection::ConnectionConfig;
pub use migration::{DEFAULT_BOOKKEEPING_TABLES, DEFAULT_LOG_PATH, MigrationOptions};
pub use source::{AppEnvironment, SourceConfig};

use crate::security::Credentials;

/// Complete configuration for connecting both stores and running a migration.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// SQLite source selection
    pub source: SourceConfig,
    /// PostgreSQL target settings
    pub target: ConnectionConfig,
    /// Target login
    pub credentials: Credentials,
    /// Run behavior
    pub options: MigrationOptions,
}

impl MigrationConfig {
    /// Assembles a configuration from its parts.
    pub fn new(
        source: SourceConfig,
        target: ConnectionConfig,
        credentials: Credentials,
        options: MigrationOptions,
    ) -> Self {
        Self {
            source,
            target,
            credentials,
            options,
        }
    }

    /// Validates every section.
    ///
    /// # Errors
    /// Returns a configuration error when the target password is missing or
    /// any section is invalid.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.credentials.has_password() {
            return Err(crate::error::MigrationError::configuration(
                "target password is required (set PG_PASSWORD)",
            ));
        }
        self.target.validate()?;
        self.source.validate()?;
        self.options.validate()?;
        Ok(())
    }
}
