//! Target connection configuration.
//!
//! This module provides the `ConnectionConfig` struct describing how to reach
//! the PostgreSQL target. A migration run holds exactly one connection, so
//! the pool is capped at a single connection by default.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the target connection.
///
/// # Security
/// This struct intentionally does NOT store passwords or credentials.
/// Credentials are handled separately by [`crate::security::Credentials`].
///
/// # Example
/// ```rust
/// use dbferry_core::config::ConnectionConfig;
///
/// let config = ConnectionConfig::new("localhost".to_string())
///     .with_port(5432)
///     .with_database("app".to_string());
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Database name
    pub database: String,
    /// Schema holding the migrated tables
    pub schema: String,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Statement timeout applied to every session
    pub statement_timeout: Duration,
    /// Maximum number of connections in pool
    pub max_connections: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "app".to_string(),
            schema: "public".to_string(),
            connect_timeout: Duration::from_secs(30),
            statement_timeout: Duration::from_secs(300),
            max_connections: 1,
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}/{}", self.host, self.port, self.database)
        // Intentionally omit username and never include credentials
    }
}

impl ConnectionConfig {
    /// Validates connection configuration parameters.
    ///
    /// Every setting must be non-empty or non-zero; the first offending field
    /// is named in the error.
    ///
    /// # Errors
    /// Returns a configuration error naming the invalid field.
    pub fn validate(&self) -> crate::Result<()> {
        let problems = [
            ("host", self.host.trim().is_empty()),
            ("port", self.port == 0),
            ("database", self.database.trim().is_empty()),
            ("schema", self.schema.trim().is_empty()),
            ("max_connections", self.max_connections == 0),
            ("connect_timeout", self.connect_timeout.is_zero()),
            ("statement_timeout", self.statement_timeout.is_zero()),
        ];

        match problems.iter().find(|(_, invalid)| *invalid) {
            Some((field, _)) => Err(crate::error::MigrationError::configuration(format!(
                "target {} must be set to a non-empty, non-zero value",
                field
            ))),
            None => Ok(()),
        }
    }

    /// Creates a new connection config with defaults.
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Default::default()
        }
    }

    /// Builder method to set port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder method to set database.
    pub fn with_database(mut self, database: String) -> Self {
        self.database = database;
        self
    }

    /// Builder method to set the default schema.
    pub fn with_schema(mut self, schema: String) -> Self {
        self.schema = schema;
        self
    }
}
