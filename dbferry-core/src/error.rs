//! Error types with credential sanitization.
//!
//! The variants follow the migration failure taxonomy: connection, schema and
//! write failures abort a run and trigger rollback, while configuration, I/O
//! and serialization failures surface at the edges (CLI setup, log
//! persistence). Connection strings and passwords never appear in messages.

use thiserror::Error;

/// Main error type for dbferry operations.
///
/// # Security
/// All error messages are sanitized to prevent credential leakage.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Either store could not be reached (credentials sanitized)
    #[error("Database connection failed: {context}")]
    Connection {
        /// What was being attempted
        context: String,
        /// Underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A catalog query for a table or table listing failed
    #[error("Schema introspection failed: {context}")]
    Schema {
        /// What was being attempted
        context: String,
        /// Underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A row insert or DDL statement against the target failed
    #[error("Write to target failed: {context}")]
    Write {
        /// What was being attempted
        context: String,
        /// Underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is wrong with the configuration
        message: String,
    },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        /// What was being attempted
        context: String,
        /// Underlying failure
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        /// What was being attempted
        context: String,
        /// Underlying failure
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with MigrationError
pub type Result<T> = std::result::Result<T, MigrationError>;

impl MigrationError {
    /// Creates a connection error with sanitized context
    pub fn connection_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a schema error for a failed catalog query
    pub fn schema_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Schema {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a write error for a failed statement against the target
    pub fn write_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Write {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this failure escalates to a rollback of the target.
    ///
    /// Only connection, schema and write failures do; everything else
    /// degrades with a diagnostic.
    pub fn triggers_rollback(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Schema { .. } | Self::Write { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollback_classification() {
        let io = std::io::Error::other("boom");
        assert!(MigrationError::connection_failed("pg", io).triggers_rollback());

        let io = std::io::Error::other("boom");
        assert!(MigrationError::schema_failed("columns for users", io).triggers_rollback());

        let io = std::io::Error::other("boom");
        assert!(MigrationError::write_failed("insert into users", io).triggers_rollback());

        assert!(!MigrationError::configuration("bad port").triggers_rollback());

        let io_error = MigrationError::Io {
            context: "write log".to_string(),
            source: std::io::Error::other("disk full"),
        };
        assert!(!io_error.triggers_rollback());
    }

    #[test]
    fn test_error_messages_carry_context() {
        let error = MigrationError::configuration("PG_PASSWORD is required");
        assert!(error.to_string().contains("PG_PASSWORD is required"));

        let error = MigrationError::write_failed(
            "row 3 of table 'orders'",
            std::io::Error::other("violates foreign key"),
        );
        assert!(error.to_string().contains("row 3 of table 'orders'"));
    }
}
