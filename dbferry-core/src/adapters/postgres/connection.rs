//! PostgreSQL connection pool management.
//!
//! A migration run holds one target connection; the pool exists for its
//! timeouts and `after_connect` hook, not for parallelism.

use super::PostgresTarget;
use crate::Result;
use crate::cache::TtlCache;
use crate::config::ConnectionConfig;
use crate::error::MigrationError;
use crate::security::Credentials;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::time::Duration;
use tracing::debug;

impl PostgresTarget {
    /// Connects to the target and verifies the session settings apply.
    ///
    /// # Security
    /// - The password travels only inside `PgConnectOptions`
    /// - Error messages name `host:port/database`, never credentials
    ///
    /// # Errors
    /// Returns a configuration error for invalid settings and a connection
    /// error if the server cannot be reached or rejects the login.
    pub async fn connect(
        config: &ConnectionConfig,
        credentials: &Credentials,
        catalog_ttl: Duration,
    ) -> Result<Self> {
        config.validate()?;
        debug!("Connecting to PostgreSQL target {}", config);

        let options = Self::connect_options(config, credentials);
        let pool = Self::create_connection_pool(options, config).await?;

        Ok(Self::from_pool(pool, config.clone(), catalog_ttl))
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: PgPool, config: ConnectionConfig, catalog_ttl: Duration) -> Self {
        Self {
            pool,
            config,
            table_cache: TtlCache::new(catalog_ttl),
        }
    }

    /// Builds connect options from the configuration and credentials.
    pub(crate) fn connect_options(
        config: &ConnectionConfig,
        credentials: &Credentials,
    ) -> PgConnectOptions {
        let app_name = format!("dbferry-{}", env!("CARGO_PKG_VERSION"));
        PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(credentials.username())
            .password(credentials.password())
            .application_name(&app_name)
    }

    /// Creates the pool, eagerly opening the first connection so an
    /// unreachable server fails here rather than mid-run.
    ///
    /// Every new session gets the configured statement timeout and UTC
    /// timezone via `after_connect`.
    pub(crate) async fn create_connection_pool(
        options: PgConnectOptions,
        config: &ConnectionConfig,
    ) -> Result<PgPool> {
        use sqlx::Executor;

        let statement_timeout_ms = config.statement_timeout.as_millis();

        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .test_before_acquire(true)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    conn.execute(
                        format!("SET statement_timeout = {}", statement_timeout_ms).as_str(),
                    )
                    .await?;

                    // Set timezone to UTC for consistent timestamp casts
                    conn.execute("SET timezone = 'UTC'").await?;

                    Ok(())
                })
            })
            .connect_with(options)
            .await
            .map_err(|e| {
                MigrationError::connection_failed(
                    format!("failed to connect to PostgreSQL target {}", config),
                    e,
                )
            })
    }

    /// Closes the connection pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
