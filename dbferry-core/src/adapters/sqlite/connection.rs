//! SQLite connection handling.
//!
//! The source is opened read-only; a missing file is a connection error
//! rather than an empty database.

use super::SqliteSource;
use crate::Result;
use crate::error::MigrationError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use tracing::debug;

impl SqliteSource {
    /// Opens the SQLite file at `path`.
    ///
    /// # Errors
    /// Returns a connection error if the file does not exist or cannot be
    /// opened.
    pub async fn open(path: &Path) -> Result<Self> {
        debug!("Opening SQLite source {}", path.display());

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| {
                MigrationError::connection_failed(
                    format!("failed to open SQLite source '{}'", path.display()),
                    e,
                )
            })?;

        Ok(Self {
            pool,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wraps an existing pool, e.g. an in-memory database.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool, path: None }
    }

    /// Closes the connection gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
