//! Table and column discovery for the SQLite source.

use crate::Result;
use crate::adapters::helpers::{RowExt, quote_identifier};
use crate::error::MigrationError;
use crate::models::ColumnInfo;
use sqlx::SqlitePool;

/// Lists user tables, skipping SQLite's internal `sqlite_%` tables.
///
/// # Errors
/// Returns a schema error if `sqlite_master` cannot be read.
pub async fn list_tables(pool: &SqlitePool) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| MigrationError::schema_failed("failed to enumerate source tables", e))
}

/// Reads ordered column metadata with `PRAGMA table_info`.
///
/// An unknown table yields an empty list.
///
/// # Errors
/// Returns a schema error if the pragma fails.
pub async fn table_columns(pool: &SqlitePool, table: &str) -> Result<Vec<ColumnInfo>> {
    let query = format!("PRAGMA table_info({})", quote_identifier(table));

    let rows = sqlx::query(&query).fetch_all(pool).await.map_err(|e| {
        MigrationError::schema_failed(
            format!("failed to read source columns for table '{}'", table),
            e,
        )
    })?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row.get_field("name", Some(table))?;
        let declared_type: Option<String> = row.get_field("type", Some(table))?;
        let notnull: i64 = row.get_field("notnull", Some(table))?;
        let pk: i64 = row.get_field("pk", Some(table))?;

        // Primary keys are implicitly NOT NULL even when the pragma says otherwise
        let nullable = notnull == 0 && pk == 0;

        columns.push(ColumnInfo::new(
            name,
            declared_type.unwrap_or_default(),
            nullable,
        ));
    }

    Ok(columns)
}
