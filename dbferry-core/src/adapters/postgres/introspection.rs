//! Table and column discovery for the PostgreSQL target.
//!
//! Catalog names are cast to `text`; `information_schema` exposes them as
//! the `sql_identifier` domain, which does not decode as a Rust `String`.

use crate::Result;
use crate::adapters::helpers::{RowExt, qualified_table};
use crate::error::MigrationError;
use crate::models::ColumnInfo;
use sqlx::PgPool;

/// Lists base tables of `schema` in name order.
///
/// # Errors
/// Returns a schema error if the catalog cannot be read.
pub async fn list_tables(pool: &PgPool, schema: &str) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT table_name::text
        FROM information_schema.tables
        WHERE table_schema = $1
          AND table_type = 'BASE TABLE'
        ORDER BY table_name
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        MigrationError::schema_failed(
            format!("failed to enumerate target tables in schema '{}'", schema),
            e,
        )
    })
}

/// Reads ordered column metadata for `table`.
///
/// The declared type is rendered by `format_type` with its modifier
/// (`character varying(255)`). The cast type is rendered with an explicit
/// `-1` modifier, which yields names that parse back unconstrained (`bpchar`
/// rather than `character`, which means `character(1)`). Dropped and
/// generated columns are excluded since neither accepts inserted values.
///
/// # Errors
/// Returns a schema error if the catalog query fails.
pub async fn table_columns(pool: &PgPool, schema: &str, table: &str) -> Result<Vec<ColumnInfo>> {
    let rows = sqlx::query(
        r#"
        SELECT a.attname::text AS column_name,
               pg_catalog.format_type(a.atttypid, a.atttypmod) AS declared_type,
               pg_catalog.format_type(a.atttypid, -1) AS cast_type,
               NOT a.attnotnull AS nullable
        FROM pg_catalog.pg_attribute a
        JOIN pg_catalog.pg_class c ON c.oid = a.attrelid
        JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
        WHERE n.nspname = $1
          AND c.relname = $2
          AND a.attnum > 0
          AND NOT a.attisdropped
          AND a.attgenerated = ''
        ORDER BY a.attnum
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await
    .map_err(|e| {
        MigrationError::schema_failed(
            format!("failed to read target columns for table '{}'", table),
            e,
        )
    })?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in &rows {
        let name: String = row.get_field("column_name", Some(table))?;
        let declared_type: String = row.get_field("declared_type", Some(table))?;
        let cast_type: String = row.get_field("cast_type", Some(table))?;
        let nullable: bool = row.get_field("nullable", Some(table))?;
        columns.push(ColumnInfo::new(name, declared_type, nullable).with_cast_type(cast_type));
    }

    Ok(columns)
}

/// Counts the rows of `table`.
///
/// # Errors
/// Returns a schema error if the count query fails.
pub async fn count_rows(pool: &PgPool, schema: &str, table: &str) -> Result<u64> {
    let query = format!("SELECT COUNT(*) FROM {}", qualified_table(schema, table));

    let count: i64 = sqlx::query_scalar(&query)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            MigrationError::schema_failed(format!("failed to count rows in table '{}'", table), e)
        })?;

    Ok(u64::try_from(count).unwrap_or(0))
}
