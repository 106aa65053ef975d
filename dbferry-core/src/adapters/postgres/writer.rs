//! Row inserts and table drops against the target.
//!
//! Values are bound as text and cast to each column's unconstrained type;
//! length and precision modifiers are enforced when the value is assigned to
//! the column, so an over-long value fails instead of being truncated.

use crate::Result;
use crate::adapters::helpers::{qualified_table, quote_identifier};
use crate::error::MigrationError;
use crate::migration::transcode::InsertPlan;
use crate::models::CellValue;
use sqlx::PgPool;
use tracing::trace;

/// Builds `INSERT ... ON CONFLICT DO NOTHING` for a write plan.
///
/// ```rust,ignore
/// INSERT INTO "public"."users" ("id", "name") VALUES ($1::integer, $2::character varying) ON CONFLICT DO NOTHING
/// ```
pub fn build_insert_sql(schema: &str, plan: &InsertPlan) -> String {
    let columns = plan
        .columns
        .iter()
        .map(|c| quote_identifier(&c.name))
        .collect::<Vec<_>>()
        .join(", ");

    let placeholders = plan
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("${}::{}", i + 1, c.cast_type()))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT DO NOTHING",
        qualified_table(schema, &plan.table),
        columns,
        placeholders
    )
}

/// Inserts one row; a uniqueness conflict leaves the existing row in place.
///
/// Returns whether the row was stored.
///
/// # Errors
/// Returns a write error when the statement fails (type cast, foreign key,
/// NOT NULL, ...).
pub async fn insert_ignore(
    pool: &PgPool,
    schema: &str,
    plan: &InsertPlan,
    values: &[CellValue],
) -> Result<bool> {
    if values.len() != plan.columns.len() {
        return Err(MigrationError::configuration(format!(
            "table '{}': {} values for {} columns",
            plan.table,
            values.len(),
            plan.columns.len()
        )));
    }

    let sql = build_insert_sql(schema, plan);
    let mut query = sqlx::query(&sql);
    for value in values {
        query = query.bind(value.to_pg_text());
    }

    let result = query.execute(pool).await.map_err(|e| {
        MigrationError::write_failed(format!("insert into table '{}' failed", plan.table), e)
    })?;

    let inserted = result.rows_affected() == 1;
    if !inserted {
        trace!("Row already present in '{}', ignored", plan.table);
    }
    Ok(inserted)
}

/// Drops `table` and every object depending on it.
///
/// # Errors
/// Returns a write error if the statement fails.
pub async fn drop_table(pool: &PgPool, schema: &str, table: &str) -> Result<()> {
    let sql = format!(
        "DROP TABLE IF EXISTS {} CASCADE",
        qualified_table(schema, table)
    );

    sqlx::query(&sql)
        .execute(pool)
        .await
        .map_err(|e| MigrationError::write_failed(format!("failed to drop table '{}'", table), e))?;

    Ok(())
}
