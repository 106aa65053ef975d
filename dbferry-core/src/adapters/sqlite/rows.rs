//! Full-table reads from the SQLite source.
//!
//! Each value is decoded by its runtime storage class rather than the
//! declared column type; SQLite lets any column hold any class.

use crate::Result;
use crate::adapters::helpers::quote_identifier;
use crate::error::MigrationError;
use crate::models::{CellValue, RowRecord};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef};
use tracing::trace;

/// Reads every row of `table` in enumeration order.
///
/// # Errors
/// Returns a schema error if the table cannot be read or a value cannot be
/// decoded.
pub async fn fetch_all_rows(pool: &SqlitePool, table: &str) -> Result<Vec<RowRecord>> {
    let query = format!("SELECT * FROM {}", quote_identifier(table));

    let rows = sqlx::query(&query).fetch_all(pool).await.map_err(|e| {
        MigrationError::schema_failed(format!("failed to read rows from table '{}'", table), e)
    })?;

    trace!("Read {} rows from source table '{}'", rows.len(), table);

    rows.iter().map(|row| row_to_record(row, table)).collect()
}

/// Counts the rows of `table`.
///
/// # Errors
/// Returns a schema error if the count query fails.
pub async fn count_rows(pool: &SqlitePool, table: &str) -> Result<u64> {
    let query = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));

    let count: i64 = sqlx::query_scalar(&query)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            MigrationError::schema_failed(format!("failed to count rows in table '{}'", table), e)
        })?;

    Ok(u64::try_from(count).unwrap_or(0))
}

/// Converts a row into a name-keyed record.
pub(crate) fn row_to_record(row: &SqliteRow, table: &str) -> Result<RowRecord> {
    let mut record = RowRecord::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = decode_cell(row, index).map_err(|e| {
            MigrationError::schema_failed(
                format!(
                    "failed to decode column '{}' of table '{}'",
                    column.name(),
                    table
                ),
                e,
            )
        })?;
        record.values.insert(column.name().to_string(), value);
    }
    Ok(record)
}

fn decode_cell(row: &SqliteRow, index: usize) -> std::result::Result<CellValue, sqlx::Error> {
    let storage_class = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(CellValue::Null);
        }
        raw.type_info().name().to_ascii_uppercase()
    };

    match storage_class.as_str() {
        "INTEGER" => row.try_get::<i64, _>(index).map(CellValue::Integer),
        "REAL" => row.try_get::<f64, _>(index).map(CellValue::Real),
        "TEXT" => row.try_get::<String, _>(index).map(CellValue::Text),
        "BLOB" => row.try_get::<Vec<u8>, _>(index).map(CellValue::Blob),
        _ => {
            // Unknown class: try each representation in turn
            if let Ok(i) = row.try_get::<i64, _>(index) {
                Ok(CellValue::Integer(i))
            } else if let Ok(f) = row.try_get::<f64, _>(index) {
                Ok(CellValue::Real(f))
            } else if let Ok(s) = row.try_get::<String, _>(index) {
                Ok(CellValue::Text(s))
            } else {
                row.try_get::<Vec<u8>, _>(index).map(CellValue::Blob)
            }
        }
    }
}
