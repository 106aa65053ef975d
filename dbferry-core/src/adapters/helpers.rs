//! Helper utilities shared by the store adapters.

use crate::{Result, error::MigrationError};
use sqlx::Row;
use sqlx::postgres::PgRow;
use sqlx::sqlite::SqliteRow;

/// Quotes an identifier for interpolation into SQL.
///
/// Both engines accept double-quoted identifiers with embedded quotes
/// doubled, so one function serves both sides.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quotes a schema-qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_identifier(schema), quote_identifier(table))
}

/// Extension trait for extracting typed values from catalog rows
/// with consistent error handling.
///
/// # Example
/// ```rust,ignore
/// use dbferry_core::adapters::helpers::RowExt;
///
/// let name: String = row.get_field("name", Some("users"))?;
/// ```
pub trait RowExt {
    /// Database the row belongs to.
    type Db: sqlx::Database;

    /// Extracts a typed field from the row, naming the table on failure.
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, Self::Db> + sqlx::Type<Self::Db>;
}

impl RowExt for PgRow {
    type Db = sqlx::Postgres;

    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, Self::Db> + sqlx::Type<Self::Db>,
    {
        self.try_get(field_name)
            .map_err(|e| field_error(field_name, table_context, e))
    }
}

impl RowExt for SqliteRow {
    type Db = sqlx::Sqlite;

    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, Self::Db> + sqlx::Type<Self::Db>,
    {
        self.try_get(field_name)
            .map_err(|e| field_error(field_name, table_context, e))
    }
}

fn field_error(field_name: &str, table_context: Option<&str>, error: sqlx::Error) -> MigrationError {
    let context = match table_context {
        Some(table) => format!("failed to read field '{}' for table '{}'", field_name, table),
        None => format!("failed to read field '{}'", field_name),
    };
    MigrationError::schema_failed(context, error)
}
