//! Core data models for a migration run.
//!
//! These types describe what flows between the engine components: column
//! metadata discovered on each side, rows read from the source, and the
//! records a run produces (log entries, verification results, phases).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column metadata as reported by a store's catalog.
///
/// `declared_type` is engine-specific (`BOOLEAN`, `TEXT`, `jsonb`,
/// `timestamp with time zone`, ...). On the source side it drives value
/// coercion; on the target side it supplies parameter casts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name as stored in the catalog
    pub name: String,
    /// Declared type including any modifier (`character varying(255)`)
    pub declared_type: String,
    /// Whether the column accepts NULL
    pub nullable: bool,
    /// Type used to cast bound parameters, without length or precision
    /// modifiers; `None` falls back to `declared_type`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast_type: Option<String>,
}

impl ColumnInfo {
    /// Creates column metadata.
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            nullable,
            cast_type: None,
        }
    }

    /// Builder method to set the parameter cast type.
    pub fn with_cast_type(mut self, cast_type: impl Into<String>) -> Self {
        self.cast_type = Some(cast_type.into());
        self
    }

    /// The type a bound text parameter is cast to before assignment.
    ///
    /// Casting explicitly to `varchar(n)`, `char(n)` or `bit(n)` truncates
    /// silently, so the cast must omit the modifier and leave the length
    /// check to assignment into the column.
    pub fn cast_type(&self) -> &str {
        self.cast_type.as_deref().unwrap_or(&self.declared_type)
    }

    /// Whether the declared type marks this column as boolean-like.
    ///
    /// SQLite has no boolean storage class, so the declared type is the only
    /// hint that a stored 0/1 was meant as a flag.
    pub fn is_boolean_like(&self) -> bool {
        self.declared_type.to_ascii_lowercase().contains("boolean")
    }
}

/// A column present on both sides, paired with each side's metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedColumn<'a> {
    /// Source metadata; its declared type drives coercion
    pub source: &'a ColumnInfo,
    /// Target metadata; its cast type drives the insert
    pub target: &'a ColumnInfo,
}

/// Per-table view of both column sets, derived transiently during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    /// Table name, identical in both stores
    pub name: String,
    /// Columns reported by the source, in declaration order
    pub source_columns: Vec<ColumnInfo>,
    /// Columns reported by the target, in attribute order
    pub target_columns: Vec<ColumnInfo>,
}

impl TableDescriptor {
    /// Creates a descriptor from both column sets.
    pub fn new(
        name: impl Into<String>,
        source_columns: Vec<ColumnInfo>,
        target_columns: Vec<ColumnInfo>,
    ) -> Self {
        Self {
            name: name.into(),
            source_columns,
            target_columns,
        }
    }

    /// Columns present in both stores, in source column order.
    pub fn shared_columns(&self) -> Vec<SharedColumn<'_>> {
        self.source_columns
            .iter()
            .filter_map(|source| {
                self.target_columns
                    .iter()
                    .find(|target| target.name == source.name)
                    .map(|target| SharedColumn { source, target })
            })
            .collect()
    }
}

/// A dynamically typed cell value.
///
/// Mirrors SQLite's storage classes plus `Bool` and `Json`, which only
/// appear after transcoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// SQL NULL
    Null,
    /// A flag restored from a 0/1 integer
    Bool(bool),
    /// SQLite `INTEGER` storage class
    Integer(i64),
    /// SQLite `REAL` storage class
    Real(f64),
    /// SQLite `TEXT` storage class
    Text(String),
    /// SQLite `BLOB` storage class
    Blob(Vec<u8>),
    /// Text that parsed as a JSON object or array
    Json(serde_json::Value),
}

impl CellValue {
    /// Renders the value in PostgreSQL's text input format.
    ///
    /// The target casts each parameter to its declared column type, so text
    /// is the common currency (`'1'::integer`, `'true'::boolean`,
    /// `'{"a":1}'::jsonb`, `'\x00ff'::bytea`). `None` is SQL NULL.
    pub fn to_pg_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Integer(i) => Some(i.to_string()),
            CellValue::Real(f) => Some(f.to_string()),
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Blob(bytes) => {
                use std::fmt::Write;

                let mut hex = String::with_capacity(bytes.len() * 2 + 2);
                hex.push_str("\\x");
                for byte in bytes {
                    let _ = write!(hex, "{:02x}", byte);
                }
                Some(hex)
            }
            CellValue::Json(value) => Some(value.to_string()),
        }
    }
}

/// One source row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    /// Values keyed by column name
    pub values: HashMap<String, CellValue>,
}

impl RowRecord {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion used when decoding rows and in tests.
    pub fn with(mut self, column: impl Into<String>, value: CellValue) -> Self {
        self.values.insert(column.into(), value);
        self
    }

    /// Looks up a column value; absent columns read as `None`.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.values.get(column)
    }
}

/// One migrated table, appended to the migration log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationLogEntry {
    /// Migrated table
    pub table: String,
    /// Source rows processed for the table
    pub rows_transferred: u64,
    /// Rows the target accepted; conflicts ignored by the target are excluded
    pub rows_inserted: u64,
    /// When the table finished transferring
    pub timestamp: DateTime<Utc>,
}

impl MigrationLogEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(table: impl Into<String>, rows_transferred: u64, rows_inserted: u64) -> Self {
        Self {
            table: table.into(),
            rows_transferred,
            rows_inserted,
            timestamp: Utc::now(),
        }
    }
}

/// Row counts for one table on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountPair {
    /// Rows in the source table
    pub source_count: u64,
    /// Rows in the target table after the transfer
    pub target_count: u64,
}

/// Outcome of independently counting one table on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Verified table
    pub table: String,
    /// `None` when a count query failed; the table is then unverified
    pub counts: Option<CountPair>,
}

impl VerificationResult {
    /// Creates a result for a table that was counted on both sides.
    pub fn counted(table: impl Into<String>, source_count: u64, target_count: u64) -> Self {
        Self {
            table: table.into(),
            counts: Some(CountPair {
                source_count,
                target_count,
            }),
        }
    }

    /// Creates a result for a table whose counts could not be obtained.
    pub fn unverified(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            counts: None,
        }
    }

    /// True when both counts were obtained and agree.
    pub fn is_consistent(&self) -> bool {
        self.counts
            .is_some_and(|c| c.source_count == c.target_count)
    }

    /// Source count minus target count; positive means rows are missing.
    pub fn difference(&self) -> Option<i128> {
        self.counts
            .map(|c| i128::from(c.source_count) - i128::from(c.target_count))
    }
}

/// States of a migration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum RunPhase {
    /// Both stores are being reached
    Initializing,
    /// Table listings are read and intersected
    Introspecting,
    /// The processing order is computed
    Ordering,
    /// One table is being copied
    Transferring {
        /// Position in the processing order, starting at 0
        index: usize,
        /// Table being copied
        table: String,
    },
    /// Row counts are reconciled
    Verifying,
    /// The migration log write was attempted
    LogPersisted,
    /// Target tables are being dropped after a failure
    RollingBack,
    /// Both stores are closed
    CleanedUp,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunPhase::Initializing => write!(f, "initializing"),
            RunPhase::Introspecting => write!(f, "introspecting"),
            RunPhase::Ordering => write!(f, "ordering"),
            RunPhase::Transferring { index, table } => {
                write!(f, "transferring[{}] {}", index, table)
            }
            RunPhase::Verifying => write!(f, "verifying"),
            RunPhase::LogPersisted => write!(f, "log persisted"),
            RunPhase::RollingBack => write!(f, "rolling back"),
            RunPhase::CleanedUp => write!(f, "cleaned up"),
        }
    }
}

/// Terminal outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every table transferred; warnings may still be present
    Success,
    /// The run aborted
    Failure,
}

/// Everything a run produced, returned to the caller after `CleanedUp`.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// How the run ended
    pub outcome: RunOutcome,
    /// Every phase entered, in order
    pub phases: Vec<RunPhase>,
    /// One entry per non-empty table that finished transferring
    pub entries: Vec<MigrationLogEntry>,
    /// Count reconciliation per common table; empty if the run failed first
    pub verification: Vec<VerificationResult>,
    /// Whether the migration log reached disk
    pub log_persisted: bool,
    /// Whether a rollback ran to completion
    pub rolled_back: bool,
    /// Tables dropped by the rollback
    pub dropped_tables: Vec<String>,
    /// The error that aborted the run
    pub failure: Option<String>,
}

impl RunReport {
    /// True when the run reached `LogPersisted` without failing.
    pub fn is_success(&self) -> bool {
        self.outcome == RunOutcome::Success
    }

    /// Verification results whose counts disagree or could not be obtained.
    pub fn warnings(&self) -> impl Iterator<Item = &VerificationResult> {
        self.verification.iter().filter(|v| !v.is_consistent())
    }

    /// Sum of source rows processed across all logged tables.
    pub fn total_rows(&self) -> u64 {
        self.entries.iter().map(|e| e.rows_transferred).sum()
    }
}

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
