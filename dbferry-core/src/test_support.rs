//! Shared fixtures for unit tests: an in-memory SQLite source and an
//! in-memory target that enforces primary keys like PostgreSQL would.

use crate::Result;
use crate::adapters::{SqliteSource, TargetStore};
use crate::error::MigrationError;
use crate::migration::transcode::InsertPlan;
use crate::models::{CellValue, ColumnInfo, RowRecord};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

/// Opens an in-memory SQLite database and runs `statements` against it.
pub(crate) async fn memory_source(statements: &[&str]) -> SqliteSource {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory SQLite");

    for statement in statements {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .unwrap_or_else(|e| panic!("fixture statement failed: {statement}: {e}"));
    }

    SqliteSource::from_pool(pool)
}

#[derive(Debug, Default)]
struct MemoryTable {
    columns: Vec<ColumnInfo>,
    key: Vec<String>,
    rows: Vec<RowRecord>,
    insert_attempts: usize,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: BTreeMap<String, MemoryTable>,
    unreachable: bool,
    failing_list: bool,
    failing_drops: HashSet<String>,
    failing_insert: Option<(String, usize)>,
    invalidations: usize,
    closed: bool,
}

/// Target store double; clones share state so tests can inspect the target
/// after handing it to the engine.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryTarget {
    state: Arc<Mutex<MemoryState>>,
}

fn simulated(message: &str) -> std::io::Error {
    std::io::Error::other(message.to_string())
}

impl MemoryTarget {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a table with `(name, declared_type)` columns and a primary key.
    pub(crate) fn with_table(self, name: &str, columns: &[(&str, &str)], key: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.tables.insert(
                name.to_string(),
                MemoryTable {
                    columns: columns
                        .iter()
                        .map(|(n, t)| ColumnInfo::new(*n, *t, !key.contains(n)))
                        .collect(),
                    key: key.iter().map(|k| (*k).to_string()).collect(),
                    ..Default::default()
                },
            );
        }
        self
    }

    /// Makes `test_connection` fail.
    pub(crate) fn unreachable(self) -> Self {
        self.state.lock().unwrap().unreachable = true;
        self
    }

    /// Makes `list_tables` fail.
    pub(crate) fn failing_list(self) -> Self {
        self.state.lock().unwrap().failing_list = true;
        self
    }

    /// Makes dropping `table` fail.
    pub(crate) fn failing_drop(self, table: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_drops
            .insert(table.to_string());
        self
    }

    /// Makes the `attempt`-th insert (1-based) into `table` fail.
    pub(crate) fn failing_insert(self, table: &str, attempt: usize) -> Self {
        self.state.lock().unwrap().failing_insert = Some((table.to_string(), attempt));
        self
    }

    /// Appends `count` placeholder rows, bypassing key checks.
    pub(crate) fn seed(&self, table: &str, count: usize) {
        let mut state = self.state.lock().unwrap();
        let entry = state.tables.get_mut(table).expect("seeded table exists");
        entry
            .rows
            .extend(std::iter::repeat_with(RowRecord::new).take(count));
    }

    pub(crate) fn rows(&self, table: &str) -> Vec<RowRecord> {
        self.state
            .lock()
            .unwrap()
            .tables
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    pub(crate) fn table_names(&self) -> Vec<String> {
        self.state.lock().unwrap().tables.keys().cloned().collect()
    }

    pub(crate) fn invalidations(&self) -> usize {
        self.state.lock().unwrap().invalidations
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }
}

#[async_trait]
impl TargetStore for MemoryTarget {
    async fn test_connection(&self) -> Result<()> {
        if self.state.lock().unwrap().unreachable {
            return Err(MigrationError::connection_failed(
                "memory target unreachable",
                simulated("connection refused"),
            ));
        }
        Ok(())
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        if state.failing_list {
            return Err(MigrationError::schema_failed(
                "failed to enumerate target tables",
                simulated("permission denied"),
            ));
        }
        Ok(state.tables.keys().cloned().collect())
    }

    async fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let state = self.state.lock().unwrap();
        state
            .tables
            .get(table)
            .map(|t| t.columns.clone())
            .ok_or_else(|| {
                MigrationError::schema_failed(
                    format!("failed to read target columns for table '{}'", table),
                    simulated("no such table"),
                )
            })
    }

    async fn insert_ignore(&self, plan: &InsertPlan, values: &[CellValue]) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let failing_insert = state.failing_insert.clone();
        let entry = state.tables.get_mut(&plan.table).ok_or_else(|| {
            MigrationError::write_failed(
                format!("insert into table '{}' failed", plan.table),
                simulated("relation does not exist"),
            )
        })?;

        entry.insert_attempts += 1;
        if failing_insert.is_some_and(|(t, n)| t == plan.table && n == entry.insert_attempts) {
            return Err(MigrationError::write_failed(
                format!("insert into table '{}' failed", plan.table),
                simulated("violates foreign key constraint"),
            ));
        }

        let mut record = RowRecord::new();
        for column in &entry.columns {
            let value = plan
                .columns
                .iter()
                .position(|c| c.name == column.name)
                .and_then(|i| values.get(i).cloned())
                .unwrap_or(CellValue::Null);
            record.values.insert(column.name.clone(), value);
        }

        let key = &entry.key;
        let conflict = !key.is_empty()
            && entry
                .rows
                .iter()
                .any(|existing| key.iter().all(|k| existing.get(k) == record.get(k)));
        if conflict {
            return Ok(false);
        }

        entry.rows.push(record);
        Ok(true)
    }

    async fn count_rows(&self, table: &str) -> Result<u64> {
        let state = self.state.lock().unwrap();
        state
            .tables
            .get(table)
            .map(|t| t.rows.len() as u64)
            .ok_or_else(|| {
                MigrationError::schema_failed(
                    format!("failed to count rows in table '{}'", table),
                    simulated("no such table"),
                )
            })
    }

    async fn drop_table(&self, table: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.failing_drops.contains(table) {
            return Err(MigrationError::write_failed(
                format!("failed to drop table '{}'", table),
                simulated("lock timeout"),
            ));
        }
        state.tables.remove(table);
        Ok(())
    }

    fn invalidate_catalog(&self) {
        self.state.lock().unwrap().invalidations += 1;
    }

    async fn close(&self) {
        self.state.lock().unwrap().closed = true;
    }
}
