//! Durable record of a migration run.
//!
//! Entries accumulate in memory and are written once, at the end of a
//! successful run, replacing whatever the previous run left behind.

use crate::Result;
use crate::error::MigrationError;
use crate::models::MigrationLogEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The persisted migration log document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationLog {
    /// Identifies the run that wrote the log
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Set when the log is persisted
    pub finished_at: Option<DateTime<Utc>>,
    /// One entry per migrated table, in processing order
    pub tables: Vec<MigrationLogEntry>,
    /// Sum of `rows_transferred` over `tables`
    pub total_rows: u64,
}

impl Default for MigrationLog {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationLog {
    /// Starts an empty log for a new run.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            tables: Vec::new(),
            total_rows: 0,
        }
    }

    /// Appends the entry for one migrated table.
    pub fn record(&mut self, entry: MigrationLogEntry) {
        self.total_rows = self.total_rows.saturating_add(entry.rows_transferred);
        self.tables.push(entry);
    }

    /// Entries in the order tables were migrated.
    pub fn entries(&self) -> &[MigrationLogEntry] {
        &self.tables
    }

    /// Stamps the finish time and writes the log as pretty JSON.
    ///
    /// The document goes to a sibling temporary file first and is renamed
    /// into place, so readers never observe a half-written log.
    ///
    /// # Errors
    /// Returns a serialization or I/O error; callers treat both as warnings.
    pub async fn persist(&mut self, path: &Path) -> Result<()> {
        self.finished_at = Some(Utc::now());

        let json = serde_json::to_string_pretty(self).map_err(|e| {
            MigrationError::Serialization {
                context: "failed to serialize migration log".to_string(),
                source: e,
            }
        })?;

        let staging = staging_path(path);
        tokio::fs::write(&staging, json.as_bytes())
            .await
            .map_err(|e| MigrationError::Io {
                context: format!("failed to write {}", staging.display()),
                source: e,
            })?;

        tokio::fs::rename(&staging, path)
            .await
            .map_err(|e| MigrationError::Io {
                context: format!("failed to move migration log into {}", path.display()),
                source: e,
            })
    }

    /// Reads a previously persisted log.
    ///
    /// # Errors
    /// Returns an I/O error if the file cannot be read and a serialization
    /// error if it is not a migration log.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| MigrationError::Io {
                context: format!("failed to read {}", path.display()),
                source: e,
            })?;

        serde_json::from_str(&content).map_err(|e| MigrationError::Serialization {
            context: format!("{} is not a migration log", path.display()),
            source: e,
        })
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "migration-log.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_record_accumulates_total() {
        let mut log = MigrationLog::new();
        log.record(MigrationLogEntry::new("users", 3, 3));
        log.record(MigrationLogEntry::new("posts", 7, 0));

        assert_eq!(log.total_rows, 10);
        assert_eq!(log.entries().len(), 2);
        assert_eq!(log.entries()[1].table, "posts");
    }

    #[tokio::test]
    async fn test_persist_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("migration-log.json");

        let mut log = MigrationLog::new();
        log.record(MigrationLogEntry::new("users", 2, 2));
        log.persist(&path).await.unwrap();

        let loaded = MigrationLog::load(&path).await.unwrap();
        assert_eq!(loaded, log);
        assert!(loaded.finished_at.is_some());
        assert!(!staging_path(&path).exists());
    }

    #[tokio::test]
    async fn test_persist_overwrites_previous_run() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("migration-log.json");

        let mut first = MigrationLog::new();
        first.record(MigrationLogEntry::new("users", 5, 5));
        first.persist(&path).await.unwrap();

        let mut second = MigrationLog::new();
        second.persist(&path).await.unwrap();

        let loaded = MigrationLog::load(&path).await.unwrap();
        assert_eq!(loaded.run_id, second.run_id);
        assert!(loaded.tables.is_empty());
        assert_eq!(loaded.total_rows, 0);
    }

    #[tokio::test]
    async fn test_persisted_document_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("log.json");

        let mut log = MigrationLog::new();
        log.record(MigrationLogEntry::new("users", 1, 1));
        log.persist(&path).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["total_rows"], 1);
        assert_eq!(raw["tables"][0]["table"], "users");
        assert_eq!(raw["tables"][0]["rows_transferred"], 1);
        assert!(raw["run_id"].is_string());
    }

    #[tokio::test]
    async fn test_persist_to_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("log.json");

        let error = MigrationLog::new().persist(&path).await.unwrap_err();
        assert!(matches!(error, MigrationError::Io { .. }));
        assert!(!error.triggers_rollback());
    }

    #[tokio::test]
    async fn test_load_rejects_foreign_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("other.json");
        std::fs::write(&path, "{\"hello\": 1}").unwrap();

        let error = MigrationLog::load(&path).await.unwrap_err();
        assert!(matches!(error, MigrationError::Serialization { .. }));
    }

    #[test]
    fn test_staging_path_is_sibling() {
        let staging = staging_path(Path::new("out/migration-log.json"));
        assert_eq!(staging, PathBuf::from("out/migration-log.json.tmp"));
    }
}
