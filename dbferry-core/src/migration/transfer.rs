//! Table-by-table transfer from source to target.

use crate::Result;
use crate::adapters::{SourceStore, TargetStore};
use crate::error::MigrationError;
use crate::migration::transcode::RowTranscoder;
use crate::models::{MigrationLogEntry, TableDescriptor};
use tracing::{debug, info, trace, warn};

/// Copies one table.
///
/// The whole source row set is read into memory, then each row is inserted
/// on its own, in source order, with conflicts ignored by the target.
/// Returns `None` when the table is skipped: the source is empty (the target
/// is not contacted) or the two sides share no column.
///
/// # Errors
/// Any read or insert failure aborts the table; insert errors name the
/// table and the 1-based row position.
pub async fn transfer_table(
    source: &dyn SourceStore,
    target: &dyn TargetStore,
    table: &str,
) -> Result<Option<MigrationLogEntry>> {
    let source_columns = source.columns(table).await?;
    let rows = source.fetch_rows(table).await?;
    if rows.is_empty() {
        debug!("Skipping '{}': no rows in source", table);
        return Ok(None);
    }

    let target_columns = target.columns(table).await?;
    let descriptor = TableDescriptor::new(table, source_columns, target_columns);
    let transcoder = RowTranscoder::new(&descriptor);
    if transcoder.is_empty() {
        warn!("Skipping '{}': no columns shared between source and target", table);
        return Ok(None);
    }

    trace!(
        "Transferring '{}' over columns {:?}",
        table,
        transcoder.column_names()
    );

    let plan = transcoder.plan();
    let mut inserted = 0_u64;
    for (position, row) in rows.iter().enumerate() {
        let values = transcoder.transcode(row);
        let stored = target.insert_ignore(&plan, &values).await.map_err(|e| {
            MigrationError::write_failed(
                format!("row {} of table '{}'", position + 1, table),
                e,
            )
        })?;
        if stored {
            inserted += 1;
        }
    }

    let transferred = rows.len() as u64;
    info!(
        "Migrated '{}': {} rows ({} inserted, {} already present)",
        table,
        transferred,
        inserted,
        transferred - inserted
    );

    Ok(Some(MigrationLogEntry::new(table, transferred, inserted)))
}
