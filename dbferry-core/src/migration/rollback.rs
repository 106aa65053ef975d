//! Total rollback of the target store.
//!
//! Rollback does not undo individual inserts. It drops every table in the
//! target's default schema except the schema tool's bookkeeping tables,
//! including tables this run never touched, leaving the target ready for the
//! schema tool to recreate.

use crate::Result;
use crate::adapters::TargetStore;
use crate::config::MigrationOptions;
use tracing::{info, warn};

/// Drops all non-bookkeeping tables and returns their names.
///
/// The catalog cache is refreshed before listing and cleared after the
/// drops, so the listing reflects the live schema.
///
/// # Errors
/// Returns the first failure; tables dropped before it stay dropped.
pub async fn drop_all_tables(
    target: &dyn TargetStore,
    options: &MigrationOptions,
) -> Result<Vec<String>> {
    target.invalidate_catalog();
    let tables = target.list_tables().await?;

    let mut dropped = Vec::new();
    for table in tables {
        if options.is_bookkeeping(&table) {
            continue;
        }
        if let Err(e) = target.drop_table(&table).await {
            warn!(
                "Rollback stopped at '{}' after dropping {} tables",
                table,
                dropped.len()
            );
            target.invalidate_catalog();
            return Err(e);
        }
        info!("Dropped table '{}'", table);
        dropped.push(table);
    }

    target.invalidate_catalog();
    Ok(dropped)
}
