//! Post-transfer row count reconciliation.
//!
//! Verification is advisory: mismatches and failed counts become warnings,
//! never run failures.

use crate::adapters::{SourceStore, TargetStore};
use crate::models::VerificationResult;
use tracing::{debug, warn};

/// Counts every table on both sides and compares.
pub async fn verify_tables(
    source: &dyn SourceStore,
    target: &dyn TargetStore,
    tables: &[String],
) -> Vec<VerificationResult> {
    let mut results = Vec::with_capacity(tables.len());

    for table in tables {
        let counts = match source.count_rows(table).await {
            Ok(source_count) => target
                .count_rows(table)
                .await
                .map(|target_count| (source_count, target_count)),
            Err(e) => Err(e),
        };

        let result = match counts {
            Ok((source_count, target_count)) => {
                if source_count == target_count {
                    debug!("Verified '{}': {} rows", table, source_count);
                } else {
                    warn!(
                        "Row count mismatch for '{}': source={}, target={}",
                        table, source_count, target_count
                    );
                }
                VerificationResult::counted(table.as_str(), source_count, target_count)
            }
            Err(e) => {
                warn!("Could not verify '{}': {}", table, e);
                VerificationResult::unverified(table.as_str())
            }
        };
        results.push(result);
    }

    results
}
