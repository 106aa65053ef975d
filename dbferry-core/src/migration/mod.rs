//! The migration pipeline and its run state machine.
//!
//! # Module Structure
//! - `ordering`: Table processing order from the priority list
//! - `transcode`: Source row to target value conversion
//! - `transfer`: Per-table idempotent copy
//! - `verify`: Row count reconciliation
//! - `rollback`: Total drop of the target's tables
//! - `log`: Persisted record of migrated tables
//!
//! A run walks `Initializing → Introspecting → Ordering → Transferring(i) →
//! Verifying → LogPersisted → CleanedUp`. A connection, schema or write
//! failure in any state diverts to `RollingBack → CleanedUp`. Both stores are
//! closed in `CleanedUp` on every path.

pub mod log;
pub mod ordering;
pub mod rollback;
pub mod transcode;
pub mod transfer;
pub mod verify;

use crate::Result;
use crate::adapters::{self, SourceStore, TargetStore};
use crate::config::{MigrationConfig, MigrationOptions};
use crate::error::MigrationError;
use crate::models::{RunOutcome, RunPhase, RunReport, VerificationResult};
use self::log::MigrationLog;
use self::ordering::DependencyOrderer;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};

/// Drives one migration run over an owned source and target.
pub struct MigrationEngine {
    source: Box<dyn SourceStore>,
    target: Box<dyn TargetStore>,
    options: MigrationOptions,
    orderer: DependencyOrderer,
}

#[derive(Default)]
struct RunState {
    phases: Vec<RunPhase>,
    log: MigrationLog,
    verification: Vec<VerificationResult>,
    log_persisted: bool,
    target_reachable: bool,
}

impl RunState {
    fn enter(&mut self, phase: RunPhase) {
        info!("Phase: {}", phase);
        self.phases.push(phase);
    }
}

impl MigrationEngine {
    /// Creates an engine; the priority list comes from `options`.
    pub fn new(
        source: Box<dyn SourceStore>,
        target: Box<dyn TargetStore>,
        options: MigrationOptions,
    ) -> Self {
        let orderer = DependencyOrderer::new(options.table_priority.clone());
        Self {
            source,
            target,
            options,
            orderer,
        }
    }

    /// Runs the pipeline to completion and releases both stores.
    ///
    /// Failures are folded into the report rather than returned, since a
    /// failed run still has phases, partial entries and rollback results to
    /// report.
    pub async fn run(self) -> RunReport {
        let mut state = RunState::default();

        let outcome = self.execute(&mut state).await;

        let mut report = RunReport {
            outcome: RunOutcome::Success,
            phases: Vec::new(),
            entries: Vec::new(),
            verification: Vec::new(),
            log_persisted: false,
            rolled_back: false,
            dropped_tables: Vec::new(),
            failure: None,
        };

        if let Err(failure) = outcome {
            error!("Migration failed: {}", failure);
            report.outcome = RunOutcome::Failure;

            if !failure.triggers_rollback() {
                debug!("Failure class does not call for rollback");
            } else if !self.options.rollback_on_failure {
                warn!("Rollback disabled; target left as is");
            } else if !state.target_reachable {
                warn!("Target unreachable; no rollback attempted");
            } else {
                state.enter(RunPhase::RollingBack);
                match rollback::drop_all_tables(self.target.as_ref(), &self.options).await {
                    Ok(dropped) => {
                        info!("Rollback dropped {} tables", dropped.len());
                        report.rolled_back = true;
                        report.dropped_tables = dropped;
                    }
                    Err(e) => error!("Rollback failed: {}", e),
                }
            }

            report.failure = Some(failure.to_string());
        }

        self.source.close().await;
        self.target.close().await;
        state.enter(RunPhase::CleanedUp);

        report.phases = state.phases;
        report.entries = state.log.tables;
        report.verification = state.verification;
        report.log_persisted = state.log_persisted;
        report
    }

    async fn execute(&self, state: &mut RunState) -> Result<()> {
        state.enter(RunPhase::Initializing);
        self.target.test_connection().await?;
        state.target_reachable = true;
        self.source.test_connection().await?;

        state.enter(RunPhase::Introspecting);
        let common = self.common_tables().await?;

        state.enter(RunPhase::Ordering);
        let order = self.orderer.order(&common);
        info!("Processing {} tables: {}", order.len(), order.join(", "));

        for (index, table) in order.iter().enumerate() {
            state.enter(RunPhase::Transferring {
                index,
                table: table.clone(),
            });
            if let Some(entry) =
                transfer::transfer_table(self.source.as_ref(), self.target.as_ref(), table).await?
            {
                state.log.record(entry);
            }
        }

        state.enter(RunPhase::Verifying);
        state.verification =
            verify::verify_tables(self.source.as_ref(), self.target.as_ref(), &order).await;
        let warnings = state
            .verification
            .iter()
            .filter(|v| !v.is_consistent())
            .count();
        if warnings > 0 {
            warn!("Verification finished with {} warnings", warnings);
        }

        match state.log.persist(&self.options.log_path).await {
            Ok(()) => {
                info!(
                    "Migration log written to {} ({} rows)",
                    self.options.log_path.display(),
                    state.log.total_rows
                );
                state.log_persisted = true;
            }
            Err(e) => warn!("Migration log not written: {}", e),
        }
        state.enter(RunPhase::LogPersisted);

        Ok(())
    }

    /// Source tables that also exist in the target, in source order, minus
    /// bookkeeping tables.
    async fn common_tables(&self) -> Result<Vec<String>> {
        let source_tables = self.source.list_tables().await?;
        let target_tables: HashSet<String> = self.target.list_tables().await?.into_iter().collect();

        let mut common = Vec::with_capacity(source_tables.len());
        for table in source_tables {
            if self.options.is_bookkeeping(&table) {
                debug!("Skipping bookkeeping table '{}'", table);
            } else if target_tables.contains(&table) {
                common.push(table);
            } else {
                debug!("Skipping '{}': not present in target", table);
            }
        }
        Ok(common)
    }
}

/// Connects both stores from `config` and runs a migration.
///
/// # Errors
/// Returns an error only when no run could start: invalid configuration or
/// an unreachable target. Every later failure is part of the report.
pub async fn run_migration(config: &MigrationConfig) -> Result<RunReport> {
    config.validate()?;

    let target = adapters::open_target(config).await?;
    let source = match adapters::open_source(config).await {
        Ok(source) => source,
        Err(e) => return Ok(fail_before_start(target, &config.options, e).await),
    };

    Ok(MigrationEngine::new(source, target, config.options.clone())
        .run()
        .await)
}

/// Connects to the target and drops every non-bookkeeping table.
///
/// # Errors
/// Returns an error for invalid configuration, an unreachable target or a
/// failed drop.
pub async fn run_rollback(config: &MigrationConfig) -> Result<Vec<String>> {
    if !config.credentials.has_password() {
        return Err(MigrationError::configuration(
            "target password is required (set PG_PASSWORD)",
        ));
    }
    config.target.validate()?;

    let target = adapters::open_target(config).await?;
    let result = rollback::drop_all_tables(target.as_ref(), &config.options).await;
    target.close().await;
    result
}

/// Handles a source that could not be opened once the target is connected.
async fn fail_before_start(
    target: Box<dyn TargetStore>,
    options: &MigrationOptions,
    failure: MigrationError,
) -> RunReport {
    error!("Migration failed: {}", failure);
    let mut phases = vec![RunPhase::Initializing];
    let mut dropped_tables = Vec::new();
    let mut rolled_back = false;

    if options.rollback_on_failure {
        info!("Phase: {}", RunPhase::RollingBack);
        phases.push(RunPhase::RollingBack);
        match rollback::drop_all_tables(target.as_ref(), options).await {
            Ok(dropped) => {
                rolled_back = true;
                dropped_tables = dropped;
            }
            Err(e) => error!("Rollback failed: {}", e),
        }
    }

    target.close().await;
    phases.push(RunPhase::CleanedUp);

    RunReport {
        outcome: RunOutcome::Failure,
        phases,
        entries: Vec::new(),
        verification: Vec::new(),
        log_persisted: false,
        rolled_back,
        dropped_tables,
        failure: Some(failure.to_string()),
    }
}
