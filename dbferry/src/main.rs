//! SQLite to PostgreSQL data migration tool.
//!
//! This binary copies an existing dataset from a SQLite file into a
//! PostgreSQL database whose schema was already created, then reconciles
//! row counts between the two stores.
//!
//! # Security Guarantees
//! - The SQLite source is opened read-only
//! - The target password is read from the environment and never logged

use anyhow::Context;
use clap::Parser;
use dbferry::{Cli, Command, render_summary};
use dbferry_core::logging::init_logging;
use dbferry_core::{MigrationConfig, run_migration, run_rollback};
use std::process::ExitCode;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Dispatches the selected command. Returns whether the run succeeded.
async fn run(cli: &Cli) -> anyhow::Result<bool> {
    let config = cli.to_config();

    match &cli.command {
        Command::Migrate(_) => migrate(&config).await,
        Command::Rollback => rollback(&config).await,
    }
}

async fn migrate(config: &MigrationConfig) -> anyhow::Result<bool> {
    info!(
        "Migrating {} source {} into {}",
        config.source.environment,
        config.source.path().display(),
        config.target
    );

    let report = run_migration(config)
        .await
        .context("Migration could not start")?;

    if !report.log_persisted {
        warn!(
            "Migration log was not written to {}",
            config.options.log_path.display()
        );
    }

    for line in render_summary(&report).lines() {
        if report.is_success() {
            info!("{}", line);
        } else {
            error!("{}", line);
        }
    }

    Ok(report.is_success())
}

async fn rollback(config: &MigrationConfig) -> anyhow::Result<bool> {
    info!("Dropping all tables in {}", config.target);

    let dropped = run_rollback(config).await.context("Rollback failed")?;

    info!("Rollback complete: dropped {} tables", dropped.len());
    Ok(true)
}
