//! Library module for dbferry
//!
//! This module exposes the command-line surface for testing purposes.
//! The main binary functionality is in main.rs.

use clap::{Args, Parser, Subcommand};
use dbferry_core::config::{DEFAULT_LOG_PATH, MigrationOptions};
use dbferry_core::{
    AppEnvironment, ConnectionConfig, Credentials, MigrationConfig, RunReport, SourceConfig,
};
use std::fmt::Write;
use std::path::PathBuf;

/// CLI argument structure
#[derive(Debug, Parser)]
#[command(name = "dbferry")]
#[command(about = "Migrate a SQLite dataset into a pre-created PostgreSQL schema")]
#[command(version)]
#[command(long_about = "
dbferry - SQLite to PostgreSQL data migration

Copies every table present in both stores, in dependency order, with
idempotent inserts (INSERT ... ON CONFLICT DO NOTHING). Re-running a
migration never duplicates rows. Row counts are reconciled afterwards.

On failure all tables in the target schema are dropped (except the schema
tool's bookkeeping tables) unless --no-rollback is given.

EXAMPLES:
  PG_PASSWORD=secret dbferry migrate
  APP_ENV=production PG_PASSWORD=secret dbferry migrate --log-path out/log.json
  PG_PASSWORD=secret dbferry rollback
")]
pub struct Cli {
    /// Verbosity flags
    #[command(flatten)]
    pub global: GlobalArgs,

    /// PostgreSQL connection settings
    #[command(flatten)]
    pub target: TargetArgs,

    /// SQLite source selection
    #[command(flatten)]
    pub source: SourceArgs,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Copy all shared tables from SQLite into PostgreSQL
    Migrate(MigrateArgs),
    /// Drop every table in the target schema except bookkeeping tables
    Rollback,
}

/// Options for the `migrate` command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Where the migration log is written
    #[arg(long, env = "MIGRATION_LOG_PATH", default_value = DEFAULT_LOG_PATH)]
    pub log_path: PathBuf,

    /// Tables migrated first, in this order (comma-separated)
    #[arg(long, env = "MIGRATION_TABLE_PRIORITY", value_delimiter = ',')]
    pub table_priority: Vec<String>,

    /// Leave the target as is when the migration fails
    #[arg(long)]
    pub no_rollback: bool,
}

/// PostgreSQL connection settings
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// PostgreSQL host
    #[arg(long, env = "PG_HOST", default_value = "localhost", global = true)]
    pub pg_host: String,

    /// PostgreSQL port
    #[arg(long, env = "PG_PORT", default_value_t = 5432, global = true)]
    pub pg_port: u16,

    /// Target database name
    #[arg(long, env = "PG_DATABASE", default_value = "app", global = true)]
    pub pg_database: String,

    /// PostgreSQL user
    #[arg(long, env = "PG_USER", default_value = "postgres", global = true)]
    pub pg_user: String,

    /// Required; read from the environment to keep it out of shell history
    #[arg(long, env = "PG_PASSWORD", hide_env_values = true, global = true)]
    pub pg_password: Option<String>,
}

/// SQLite source selection
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Deployment environment selecting the SQLite file
    #[arg(
        long = "env",
        env = "APP_ENV",
        default_value = "development",
        global = true
    )]
    pub environment: AppEnvironment,

    /// SQLite file used in development
    #[arg(
        long,
        env = "SQLITE_DEV_PATH",
        default_value = "./data/app.dev.sqlite3",
        global = true
    )]
    pub sqlite_dev_path: PathBuf,

    /// SQLite file used in production
    #[arg(
        long,
        env = "SQLITE_PROD_PATH",
        default_value = "./data/app.sqlite3",
        global = true
    )]
    pub sqlite_prod_path: PathBuf,
}

/// Output verbosity flags shared by every command
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase verbosity (-v, -vv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(
        short,
        long,
        global = true,
        help = "Suppress all output except errors"
    )]
    pub quiet: bool,
}

impl Cli {
    /// Assembles the run configuration from parsed arguments.
    ///
    /// Validation is left to the run itself so a missing password surfaces
    /// as a configuration error naming `PG_PASSWORD`.
    pub fn to_config(&self) -> MigrationConfig {
        let target = ConnectionConfig::new(self.target.pg_host.clone())
            .with_port(self.target.pg_port)
            .with_database(self.target.pg_database.clone());

        let credentials = Credentials::new(
            self.target.pg_user.clone(),
            self.target.pg_password.clone().unwrap_or_default(),
        );

        let source = SourceConfig::new(
            self.source.environment,
            self.source.sqlite_dev_path.clone(),
            self.source.sqlite_prod_path.clone(),
        );

        let mut options = MigrationOptions::default();
        if let Command::Migrate(args) = &self.command {
            options = options
                .with_log_path(args.log_path.clone())
                .with_rollback_on_failure(!args.no_rollback);
            let priority: Vec<String> = args
                .table_priority
                .iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            if !priority.is_empty() {
                options = options.with_table_priority(priority);
            }
        }

        MigrationConfig::new(source, target, credentials, options)
    }
}

/// Renders the end-of-run summary printed after a migration.
pub fn render_summary(report: &RunReport) -> String {
    let mut out = String::new();

    for entry in &report.entries {
        let _ = writeln!(
            out,
            "  {:<24} {:>8} rows  ({} inserted)",
            entry.table, entry.rows_transferred, entry.rows_inserted
        );
    }

    for warning in report.warnings() {
        let _ = match warning.counts {
            Some(counts) => writeln!(
                out,
                "  WARNING {}: source has {} rows, target has {}",
                warning.table, counts.source_count, counts.target_count
            ),
            None => writeln!(out, "  WARNING {}: row counts unavailable", warning.table),
        };
    }

    if report.is_success() {
        let _ = write!(
            out,
            "Migration complete: {} tables, {} rows",
            report.entries.len(),
            report.total_rows()
        );
    } else {
        let _ = write!(
            out,
            "Migration failed: {}",
            report.failure.as_deref().unwrap_or("unknown error")
        );
        if report.rolled_back {
            let _ = write!(
                out,
                "\nRolled back: dropped {} tables",
                report.dropped_tables.len()
            );
        }
    }

    out
}
