//! Source store selection.
//!
//! The SQLite file differs between development and production deployments;
//! an explicit environment flag picks which path is opened.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Deployment environment selecting the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    /// Local development dataset
    #[default]
    Development,
    /// Production dataset
    Production,
}

impl std::fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppEnvironment::Development => write!(f, "development"),
            AppEnvironment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for AppEnvironment {
    type Err = crate::error::MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnvironment::Development),
            "production" | "prod" => Ok(AppEnvironment::Production),
            other => Err(crate::error::MigrationError::configuration(format!(
                "unknown environment '{}': expected development or production",
                other
            ))),
        }
    }
}

/// Paths to the SQLite source for each environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Which of the two paths is opened
    pub environment: AppEnvironment,
    /// File opened in development
    pub development_path: PathBuf,
    /// File opened in production
    pub production_path: PathBuf,
}

impl SourceConfig {
    /// Creates a source configuration.
    pub fn new(
        environment: AppEnvironment,
        development_path: PathBuf,
        production_path: PathBuf,
    ) -> Self {
        Self {
            environment,
            development_path,
            production_path,
        }
    }

    /// The file selected by the environment flag.
    pub fn path(&self) -> &Path {
        match self.environment {
            AppEnvironment::Development => &self.development_path,
            AppEnvironment::Production => &self.production_path,
        }
    }

    /// Validates that the selected path is usable.
    ///
    /// # Errors
    /// Returns a configuration error when the selected path is empty.
    pub fn validate(&self) -> crate::Result<()> {
        if self.path().as_os_str().is_empty() {
            return Err(crate::error::MigrationError::configuration(format!(
                "no SQLite path configured for the {} environment",
                self.environment
            )));
        }
        Ok(())
    }
}
