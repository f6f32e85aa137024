//! Configuration file handling
//!
//! The config file is optional JSON. Every field has a default, so an
//! absent file and `{}` behave the same.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};
use crate::import::ImportOptions;

/// Environment variable that overrides `log_filter`
pub const LOG_ENV: &str = "GRADEBOOK_LOG";

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradebookConfig {
    /// tracing filter directive (optional, default "warn")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Max rows validated per import (optional, default 10000)
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// Validate import rows on several threads (optional, default true)
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Include accepted rows in import reports (optional, default true)
    #[serde(default = "default_include_accepted")]
    pub include_accepted: bool,
}

fn default_log_filter() -> String {
    "warn".to_string()
}
fn default_max_rows() -> usize {
    10_000
}
fn default_parallel() -> bool {
    true
}
fn default_include_accepted() -> bool {
    true
}

impl Default for GradebookConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            max_rows: default_max_rows(),
            parallel: default_parallel(),
            include_accepted: default_include_accepted(),
        }
    }
}

impl GradebookConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: GradebookConfig = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        if self.max_rows == 0 {
            return Err(CliError::config_error("max_rows must be > 0"));
        }

        if self.log_filter.trim().is_empty() {
            return Err(CliError::config_error("log_filter must not be empty"));
        }

        Ok(())
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            max_rows: self.max_rows,
            parallel: self.parallel,
        }
    }
}
