//! CLI-specific error types
//!
//! A rejected record is not a CLI error; it is reported on stdout and
//! reflected in the exit code. These errors cover everything that stops
//! the command from producing a result at all.

use std::io;

use thiserror::Error;

use crate::schema::SchemaError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration file missing, unreadable or invalid
    #[error("{0}")]
    Config(String),

    /// stdin/stdout or input file failure
    #[error("{0}")]
    Io(String),

    /// Input is not valid JSON
    #[error("{0}")]
    Input(String),

    /// Rule catalog or schema composition failure
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl CliError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn input_error(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        match self {
            CliError::Config(_) => "GRADEBOOK_CLI_CONFIG_ERROR",
            CliError::Io(_) => "GRADEBOOK_CLI_IO_ERROR",
            CliError::Input(_) => "GRADEBOOK_CLI_INPUT_ERROR",
            CliError::Schema(e) => e.code(),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::input_error(format!("JSON error: {}", e))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(CliError::config_error("x").code_str(), "GRADEBOOK_CLI_CONFIG_ERROR");
        assert_eq!(
            CliError::from(SchemaError::UnknownRule("iban".into())).code_str(),
            "GRADEBOOK_UNKNOWN_RULE"
        );
    }

    #[test]
    fn test_schema_error_display_is_transparent() {
        let err = CliError::from(SchemaError::UnknownRule("iban".into()));
        assert_eq!(err.to_string(), "rule 'iban' is not defined in the catalog");
    }
}
