//! CLI module for gradebook
//!
//! Provides a command-line adapter over the validation engine:
//! - validate: one record in, one result out
//! - import: a batch of rows in, a row-by-row report out
//! - schemas: registered entities and their fields
//! - check-field: one value against one catalog rule

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    check_field, describe_schemas, import, init_logging, run, run_command, validate,
    ImportOutput, ImportSummary, Outcome,
};
pub use config::{GradebookConfig, LOG_ENV};
pub use errors::{CliError, CliResult};
pub use io::{parse_record, parse_rows, read_input, write_error, write_json};
