//! JSON I/O handling for CLI
//!
//! - Input: one JSON record, or rows as NDJSON / a JSON array
//! - Output: one JSON document on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read the whole input from `path`, or stdin when `None`
pub fn read_input(path: Option<&Path>) -> CliResult<String> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            CliError::io_error(format!("Failed to read {}: {}", path.display(), e))
        }),
        None => {
            let mut buf = String::new();
            io::stdin().lock().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Parse a single JSON record
pub fn parse_record(text: &str) -> CliResult<Value> {
    if text.trim().is_empty() {
        return Err(CliError::input_error("Empty input"));
    }
    Ok(serde_json::from_str(text)?)
}

/// Parse import rows: a JSON array, or one JSON value per non-blank line
pub fn parse_rows(text: &str) -> CliResult<Vec<Value>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') {
        return match serde_json::from_str::<Value>(trimmed)? {
            Value::Array(rows) => Ok(rows),
            _ => Err(CliError::input_error("Expected a JSON array of rows")),
        };
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| CliError::input_error(format!("Line {}: invalid JSON: {}", i + 1, e)))
        })
        .collect()
}

/// Write a JSON document to stdout
pub fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

/// Write an error document to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_json(&serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    }))
}
