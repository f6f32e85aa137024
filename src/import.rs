//! Batch import validation
//!
//! Validates spreadsheet rows against one entity schema and splits them
//! into rows ready for persistence and rows reported back to the user.
//! Row numbers are 1-based, matching what a user sees in the sheet.

use std::num::NonZeroUsize;
use std::thread;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::schema::{validate, Schema, Validation, ValidationErrors};

/// Batch limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Rows beyond this count are not validated
    pub max_rows: usize,
    /// Validate rows on several threads
    pub parallel: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            max_rows: 10_000,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedRow {
    pub row: usize,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRow {
    pub row: usize,
    pub errors: ValidationErrors,
}

/// Outcome of validating a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub entity: String,
    pub accepted: Vec<AcceptedRow>,
    pub rejected: Vec<RejectedRow>,
    /// Rows past `max_rows`, left unvalidated
    pub truncated: usize,
}

impl ImportReport {
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected.len() + self.truncated
    }

    /// Whether every validated row was accepted and nothing was truncated
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty() && self.truncated == 0
    }

    /// Accepted payloads, in row order
    pub fn accepted_data(&self) -> impl Iterator<Item = &Value> {
        self.accepted.iter().map(|r| &r.data)
    }
}

/// Validates `rows` against `schema`.
///
/// Each row is independent; results are reported in row order whether
/// or not validation ran in parallel.
pub fn validate_rows(schema: &Schema, rows: &[Value], options: &ImportOptions) -> ImportReport {
    let limit = rows.len().min(options.max_rows);
    let (batch, overflow) = rows.split_at(limit);

    if !overflow.is_empty() {
        warn!(
            entity = %schema.name,
            max_rows = options.max_rows,
            truncated = overflow.len(),
            "import exceeds row limit"
        );
    }

    let results = if options.parallel {
        validate_parallel(schema, batch)
    } else {
        batch.iter().map(|row| validate(schema, row)).collect()
    };

    let mut report = ImportReport {
        entity: schema.name.clone(),
        truncated: overflow.len(),
        ..Default::default()
    };

    for (index, result) in results.into_iter().enumerate() {
        let row = index + 1;
        match result {
            Validation::Accepted { data } => report.accepted.push(AcceptedRow { row, data }),
            Validation::Rejected { errors } => report.rejected.push(RejectedRow { row, errors }),
        }
    }

    info!(
        entity = %report.entity,
        accepted = report.accepted.len(),
        rejected = report.rejected.len(),
        truncated = report.truncated,
        "batch validated"
    );

    report
}

fn validate_parallel(schema: &Schema, rows: &[Value]) -> Vec<Validation<Value>> {
    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    if workers <= 1 || rows.len() < 2 {
        return rows.iter().map(|row| validate(schema, row)).collect();
    }

    let chunk_size = rows.len().div_ceil(workers);

    thread::scope(|scope| {
        let handles: Vec<_> = rows
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|row| validate(schema, row))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        // A panic inside `validate` is a bug; propagate it unchanged.
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{registry, Entity};
    use serde_json::json;

    fn grades(values: &[f64]) -> Vec<Value> {
        values.iter().map(|v| json!({ "valeur": v })).collect()
    }

    #[test]
    fn test_rows_split_in_order() {
        let schema = registry().get(Entity::Grade);
        let rows = grades(&[12.0, 25.0, 8.5, -1.0]);

        let report = validate_rows(schema, &rows, &ImportOptions::default());

        assert_eq!(report.entity, "grade");
        assert_eq!(report.accepted.iter().map(|r| r.row).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(report.rejected.iter().map(|r| r.row).collect::<Vec<_>>(), vec![2, 4]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let schema = registry().get(Entity::Grade);
        let rows: Vec<Value> = (0..200).map(|i| json!({ "valeur": (i % 30) as f64 })).collect();

        let sequential = validate_rows(
            schema,
            &rows,
            &ImportOptions { parallel: false, ..Default::default() },
        );
        let parallel = validate_rows(schema, &rows, &ImportOptions::default());

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_rows_past_limit_truncated() {
        let schema = registry().get(Entity::Grade);
        let rows = grades(&[10.0, 11.0, 12.0]);

        let report = validate_rows(
            schema,
            &rows,
            &ImportOptions { max_rows: 2, parallel: false },
        );

        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.truncated, 1);
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_empty_batch() {
        let report = validate_rows(registry().get(Entity::Course), &[], &ImportOptions::default());
        assert!(report.is_clean());
        assert_eq!(report.total(), 0);
    }
}
