//! gradebook - declarative validation for grade-management records
//!
//! Students, courses, evaluations, grades and institutions are checked
//! against immutable, process-wide schemas. Invalid data comes back as a
//! field-path-keyed error map, never as a panic.

pub mod cli;
pub mod import;
pub mod records;
pub mod schema;

pub use records::{validate_record, Record};
pub use schema::{validate, Entity, Validation, ValidationErrors};
