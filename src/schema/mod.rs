//! Entity validation engine
//!
//! Declarative rules, composed into per-entity schemas, applied by a pure
//! validator that reports every failing field path at once.
//!
//! # Design Principles
//!
//! - Rules are data: a kind plus ordered checks, no per-rule types
//! - Catalog and registry are built once and never mutated
//! - Invalid data is a `Validation::Rejected` value, never an error
//! - Undefined rules are `SchemaError`s at composition time
//! - Defaults apply only on success and never override input
//! - Unknown input fields are ignored

mod catalog;
mod errors;
mod registry;
mod types;
mod validator;

pub use catalog::{catalog, rules, RuleCatalog};
pub use errors::{ErrorKind, FieldError, SchemaError, SchemaResult, ValidationErrors};
pub use registry::{
    registry, Entity, SchemaRegistry, EVALUATION_TYPES, SEMESTERS, STUDENT_STATUSES,
};
pub use types::{Check, Constraint, FieldDef, FieldRule, FieldType, Schema, ValueKind};
pub use validator::{
    validate, validate_as, validate_field, SchemaValidator, Validation, ROOT_PATH,
};
