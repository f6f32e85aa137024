//! Error types for the validation engine
//!
//! Two families live here:
//! - `SchemaError`: programming errors in the rule catalog or schema
//!   composition. Raised while building the registry, never per record.
//! - `FieldError` / `ValidationErrors`: invalid *data*. These are values
//!   carried by a rejected `Validation`, never panics or `Err`s.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Catalog and schema composition errors. All are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A schema referenced a rule the catalog does not define
    #[error("rule '{0}' is not defined in the catalog")]
    UnknownRule(String),

    /// Two rules registered under the same name
    #[error("rule '{0}' is already defined")]
    DuplicateRule(String),

    /// A rule definition is malformed (bad pattern, mismatched constraint)
    #[error("rule '{rule}' is invalid: {reason}")]
    InvalidRule { rule: String, reason: String },

    /// A schema field is malformed (default violating its own rule, empty enum)
    #[error("schema '{schema}' field '{field}' is invalid: {reason}")]
    InvalidField {
        schema: String,
        field: String,
        reason: String,
    },

    /// Entity name not known to the registry
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),
}

impl SchemaError {
    /// Returns the string code for this error
    pub fn code(&self) -> &'static str {
        match self {
            SchemaError::UnknownRule(_) => "GRADEBOOK_UNKNOWN_RULE",
            SchemaError::DuplicateRule(_) => "GRADEBOOK_DUPLICATE_RULE",
            SchemaError::InvalidRule { .. } => "GRADEBOOK_INVALID_RULE",
            SchemaError::InvalidField { .. } => "GRADEBOOK_INVALID_FIELD",
            SchemaError::UnknownEntity(_) => "GRADEBOOK_UNKNOWN_ENTITY",
        }
    }
}

/// Result type for schema composition
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Why a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingRequiredField,
    OutOfRange,
    PatternMismatch,
    LengthViolation,
    InvalidEnumValue,
    /// Wrong structural type at a schema node
    MalformedShape,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::MissingRequiredField => "missing_required_field",
            ErrorKind::OutOfRange => "out_of_range",
            ErrorKind::PatternMismatch => "pattern_mismatch",
            ErrorKind::LengthViolation => "length_violation",
            ErrorKind::InvalidEnumValue => "invalid_enum_value",
            ErrorKind::MalformedShape => "malformed_shape",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One rejected field: its kind and the message shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn missing() -> Self {
        Self::new(ErrorKind::MissingRequiredField, "Ce champ est requis")
    }

    pub fn invalid_enum(allowed: &[String]) -> Self {
        Self::new(
            ErrorKind::InvalidEnumValue,
            format!("Valeur invalide, valeurs acceptées : {}", allowed.join(", ")),
        )
    }

    pub fn malformed(expected: &str, actual: &Value) -> Self {
        Self::new(
            ErrorKind::MalformedShape,
            format!(
                "Type invalide : {} attendu, {} reçu",
                expected,
                json_type_name(actual)
            ),
        )
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Field path → error, one entry per failing path.
///
/// The first error recorded for a path wins; later ones are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `path` unless one is already recorded
    pub fn insert(&mut self, path: impl Into<String>, error: FieldError) {
        self.0.entry(path.into()).or_insert(error);
    }

    pub fn get(&self, path: &str) -> Option<&FieldError> {
        self.0.get(path)
    }

    /// Message recorded for `path`
    pub fn message(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(|e| e.message.as_str())
    }

    /// Kind recorded for `path`
    pub fn kind(&self, path: &str) -> Option<ErrorKind> {
        self.0.get(path).map(|e| e.kind)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Failing paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Path → message view, for rendering next to form inputs
    pub fn messages(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.message.clone()))
            .collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (path, error) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", path, error.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "booléen",
        Value::Number(_) => "nombre",
        Value::String(_) => "texte",
        Value::Array(_) => "tableau",
        Value::Object(_) => "objet",
    }
}
