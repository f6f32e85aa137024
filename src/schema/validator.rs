//! Record validator
//!
//! Validation semantics:
//! - Every declared field is checked; the walk never stops early
//! - One error per failing field path, first failure wins
//! - Missing or null optional fields are skipped (or take their default)
//! - Missing or null required fields are `MissingRequiredField`
//! - Undeclared input fields are ignored and dropped from the output
//! - Enumerations are closed sets, no coercion
//! - Wrong structural types are `MalformedShape`, rooted at `$root`
//!   when the record itself is not an object
//!
//! Validation is pure: no I/O, no mutation of schemas or input.

use chrono::{DateTime, Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;
use validator::{ValidateEmail, ValidateUrl};

use super::errors::{ErrorKind, FieldError, ValidationErrors};
use super::registry::{Entity, SchemaRegistry};
use super::types::{Constraint, FieldRule, FieldType, Schema, ValueKind};

/// Path used for errors about the record as a whole
pub const ROOT_PATH: &str = "$root";

/// Outcome of validating one record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Validation<T> {
    /// Normalized record with defaults applied
    Accepted { data: T },
    /// Every failing field path with its message
    Rejected { errors: ValidationErrors },
}

impl<T> Validation<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Validation::Accepted { .. })
    }

    pub fn is_rejected(&self) -> bool {
        !self.is_accepted()
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Validation::Accepted { data } => Some(data),
            Validation::Rejected { .. } => None,
        }
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Validation::Accepted { .. } => None,
            Validation::Rejected { errors } => Some(errors),
        }
    }

    /// Converts into a `Result` for callers that prefer `?`
    pub fn into_result(self) -> Result<T, ValidationErrors> {
        match self {
            Validation::Accepted { data } => Ok(data),
            Validation::Rejected { errors } => Err(errors),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validation<U> {
        match self {
            Validation::Accepted { data } => Validation::Accepted { data: f(data) },
            Validation::Rejected { errors } => Validation::Rejected { errors },
        }
    }
}

/// Validator bound to a schema registry.
///
/// Holds no state of its own; any number of validators may share one
/// registry across threads.
pub struct SchemaValidator<'a> {
    registry: &'a SchemaRegistry,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a new validator backed by the given registry.
    pub fn new(registry: &'a SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Validates a record against the schema of `entity`.
    pub fn validate(&self, entity: Entity, record: &Value) -> Validation<Value> {
        validate(self.registry.get(entity), record)
    }

    /// Validates a record and deserializes the accepted data into `T`.
    pub fn validate_as<T: DeserializeOwned>(
        &self,
        entity: Entity,
        record: &Value,
    ) -> Validation<T> {
        validate_as(self.registry.get(entity), record)
    }
}

/// Validates `input` against `schema`.
pub fn validate(schema: &Schema, input: &Value) -> Validation<Value> {
    let mut errors = ValidationErrors::new();

    let Some(obj) = input.as_object() else {
        errors.insert(ROOT_PATH, FieldError::malformed("objet", input));
        debug!(schema = %schema.name, "record is not an object");
        return Validation::Rejected { errors };
    };

    let data = validate_object(obj, schema, "", &mut errors);

    if errors.is_empty() {
        Validation::Accepted {
            data: Value::Object(data),
        }
    } else {
        debug!(schema = %schema.name, errors = errors.len(), "record rejected");
        Validation::Rejected { errors }
    }
}

/// Validates `input` and deserializes the normalized record into `T`.
///
/// A deserialization failure after successful validation means `T` does
/// not match the schema; it is reported on the root path.
pub fn validate_as<T: DeserializeOwned>(schema: &Schema, input: &Value) -> Validation<T> {
    match validate(schema, input) {
        Validation::Accepted { data } => match serde_json::from_value(data) {
            Ok(record) => Validation::Accepted { data: record },
            Err(e) => {
                let mut errors = ValidationErrors::new();
                errors.insert(
                    ROOT_PATH,
                    FieldError::new(ErrorKind::MalformedShape, e.to_string()),
                );
                Validation::Rejected { errors }
            }
        },
        Validation::Rejected { errors } => Validation::Rejected { errors },
    }
}

/// Applies a single rule to a single value.
///
/// Returns the normalized value: dates become `YYYY-MM-DD`, integral
/// rules yield integers, everything else passes through unchanged.
/// `null` is accepted (as `null`) only for rules that are optional by
/// nature.
pub fn validate_field(rule: &FieldRule, value: &Value) -> Result<Value, FieldError> {
    if value.is_null() {
        return if rule.optional {
            Ok(Value::Null)
        } else {
            Err(FieldError::missing())
        };
    }

    let typed = Typed::from_value(rule.kind, value)?;

    for check in &rule.checks {
        if !typed.satisfies(&check.constraint) {
            return Err(FieldError::new(
                check.constraint.error_kind(),
                check.message.clone(),
            ));
        }
    }

    Ok(match typed {
        Typed::Date(date) => Value::String(date.format("%Y-%m-%d").to_string()),
        Typed::Number(n) if rule.is_integer() => Value::from(n as i64),
        _ => value.clone(),
    })
}

/// Checks a value against any field type, reporting the first error.
pub(crate) fn validate_field_type(field_type: &FieldType, value: &Value) -> Result<Value, FieldError> {
    let mut errors = ValidationErrors::new();
    match validate_value(value, field_type, ROOT_PATH, &mut errors) {
        Some(normalized) if errors.is_empty() => Ok(normalized),
        _ => Err(errors
            .iter()
            .next()
            .map(|(_, e)| e.clone())
            .unwrap_or_else(|| FieldError::malformed(field_type.type_name(), value))),
    }
}

/// Validates an object against a schema, collecting errors under `path_prefix`.
fn validate_object(
    obj: &Map<String, Value>,
    schema: &Schema,
    path_prefix: &str,
    errors: &mut ValidationErrors,
) -> Map<String, Value> {
    let mut out = Map::new();

    for (field_name, field_def) in &schema.fields {
        let field_path = make_path(path_prefix, field_name);

        match obj.get(field_name).filter(|v| !v.is_null()) {
            Some(value) => {
                if let Some(normalized) =
                    validate_value(value, &field_def.field_type, &field_path, errors)
                {
                    out.insert(field_name.clone(), normalized);
                }
            }
            None => {
                if let Some(default) = &field_def.default {
                    out.insert(field_name.clone(), default.clone());
                } else if field_def.required {
                    errors.insert(field_path, FieldError::missing());
                }
            }
        }
    }

    out
}

/// Validates a present, non-null value against a field type.
fn validate_value(
    value: &Value,
    field_type: &FieldType,
    field_path: &str,
    errors: &mut ValidationErrors,
) -> Option<Value> {
    match field_type {
        FieldType::Rule(rule) => match validate_field(rule, value) {
            Ok(normalized) => Some(normalized),
            Err(e) => {
                errors.insert(field_path, e);
                None
            }
        },
        FieldType::Enum(allowed) => match value.as_str() {
            Some(s) if allowed.iter().any(|a| a == s) => Some(value.clone()),
            _ => {
                errors.insert(field_path, FieldError::invalid_enum(allowed));
                None
            }
        },
        FieldType::Object(schema) => match value.as_object() {
            Some(obj) => Some(Value::Object(validate_object(
                obj, schema, field_path, errors,
            ))),
            None => {
                errors.insert(field_path, FieldError::malformed("objet", value));
                None
            }
        },
    }
}

/// A value converted to the kind its rule expects
enum Typed<'v> {
    Number(f64),
    Text(&'v str),
    Date(NaiveDate),
    Boolean,
}

impl<'v> Typed<'v> {
    fn from_value(kind: ValueKind, value: &'v Value) -> Result<Self, FieldError> {
        let mismatch = || FieldError::malformed(kind.type_name(), value);
        match kind {
            ValueKind::Number => value.as_f64().map(Typed::Number).ok_or_else(mismatch),
            ValueKind::Text => value.as_str().map(Typed::Text).ok_or_else(mismatch),
            ValueKind::Boolean => value.as_bool().map(|_| Typed::Boolean).ok_or_else(mismatch),
            ValueKind::Date => {
                let s = value.as_str().ok_or_else(mismatch)?;
                parse_date(s).map(Typed::Date).ok_or_else(|| {
                    FieldError::new(ErrorKind::MalformedShape, "Date invalide")
                })
            }
        }
    }

    fn satisfies(&self, constraint: &Constraint) -> bool {
        match (self, constraint) {
            (Typed::Number(n), Constraint::Min(min)) => *n >= *min,
            (Typed::Number(n), Constraint::Max(max)) => *n <= *max,
            (Typed::Number(n), Constraint::Integer) => n.fract() == 0.0,
            (Typed::Text(s), Constraint::MinLength(min)) => s.chars().count() >= *min,
            (Typed::Text(s), Constraint::MaxLength(max)) => s.chars().count() <= *max,
            (Typed::Text(s), Constraint::Pattern(re)) => re.is_match(s),
            (Typed::Text(s), Constraint::Email) => s.to_owned().validate_email(),
            (Typed::Text(s), Constraint::Url) => s.to_owned().validate_url(),
            (Typed::Text(s), Constraint::HasLowercase) => s.chars().any(|c| c.is_lowercase()),
            (Typed::Text(s), Constraint::HasUppercase) => s.chars().any(|c| c.is_uppercase()),
            (Typed::Text(s), Constraint::HasDigit) => s.chars().any(|c| c.is_ascii_digit()),
            (Typed::Date(d), Constraint::NotBefore(min)) => d >= min,
            (Typed::Date(d), Constraint::NotInFuture) => *d <= Local::now().date_naive(),
            // Rule structure is checked when the catalog is built
            _ => true,
        }
    }
}

/// Parses `YYYY-MM-DD` or an RFC 3339 date-time.
fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Creates a field path from prefix and field name.
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::FieldDef;
    use serde_json::json;

    fn note() -> FieldRule {
        FieldRule::new("note", ValueKind::Number)
            .check(Constraint::Min(0.0), "La note doit être positive")
            .check(Constraint::Max(20.0), "La note ne peut pas dépasser 20")
    }

    fn grade_schema() -> Schema {
        Schema::new("grade")
            .field("valeur", FieldDef::from_rule(&note()))
            .field(
                "absent",
                FieldDef::defaulted(
                    FieldType::rule(&FieldRule::new("booleen", ValueKind::Boolean)),
                    json!(false),
                ),
            )
    }

    #[test]
    fn test_valid_record_passes_with_default() {
        let result = validate(&grade_schema(), &json!({ "valeur": 15 }));
        assert_eq!(
            result,
            Validation::Accepted {
                data: json!({ "valeur": 15, "absent": false })
            }
        );
    }

    #[test]
    fn test_default_never_overrides_input() {
        let result = validate(&grade_schema(), &json!({ "valeur": 0, "absent": true }));
        assert_eq!(result.data().unwrap()["absent"], json!(true));
    }

    #[test]
    fn test_first_failing_check_wins() {
        let rule = FieldRule::new("code", ValueKind::Text)
            .check(Constraint::MinLength(3), "trop court")
            .check(Constraint::HasDigit, "chiffre requis");

        let err = validate_field(&rule, &json!("ab")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::LengthViolation);
        assert_eq!(err.message, "trop court");
    }

    #[test]
    fn test_wrong_type_is_malformed() {
        let result = validate(&grade_schema(), &json!({ "valeur": "quinze" }));
        let errors = result.errors().unwrap();
        assert_eq!(errors.kind("valeur"), Some(ErrorKind::MalformedShape));
    }

    #[test]
    fn test_non_object_record_rejected_at_root() {
        for input in [json!(null), json!("text"), json!([1, 2]), json!(3)] {
            let result = validate(&grade_schema(), &input);
            let errors = result.errors().unwrap();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors.kind(ROOT_PATH), Some(ErrorKind::MalformedShape));
        }
    }

    #[test]
    fn test_null_required_is_missing() {
        let result = validate(&grade_schema(), &json!({ "valeur": null }));
        assert_eq!(
            result.errors().unwrap().kind("valeur"),
            Some(ErrorKind::MissingRequiredField)
        );
    }

    #[test]
    fn test_unknown_fields_dropped() {
        let result = validate(&grade_schema(), &json!({ "valeur": 12, "extra": "x" }));
        let data = result.data().unwrap();
        assert!(data.get("extra").is_none());
    }

    #[test]
    fn test_date_normalized() {
        let rule = FieldRule::new("date", ValueKind::Date);
        assert_eq!(
            validate_field(&rule, &json!("2024-03-15T08:30:00+01:00")).unwrap(),
            json!("2024-03-15")
        );
        assert_eq!(
            validate_field(&rule, &json!("15/03/2024")).unwrap_err().kind,
            ErrorKind::MalformedShape
        );
    }

    #[test]
    fn test_integer_rule_normalizes_to_integer() {
        let rule = FieldRule::new("credits", ValueKind::Number).check(Constraint::Integer, "entier");
        assert_eq!(validate_field(&rule, &json!(3.0)).unwrap(), json!(3));
        assert!(validate_field(&rule, &json!(2.5)).is_err());
    }

    #[test]
    fn test_optional_rule_accepts_null() {
        let rule = FieldRule::new("url", ValueKind::Text)
            .check(Constraint::Url, "URL invalide")
            .optional();
        assert_eq!(validate_field(&rule, &json!(null)).unwrap(), json!(null));
        assert!(validate_field(&rule, &json!("")).is_err());
    }

    #[test]
    fn test_nested_paths_prefixed() {
        let inner = Schema::new("inner").field("valeur", FieldDef::from_rule(&note()));
        let schema = Schema::new("outer")
            .field("a", FieldDef::required(FieldType::object(inner.clone())))
            .field("b", FieldDef::required(FieldType::object(
                Schema::new("b").field("c", FieldDef::required(FieldType::object(inner))),
            )));

        let result = validate(
            &schema,
            &json!({ "a": { "valeur": 21 }, "b": { "c": {} } }),
        );
        let errors = result.errors().unwrap();
        assert_eq!(errors.paths().collect::<Vec<_>>(), vec!["a.valeur", "b.c.valeur"]);
    }

    #[test]
    fn test_into_result_and_map() {
        let accepted = validate(&grade_schema(), &json!({ "valeur": 10 }))
            .map(|v| v["valeur"].as_f64());
        assert_eq!(accepted.into_result().unwrap(), Some(10.0));

        let rejected = validate(&grade_schema(), &json!({}));
        assert!(rejected.is_rejected());
        assert!(rejected.into_result().unwrap_err().contains("valeur"));
    }
}
