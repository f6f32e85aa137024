//! Field rule and schema type definitions
//!
//! A rule is plain data: a value kind plus an ordered list of checks,
//! each carrying its own message. Schemas compose rules by nesting;
//! adding an entity means adding data, not new types.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use super::errors::{ErrorKind, SchemaError, SchemaResult};

/// Semantic type a rule operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// JSON number (integer or float)
    Number,
    /// UTF-8 string
    Text,
    /// Calendar date, given as `YYYY-MM-DD` or an RFC 3339 date-time
    Date,
    /// Boolean
    Boolean,
}

impl ValueKind {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::Number => "nombre",
            ValueKind::Text => "texte",
            ValueKind::Date => "date",
            ValueKind::Boolean => "booléen",
        }
    }
}

/// A single parameterized predicate over a typed value.
///
/// Bounds are inclusive. Lengths count characters, not bytes.
#[derive(Debug, Clone)]
pub enum Constraint {
    Min(f64),
    Max(f64),
    Integer,
    MinLength(usize),
    MaxLength(usize),
    Pattern(Regex),
    Email,
    Url,
    HasLowercase,
    HasUppercase,
    HasDigit,
    NotBefore(NaiveDate),
    /// Not after the current local date
    NotInFuture,
}

impl Constraint {
    /// Error kind reported when this constraint rejects a value
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            Constraint::Min(_)
            | Constraint::Max(_)
            | Constraint::NotBefore(_)
            | Constraint::NotInFuture => ErrorKind::OutOfRange,
            Constraint::MinLength(_) | Constraint::MaxLength(_) => ErrorKind::LengthViolation,
            Constraint::Pattern(_)
            | Constraint::Email
            | Constraint::Url
            | Constraint::HasLowercase
            | Constraint::HasUppercase
            | Constraint::HasDigit => ErrorKind::PatternMismatch,
            Constraint::Integer => ErrorKind::MalformedShape,
        }
    }

    /// Whether this constraint can be evaluated on values of `kind`
    pub fn applies_to(&self, kind: ValueKind) -> bool {
        match self {
            Constraint::Min(_) | Constraint::Max(_) | Constraint::Integer => {
                kind == ValueKind::Number
            }
            Constraint::MinLength(_)
            | Constraint::MaxLength(_)
            | Constraint::Pattern(_)
            | Constraint::Email
            | Constraint::Url
            | Constraint::HasLowercase
            | Constraint::HasUppercase
            | Constraint::HasDigit => kind == ValueKind::Text,
            Constraint::NotBefore(_) | Constraint::NotInFuture => kind == ValueKind::Date,
        }
    }
}

/// A constraint paired with the message shown when it fails
#[derive(Debug, Clone)]
pub struct Check {
    pub constraint: Constraint,
    pub message: String,
}

/// Named, entity-agnostic field rule.
///
/// Checks run in declaration order and the first failure wins.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Catalog name (e.g. "note", "codeEtudiant")
    pub name: String,
    /// Value kind the checks operate on
    pub kind: ValueKind,
    /// Whether the field may be omitted wherever this rule is used
    pub optional: bool,
    /// Ordered checks
    pub checks: Vec<Check>,
}

impl FieldRule {
    /// Create a rule with no checks
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: false,
            checks: Vec::new(),
        }
    }

    /// Append a check
    pub fn check(mut self, constraint: Constraint, message: impl Into<String>) -> Self {
        self.checks.push(Check {
            constraint,
            message: message.into(),
        });
        self
    }

    /// Mark the rule as optional by nature (absent values pass)
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Whether any check requires an integral number
    pub fn is_integer(&self) -> bool {
        self.checks
            .iter()
            .any(|c| matches!(c.constraint, Constraint::Integer))
    }

    /// Validates the rule definition itself (not a value)
    pub fn validate_structure(&self) -> SchemaResult<()> {
        for check in &self.checks {
            if !check.constraint.applies_to(self.kind) {
                return Err(SchemaError::InvalidRule {
                    rule: self.name.clone(),
                    reason: format!(
                        "constraint {:?} does not apply to {} values",
                        check.constraint,
                        self.kind.type_name()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// What a schema field holds
#[derive(Debug, Clone)]
pub enum FieldType {
    /// Value checked by a catalog rule
    Rule(FieldRule),
    /// Closed set of string literals, no coercion
    Enum(Vec<String>),
    /// Nested object with its own schema
    Object(Schema),
}

impl FieldType {
    pub fn rule(rule: &FieldRule) -> Self {
        FieldType::Rule(rule.clone())
    }

    pub fn one_of(values: &[&str]) -> Self {
        FieldType::Enum(values.iter().map(|v| v.to_string()).collect())
    }

    pub fn object(schema: Schema) -> Self {
        FieldType::Object(schema)
    }

    /// Returns the type name for listings and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Rule(rule) => rule.kind.type_name(),
            FieldType::Enum(_) => "énumération",
            FieldType::Object(_) => "objet",
        }
    }
}

/// Field definition inside a schema
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// What the field holds
    pub field_type: FieldType,
    /// Whether the field must be present
    pub required: bool,
    /// Value used when the field is absent; only applied on success
    pub default: Option<Value>,
}

impl FieldDef {
    /// Field backed by a rule; required unless the rule is optional by nature
    pub fn from_rule(rule: &FieldRule) -> Self {
        Self {
            field_type: FieldType::rule(rule),
            required: !rule.optional,
            default: None,
        }
    }

    pub fn required(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: true,
            default: None,
        }
    }

    pub fn optional(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            default: None,
        }
    }

    /// Optional field that takes `default` when absent
    pub fn defaulted(field_type: FieldType, default: Value) -> Self {
        Self {
            field_type,
            required: false,
            default: Some(default),
        }
    }
}

/// Named entity schema
#[derive(Debug, Clone)]
pub struct Schema {
    /// Entity name (e.g. "student")
    pub name: String,
    /// Field definitions, keyed by field name
    pub fields: BTreeMap<String, FieldDef>,
}

impl Schema {
    /// Create an empty schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field
    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldDef> {
        self.fields.get(field)
    }

    /// Field names in sorted order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Validates the schema structure itself (not a record).
    ///
    /// Every rule must be well-formed and every default must satisfy
    /// the field it belongs to, recursively.
    pub fn validate_structure(&self) -> SchemaResult<()> {
        for (name, def) in &self.fields {
            match &def.field_type {
                FieldType::Rule(rule) => rule.validate_structure()?,
                FieldType::Enum(values) if values.is_empty() => {
                    return Err(SchemaError::InvalidField {
                        schema: self.name.clone(),
                        field: name.clone(),
                        reason: "enumeration has no values".into(),
                    });
                }
                FieldType::Enum(_) => {}
                FieldType::Object(nested) => nested.validate_structure()?,
            }

            if let Some(default) = &def.default {
                super::validator::validate_field_type(&def.field_type, default).map_err(|e| {
                    SchemaError::InvalidField {
                        schema: self.name.clone(),
                        field: name.clone(),
                        reason: e.message,
                    }
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn note_rule() -> FieldRule {
        FieldRule::new("note", ValueKind::Number)
            .check(Constraint::Min(0.0), "trop basse")
            .check(Constraint::Max(20.0), "trop haute")
    }

    #[test]
    fn test_constraint_kinds() {
        assert_eq!(Constraint::Max(1.0).error_kind(), ErrorKind::OutOfRange);
        assert_eq!(Constraint::MinLength(2).error_kind(), ErrorKind::LengthViolation);
        assert_eq!(Constraint::Email.error_kind(), ErrorKind::PatternMismatch);
        assert_eq!(Constraint::NotInFuture.error_kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn test_rule_structure_rejects_mismatched_constraint() {
        let rule = FieldRule::new("bad", ValueKind::Text).check(Constraint::Min(1.0), "x");
        let err = rule.validate_structure().unwrap_err();
        assert!(matches!(err, SchemaError::InvalidRule { ref rule, .. } if rule == "bad"));
    }

    #[test]
    fn test_from_rule_follows_rule_optionality() {
        let phone = FieldRule::new("telephone", ValueKind::Text).optional();
        assert!(!FieldDef::from_rule(&phone).required);
        assert!(FieldDef::from_rule(&note_rule()).required);
    }

    #[test]
    fn test_schema_with_valid_default() {
        let schema = Schema::new("grade")
            .field("valeur", FieldDef::from_rule(&note_rule()))
            .field(
                "status",
                FieldDef::defaulted(FieldType::one_of(&["a", "b"]), json!("a")),
            );
        assert!(schema.validate_structure().is_ok());
        assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["status", "valeur"]);
    }

    #[test]
    fn test_schema_default_outside_enum_rejected() {
        let schema = Schema::new("student").field(
            "status",
            FieldDef::defaulted(FieldType::one_of(&["actif"]), json!("archive")),
        );
        let err = schema.validate_structure().unwrap_err();
        assert!(matches!(err, SchemaError::InvalidField { ref field, .. } if field == "status"));
    }

    #[test]
    fn test_nested_default_checked() {
        let inner = Schema::new("inner").field(
            "valeur",
            FieldDef::defaulted(FieldType::rule(&note_rule()), json!(42)),
        );
        let schema = Schema::new("outer").field("inner", FieldDef::required(FieldType::object(inner)));
        assert!(schema.validate_structure().is_err());
    }
}
