//! Entity schema registry
//!
//! Composes catalog rules into one schema per domain entity. Composition
//! is static: every schema is declared here, resolved against a catalog
//! once, and immutable afterwards.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::catalog::{catalog, rules, RuleCatalog};
use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldDef, FieldType, Schema};

pub const STUDENT_STATUSES: &[&str] = &["actif", "inactif", "diplome"];
pub const SEMESTERS: &[&str] = &["S1", "S2", "S3", "S4", "S5", "S6"];
pub const EVALUATION_TYPES: &[&str] = &["controle", "examen", "tp", "oral"];

/// Domain entities with a registered schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Entity {
    Student,
    Course,
    Evaluation,
    Grade,
    Institution,
    /// The settings-dashboard view of an institution's configuration
    InstitutionConfiguration,
}

impl Entity {
    pub const ALL: [Entity; 6] = [
        Entity::Student,
        Entity::Course,
        Entity::Evaluation,
        Entity::Grade,
        Entity::Institution,
        Entity::InstitutionConfiguration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Entity::Student => "student",
            Entity::Course => "course",
            Entity::Evaluation => "evaluation",
            Entity::Grade => "grade",
            Entity::Institution => "institution",
            Entity::InstitutionConfiguration => "institution-configuration",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Entity {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Entity::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| SchemaError::UnknownEntity(s.to_string()))
    }
}

static STANDARD: LazyLock<SchemaRegistry> = LazyLock::new(|| {
    SchemaRegistry::standard()
        .unwrap_or_else(|e| panic!("standard schema registry is invalid: {e}"))
});

/// Returns the process-wide registry built from the standard catalog.
///
/// # Panics
///
/// Panics on first use if a schema references an undefined rule or
/// declares an invalid default. Callers wanting the error as a value
/// build `SchemaRegistry::standard()` themselves at startup.
pub fn registry() -> &'static SchemaRegistry {
    &STANDARD
}

/// One schema per entity
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    student: Schema,
    course: Schema,
    evaluation: Schema,
    grade: Schema,
    institution: Schema,
    institution_configuration: Schema,
}

impl SchemaRegistry {
    /// Builds the registry from the process-wide standard catalog.
    pub fn standard() -> SchemaResult<Self> {
        Self::from_catalog(catalog())
    }

    /// Builds every entity schema against `catalog`.
    ///
    /// # Errors
    ///
    /// - `UnknownRule` if a schema references a rule missing from `catalog`
    /// - `InvalidField` / `InvalidRule` if a composed schema is malformed
    pub fn from_catalog(catalog: &RuleCatalog) -> SchemaResult<Self> {
        let institution_configuration = institution_configuration_schema(catalog)?;

        let registry = Self {
            student: student_schema(catalog)?,
            course: course_schema(catalog)?,
            evaluation: evaluation_schema(catalog)?,
            grade: grade_schema(catalog)?,
            institution: institution_schema(catalog, institution_configuration.clone())?,
            institution_configuration,
        };

        for entity in Entity::ALL {
            registry.get(entity).validate_structure()?;
        }

        Ok(registry)
    }

    /// Returns the schema for `entity`
    pub fn get(&self, entity: Entity) -> &Schema {
        match entity {
            Entity::Student => &self.student,
            Entity::Course => &self.course,
            Entity::Evaluation => &self.evaluation,
            Entity::Grade => &self.grade,
            Entity::Institution => &self.institution,
            Entity::InstitutionConfiguration => &self.institution_configuration,
        }
    }

    /// Iterates over every registered entity and its schema
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &Schema)> {
        Entity::ALL.into_iter().map(move |e| (e, self.get(e)))
    }
}

fn student_schema(c: &RuleCatalog) -> SchemaResult<Schema> {
    Ok(Schema::new(Entity::Student.name())
        .field("nom", FieldDef::from_rule(c.get(rules::NOM)?))
        .field("prenom", FieldDef::from_rule(c.get(rules::NOM)?))
        .field("email", FieldDef::from_rule(c.get(rules::EMAIL)?))
        .field("codeEtudiant", FieldDef::from_rule(c.get(rules::CODE_ETUDIANT)?))
        .field(
            "dateNaissance",
            FieldDef::optional(FieldType::rule(c.get(rules::DATE_NAISSANCE)?)),
        )
        .field("telephone", FieldDef::from_rule(c.get(rules::TELEPHONE)?))
        .field(
            "status",
            FieldDef::defaulted(FieldType::one_of(STUDENT_STATUSES), json!("actif")),
        ))
}

fn course_schema(c: &RuleCatalog) -> SchemaResult<Schema> {
    Ok(Schema::new(Entity::Course.name())
        .field("nom", FieldDef::from_rule(c.get(rules::LIBELLE)?))
        .field("code", FieldDef::from_rule(c.get(rules::CODE_COURS)?))
        .field(
            "description",
            FieldDef::optional(FieldType::rule(c.get(rules::DESCRIPTION)?)),
        )
        .field("credits", FieldDef::from_rule(c.get(rules::CREDITS)?))
        .field("semester", FieldDef::required(FieldType::one_of(SEMESTERS))))
}

fn evaluation_schema(c: &RuleCatalog) -> SchemaResult<Schema> {
    Ok(Schema::new(Entity::Evaluation.name())
        .field("nom", FieldDef::from_rule(c.get(rules::LIBELLE)?))
        .field("type", FieldDef::required(FieldType::one_of(EVALUATION_TYPES)))
        .field("coefficient", FieldDef::from_rule(c.get(rules::COEFFICIENT)?))
        .field("date", FieldDef::from_rule(c.get(rules::DATE)?))
        .field("duree", FieldDef::optional(FieldType::rule(c.get(rules::DUREE)?))))
}

fn grade_schema(c: &RuleCatalog) -> SchemaResult<Schema> {
    Ok(Schema::new(Entity::Grade.name())
        .field("valeur", FieldDef::from_rule(c.get(rules::NOTE)?))
        .field(
            "commentaire",
            FieldDef::optional(FieldType::rule(c.get(rules::COMMENTAIRE)?)),
        )
        .field(
            "absent",
            FieldDef::defaulted(FieldType::rule(c.get(rules::BOOLEEN)?), json!(false)),
        ))
}

fn institution_configuration_schema(c: &RuleCatalog) -> SchemaResult<Schema> {
    let coefficient = c.get(rules::COEFFICIENT)?;
    let coefficients = EVALUATION_TYPES
        .iter()
        .fold(Schema::new("coefficients"), |schema, kind| {
            schema.field(*kind, FieldDef::from_rule(coefficient))
        });

    Ok(Schema::new(Entity::InstitutionConfiguration.name())
        .field("noteMin", FieldDef::from_rule(c.get(rules::NOTE)?))
        .field("noteMax", FieldDef::from_rule(c.get(rules::NOTE)?))
        .field(
            "coefficients",
            FieldDef::required(FieldType::object(coefficients)),
        ))
}

fn institution_schema(c: &RuleCatalog, configuration: Schema) -> SchemaResult<Schema> {
    Ok(Schema::new(Entity::Institution.name())
        .field("nom", FieldDef::from_rule(c.get(rules::LIBELLE)?))
        .field(
            "configuration",
            FieldDef::required(FieldType::object(configuration)),
        ))
}
