//! Typed records
//!
//! Strongly-typed views of accepted entity data. Values of these types
//! only come out of a successful validation, so their invariants (bounds,
//! closed enumerations, normalized dates) hold by construction.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema::{registry, validate_as, Entity, Validation};

/// A record type backed by a registered entity schema
pub trait Record: DeserializeOwned {
    const ENTITY: Entity;
}

/// Validates `input` against the schema registered for `R`.
pub fn validate_record<R: Record>(input: &Value) -> Validation<R> {
    validate_as(registry().get(R::ENTITY), input)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    #[default]
    Actif,
    Inactif,
    Diplome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Semester {
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationType {
    Controle,
    Examen,
    Tp,
    Oral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub code_etudiant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_naissance: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    pub status: StudentStatus,
}

impl Student {
    /// Display name as shown on rosters
    pub fn full_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }
}

impl Record for Student {
    const ENTITY: Entity = Entity::Student;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub nom: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub credits: u8,
    pub semester: Semester,
}

impl Record for Course {
    const ENTITY: Entity = Entity::Course;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub nom: String,
    #[serde(rename = "type")]
    pub kind: EvaluationType,
    pub coefficient: f64,
    pub date: NaiveDate,
    /// Duration in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duree: Option<u16>,
}

impl Record for Evaluation {
    const ENTITY: Entity = Entity::Evaluation;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub valeur: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentaire: Option<String>,
    pub absent: bool,
}

impl Record for Grade {
    const ENTITY: Entity = Entity::Grade;
}

/// Coefficient applied to each evaluation type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    pub controle: f64,
    pub examen: f64,
    pub tp: f64,
    pub oral: f64,
}

impl Coefficients {
    pub fn for_type(&self, kind: EvaluationType) -> f64 {
        match kind {
            EvaluationType::Controle => self.controle,
            EvaluationType::Examen => self.examen,
            EvaluationType::Tp => self.tp,
            EvaluationType::Oral => self.oral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionConfiguration {
    pub note_min: f64,
    pub note_max: f64,
    pub coefficients: Coefficients,
}

impl Record for InstitutionConfiguration {
    const ENTITY: Entity = Entity::InstitutionConfiguration;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub nom: String,
    pub configuration: InstitutionConfiguration,
}

impl Record for Institution {
    const ENTITY: Entity = Entity::Institution;
}
