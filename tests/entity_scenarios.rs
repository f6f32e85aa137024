//! Entity Scenario Tests
//!
//! End-to-end checks of concrete records as the UI and import layers
//! submit them.

use gradebook::records::{Grade, Student, StudentStatus};
use gradebook::schema::{registry, validate, Entity, ErrorKind, Validation, ROOT_PATH};
use gradebook::validate_record;
use serde_json::json;

// =============================================================================
// Student
// =============================================================================

/// Minimal student is accepted with status defaulted to "actif".
#[test]
fn test_student_defaults_status() {
    let input = json!({
        "nom": "Dupont",
        "prenom": "Jean",
        "email": "jean@x.fr",
        "codeEtudiant": "20241001"
    });

    let result = validate(registry().get(Entity::Student), &input);

    assert_eq!(
        result,
        Validation::Accepted {
            data: json!({
                "nom": "Dupont",
                "prenom": "Jean",
                "email": "jean@x.fr",
                "codeEtudiant": "20241001",
                "status": "actif"
            })
        }
    );
}

/// Three invalid fields, three errors, nothing else.
#[test]
fn test_student_three_errors() {
    let input = json!({
        "nom": "D",
        "prenom": "Jean",
        "email": "bad",
        "codeEtudiant": "ab"
    });

    let result = validate(registry().get(Entity::Student), &input);
    let errors = result.errors().unwrap();

    assert_eq!(errors.paths().collect::<Vec<_>>(), vec!["codeEtudiant", "email", "nom"]);
    assert_eq!(errors.kind("nom"), Some(ErrorKind::LengthViolation));
    assert_eq!(errors.kind("email"), Some(ErrorKind::PatternMismatch));
    assert_eq!(errors.kind("codeEtudiant"), Some(ErrorKind::LengthViolation));
    assert_eq!(errors.message("email"), Some("Adresse email invalide"));
}

/// Explicit status is kept, not overridden by the default.
#[test]
fn test_student_explicit_status_kept() {
    let student = validate_record::<Student>(&json!({
        "nom": "Bernard",
        "prenom": "Chloé",
        "email": "chloe.bernard@univ.fr",
        "codeEtudiant": "ETU_2020_17",
        "status": "diplome"
    }))
    .into_result()
    .unwrap();

    assert_eq!(student.status, StudentStatus::Diplome);
}

/// Missing status with default applies the default; unknown status is rejected.
#[test]
fn test_student_status_enum_is_closed() {
    let base = json!({
        "nom": "Petit",
        "prenom": "Luc",
        "email": "luc@x.fr",
        "codeEtudiant": "LUC01"
    });
    let schema = registry().get(Entity::Student);

    let mut upper = base.clone();
    upper["status"] = json!("ACTIF");
    let result = validate(schema, &upper);
    assert_eq!(
        result.errors().unwrap().kind("status"),
        Some(ErrorKind::InvalidEnumValue)
    );

    let mut null_status = base;
    null_status["status"] = json!(null);
    let result = validate(schema, &null_status);
    assert_eq!(result.data().unwrap()["status"], "actif");
}

// =============================================================================
// Grade
// =============================================================================

#[test]
fn test_grade_above_twenty_rejected() {
    let result = validate(registry().get(Entity::Grade), &json!({ "valeur": 25 }));
    let errors = result.errors().unwrap();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.kind("valeur"), Some(ErrorKind::OutOfRange));
    assert!(errors.message("valeur").unwrap().contains("20"));
}

#[test]
fn test_grade_accepted() {
    let grade = validate_record::<Grade>(&json!({ "valeur": 15, "absent": false }))
        .into_result()
        .unwrap();

    assert_eq!(
        grade,
        Grade {
            valeur: 15.0,
            commentaire: None,
            absent: false
        }
    );
}

// =============================================================================
// Institution
// =============================================================================

/// Oral coefficient below 0.1 is reported at its nested path.
#[test]
fn test_configuration_coefficient_below_minimum() {
    let input = json!({
        "noteMin": 0,
        "noteMax": 20,
        "coefficients": { "controle": 1, "examen": 2, "tp": 1, "oral": 0.05 }
    });

    let result = validate(registry().get(Entity::InstitutionConfiguration), &input);
    let errors = result.errors().unwrap();

    assert_eq!(errors.paths().collect::<Vec<_>>(), vec!["coefficients.oral"]);
    assert_eq!(errors.kind("coefficients.oral"), Some(ErrorKind::OutOfRange));
}

/// Inside an institution the same error carries the full path.
#[test]
fn test_institution_nested_path() {
    let input = json!({
        "nom": "Collège Pasteur",
        "configuration": {
            "noteMin": 0,
            "noteMax": 20,
            "coefficients": { "controle": 1, "tp": 1, "oral": 1 }
        }
    });

    let result = validate(registry().get(Entity::Institution), &input);
    let errors = result.errors().unwrap();

    assert_eq!(
        errors.kind("configuration.coefficients.examen"),
        Some(ErrorKind::MissingRequiredField)
    );
    assert_eq!(errors.len(), 1);
}

// =============================================================================
// Evaluation
// =============================================================================

#[test]
fn test_evaluation_unknown_type() {
    let input = json!({
        "nom": "DS1",
        "type": "unknown",
        "coefficient": 1,
        "date": "2024-12-02"
    });

    let result = validate(registry().get(Entity::Evaluation), &input);
    let errors = result.errors().unwrap();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.kind("type"), Some(ErrorKind::InvalidEnumValue));
    assert!(errors.message("type").unwrap().contains("controle"));
}

#[test]
fn test_evaluation_type_no_coercion() {
    let input = json!({
        "nom": "TP noté",
        "type": "TP",
        "coefficient": 1,
        "date": "2024-12-02"
    });

    let result = validate(registry().get(Entity::Evaluation), &input);
    assert_eq!(
        result.errors().unwrap().kind("type"),
        Some(ErrorKind::InvalidEnumValue)
    );
}

// =============================================================================
// Malformed Input
// =============================================================================

#[test]
fn test_malformed_input_rejected_at_root() {
    for entity in Entity::ALL {
        let result = validate(registry().get(entity), &json!(["not", "an", "object"]));
        let errors = result.errors().unwrap();
        assert_eq!(errors.paths().collect::<Vec<_>>(), vec![ROOT_PATH]);
        assert_eq!(errors.kind(ROOT_PATH), Some(ErrorKind::MalformedShape));
    }
}

#[test]
fn test_rejection_serializes_with_status_tag() {
    let result = validate(registry().get(Entity::Grade), &json!({ "valeur": -3 }));
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["status"], "rejected");
    assert_eq!(value["errors"]["valeur"]["kind"], "out_of_range");
}
