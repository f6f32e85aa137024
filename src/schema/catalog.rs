//! Rule catalog
//!
//! Named, entity-agnostic field rules. The standard catalog is built once
//! and shared process-wide; schemas only ever reference rules by name
//! through `RuleCatalog::get`.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::errors::{SchemaError, SchemaResult};
use super::types::{Constraint, FieldRule, ValueKind};

/// Standard rule names
pub mod rules {
    pub const NOTE: &str = "note";
    pub const NOM: &str = "nom";
    pub const EMAIL: &str = "email";
    pub const CODE_ETUDIANT: &str = "codeEtudiant";
    pub const COEFFICIENT: &str = "coefficient";
    pub const DATE_NAISSANCE: &str = "dateNaissance";
    pub const TELEPHONE: &str = "telephone";
    pub const MOT_DE_PASSE: &str = "motDePasse";
    pub const URL: &str = "url";
    pub const LIBELLE: &str = "libelle";
    pub const CODE_COURS: &str = "codeCours";
    pub const DESCRIPTION: &str = "description";
    pub const COMMENTAIRE: &str = "commentaire";
    pub const CREDITS: &str = "credits";
    pub const DUREE: &str = "duree";
    pub const DATE: &str = "date";
    pub const BOOLEEN: &str = "booleen";
}

pub const NAME_PATTERN: &str = r"^[A-Za-zÀ-ÿ\s\-']+$";
pub const CODE_PATTERN: &str = r"^[A-Za-z0-9\-_]+$";
pub const PHONE_PATTERN: &str = r"^(\+33|0)[1-9]\d{8}$";

static STANDARD: LazyLock<RuleCatalog> = LazyLock::new(|| {
    RuleCatalog::standard().unwrap_or_else(|e| panic!("standard rule catalog is invalid: {e}"))
});

/// Returns the process-wide standard catalog.
///
/// # Panics
///
/// Panics on first use if the standard rule definitions are malformed.
/// That is a programming error, never a data error.
pub fn catalog() -> &'static RuleCatalog {
    &STANDARD
}

/// Registry of named field rules
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: HashMap<String, FieldRule>,
}

impl RuleCatalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule after checking its structure.
    ///
    /// Rule names are unique; re-registering a name is an error.
    pub fn insert(&mut self, rule: FieldRule) -> SchemaResult<()> {
        rule.validate_structure()?;
        if self.rules.contains_key(&rule.name) {
            return Err(SchemaError::DuplicateRule(rule.name));
        }
        self.rules.insert(rule.name.clone(), rule);
        Ok(())
    }

    /// Looks up a rule by name
    pub fn get(&self, name: &str) -> SchemaResult<&FieldRule> {
        self.rules
            .get(name)
            .ok_or_else(|| SchemaError::UnknownRule(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Rule names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Builds the standard catalog used by every entity schema.
    pub fn standard() -> SchemaResult<Self> {
        let mut catalog = Self::new();

        catalog.insert(
            FieldRule::new(rules::NOTE, ValueKind::Number)
                .check(Constraint::Min(0.0), "La note doit être supérieure ou égale à 0")
                .check(Constraint::Max(20.0), "La note ne peut pas dépasser 20"),
        )?;

        catalog.insert(
            FieldRule::new(rules::NOM, ValueKind::Text)
                .check(Constraint::MinLength(2), "Le nom doit contenir au moins 2 caractères")
                .check(Constraint::MaxLength(50), "Le nom ne peut pas dépasser 50 caractères")
                .check(
                    pattern(rules::NOM, NAME_PATTERN)?,
                    "Le nom ne peut contenir que des lettres, espaces, tirets et apostrophes",
                ),
        )?;

        catalog.insert(
            FieldRule::new(rules::EMAIL, ValueKind::Text)
                .check(Constraint::Email, "Adresse email invalide")
                .check(
                    Constraint::MaxLength(100),
                    "L'email ne peut pas dépasser 100 caractères",
                ),
        )?;

        catalog.insert(
            FieldRule::new(rules::CODE_ETUDIANT, ValueKind::Text)
                .check(
                    Constraint::MinLength(3),
                    "Le code étudiant doit contenir au moins 3 caractères",
                )
                .check(
                    Constraint::MaxLength(20),
                    "Le code étudiant ne peut pas dépasser 20 caractères",
                )
                .check(
                    pattern(rules::CODE_ETUDIANT, CODE_PATTERN)?,
                    "Le code étudiant ne peut contenir que des lettres, chiffres, tirets et underscores",
                ),
        )?;

        catalog.insert(
            FieldRule::new(rules::COEFFICIENT, ValueKind::Number)
                .check(Constraint::Min(0.1), "Le coefficient doit être au moins 0.1")
                .check(Constraint::Max(10.0), "Le coefficient ne peut pas dépasser 10"),
        )?;

        let earliest_birth = NaiveDate::from_ymd_opt(1900, 1, 1).ok_or_else(|| {
            SchemaError::InvalidRule {
                rule: rules::DATE_NAISSANCE.into(),
                reason: "invalid lower bound".into(),
            }
        })?;
        catalog.insert(
            FieldRule::new(rules::DATE_NAISSANCE, ValueKind::Date)
                .check(
                    Constraint::NotBefore(earliest_birth),
                    "La date de naissance doit être postérieure au 01/01/1900",
                )
                .check(
                    Constraint::NotInFuture,
                    "La date de naissance ne peut pas être dans le futur",
                ),
        )?;

        catalog.insert(
            FieldRule::new(rules::TELEPHONE, ValueKind::Text)
                .check(
                    pattern(rules::TELEPHONE, PHONE_PATTERN)?,
                    "Numéro de téléphone invalide",
                )
                .optional(),
        )?;

        catalog.insert(
            FieldRule::new(rules::MOT_DE_PASSE, ValueKind::Text)
                .check(
                    Constraint::MinLength(8),
                    "Le mot de passe doit contenir au moins 8 caractères",
                )
                .check(
                    Constraint::HasLowercase,
                    "Le mot de passe doit contenir au moins une minuscule",
                )
                .check(
                    Constraint::HasUppercase,
                    "Le mot de passe doit contenir au moins une majuscule",
                )
                .check(
                    Constraint::HasDigit,
                    "Le mot de passe doit contenir au moins un chiffre",
                ),
        )?;

        catalog.insert(
            FieldRule::new(rules::URL, ValueKind::Text)
                .check(Constraint::Url, "URL invalide")
                .optional(),
        )?;

        catalog.insert(
            FieldRule::new(rules::LIBELLE, ValueKind::Text)
                .check(
                    Constraint::MinLength(2),
                    "Le libellé doit contenir au moins 2 caractères",
                )
                .check(
                    Constraint::MaxLength(100),
                    "Le libellé ne peut pas dépasser 100 caractères",
                ),
        )?;

        catalog.insert(
            FieldRule::new(rules::CODE_COURS, ValueKind::Text)
                .check(
                    Constraint::MinLength(2),
                    "Le code du cours doit contenir au moins 2 caractères",
                )
                .check(
                    Constraint::MaxLength(20),
                    "Le code du cours ne peut pas dépasser 20 caractères",
                )
                .check(
                    pattern(rules::CODE_COURS, CODE_PATTERN)?,
                    "Le code du cours ne peut contenir que des lettres, chiffres, tirets et underscores",
                ),
        )?;

        catalog.insert(
            FieldRule::new(rules::DESCRIPTION, ValueKind::Text).check(
                Constraint::MaxLength(500),
                "La description ne peut pas dépasser 500 caractères",
            ),
        )?;

        catalog.insert(
            FieldRule::new(rules::COMMENTAIRE, ValueKind::Text).check(
                Constraint::MaxLength(500),
                "Le commentaire ne peut pas dépasser 500 caractères",
            ),
        )?;

        catalog.insert(
            FieldRule::new(rules::CREDITS, ValueKind::Number)
                .check(Constraint::Integer, "Le nombre de crédits doit être un entier")
                .check(Constraint::Min(1.0), "Le nombre de crédits doit être au moins 1")
                .check(Constraint::Max(10.0), "Le nombre de crédits ne peut pas dépasser 10"),
        )?;

        catalog.insert(
            FieldRule::new(rules::DUREE, ValueKind::Number)
                .check(Constraint::Integer, "La durée doit être un nombre entier de minutes")
                .check(Constraint::Min(15.0), "La durée doit être d'au moins 15 minutes")
                .check(Constraint::Max(480.0), "La durée ne peut pas dépasser 480 minutes"),
        )?;

        catalog.insert(FieldRule::new(rules::DATE, ValueKind::Date))?;
        catalog.insert(FieldRule::new(rules::BOOLEEN, ValueKind::Boolean))?;

        Ok(catalog)
    }
}

/// Compiles a pattern constraint, attributing failures to `rule`.
fn pattern(rule: &str, pattern: &str) -> SchemaResult<Constraint> {
    Regex::new(pattern)
        .map(Constraint::Pattern)
        .map_err(|e| SchemaError::InvalidRule {
            rule: rule.to_string(),
            reason: e.to_string(),
        })
}
