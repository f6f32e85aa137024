//! CLI command implementations
//!
//! Commands are thin adapters: read JSON, hand it to the engine, write the
//! engine's result as JSON. The registry is built once per process, up
//! front, so a malformed schema fails before any input is read.

use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::import::{validate_rows, AcceptedRow, ImportReport, RejectedRow};
use crate::schema::{
    catalog, validate_field, Entity, FieldType, Schema, SchemaRegistry, SchemaValidator,
    Validation, ValidationErrors,
};

use super::args::{Cli, Command};
use super::config::{GradebookConfig, LOG_ENV};
use super::errors::CliResult;
use super::io::{parse_record, parse_rows, read_input, write_json};

/// How a successfully executed command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Everything validated
    Accepted,
    /// At least one record or row was rejected
    Rejected,
}

impl Outcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Accepted => 0,
            Outcome::Rejected => 2,
        }
    }
}

/// Parse arguments and run the selected command
pub fn run() -> CliResult<Outcome> {
    run_command(Cli::parse_args())
}

/// Run a parsed command
pub fn run_command(cli: Cli) -> CliResult<Outcome> {
    let config = GradebookConfig::load_or_default(cli.config.as_deref())?;
    init_logging(&config.log_filter);

    let registry = SchemaRegistry::standard()?;
    debug!("schema registry ready");

    match cli.command {
        Command::Validate { entity, input } => validate(&registry, entity, input.as_deref()),
        Command::Import { entity, input } => import(&registry, &config, entity, input.as_deref()),
        Command::Schemas => {
            write_json(&describe_schemas(&registry))?;
            Ok(Outcome::Accepted)
        }
        Command::CheckField { rule, value } => {
            let result = check_field(&rule, &value)?;
            write_json(&result)?;
            Ok(outcome_of(&result))
        }
    }
}

/// Install the stderr subscriber. `GRADEBOOK_LOG` wins over `filter`.
pub fn init_logging(filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(filter));

    // Already installed when called twice in one process; keep the first.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// `gradebook validate`
pub fn validate(registry: &SchemaRegistry, entity: Entity, input: Option<&Path>) -> CliResult<Outcome> {
    let record = parse_record(&read_input(input)?)?;
    let result = SchemaValidator::new(registry).validate(entity, &record);

    info!(%entity, accepted = result.is_accepted(), "record validated");
    write_json(&result)?;

    Ok(outcome_of(&result))
}

/// Import output written to stdout
#[derive(Debug, Serialize)]
pub struct ImportOutput {
    pub entity: String,
    pub summary: ImportSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted: Option<Vec<AcceptedRow>>,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub truncated: usize,
}

impl ImportOutput {
    pub fn from_report(report: ImportReport, include_accepted: bool) -> Self {
        Self {
            summary: ImportSummary {
                accepted: report.accepted.len(),
                rejected: report.rejected.len(),
                truncated: report.truncated,
            },
            entity: report.entity,
            accepted: include_accepted.then_some(report.accepted),
            rejected: report.rejected,
        }
    }
}

/// `gradebook import`
pub fn import(
    registry: &SchemaRegistry,
    config: &GradebookConfig,
    entity: Entity,
    input: Option<&Path>,
) -> CliResult<Outcome> {
    let rows = parse_rows(&read_input(input)?)?;
    let report = validate_rows(registry.get(entity), &rows, &config.import_options());
    let outcome = if report.is_clean() {
        Outcome::Accepted
    } else {
        Outcome::Rejected
    };

    write_json(&ImportOutput::from_report(report, config.include_accepted))?;

    Ok(outcome)
}

/// `gradebook check-field`: one catalog rule against one value.
///
/// Errors are keyed by the rule name.
pub fn check_field(rule: &str, raw: &str) -> CliResult<Validation<Value>> {
    let rule = catalog().get(rule)?;
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    Ok(match validate_field(rule, &value) {
        Ok(data) => Validation::Accepted { data },
        Err(error) => {
            let mut errors = ValidationErrors::new();
            errors.insert(rule.name.clone(), error);
            Validation::Rejected { errors }
        }
    })
}

/// `gradebook schemas`: every entity with its field listing
pub fn describe_schemas(registry: &SchemaRegistry) -> Value {
    Value::Array(
        registry
            .iter()
            .map(|(entity, schema)| {
                json!({
                    "entity": entity.name(),
                    "fields": describe_fields(schema),
                })
            })
            .collect(),
    )
}

fn describe_fields(schema: &Schema) -> Value {
    Value::Array(
        schema
            .fields
            .iter()
            .map(|(name, def)| {
                let mut field = json!({
                    "name": name,
                    "type": def.field_type.type_name(),
                    "required": def.required,
                });
                if let Some(default) = &def.default {
                    field["default"] = default.clone();
                }
                match &def.field_type {
                    FieldType::Rule(rule) => field["rule"] = json!(rule.name),
                    FieldType::Enum(values) => field["values"] = json!(values),
                    FieldType::Object(nested) => field["fields"] = describe_fields(nested),
                }
                field
            })
            .collect(),
    )
}

fn outcome_of<T>(result: &Validation<T>) -> Outcome {
    if result.is_accepted() {
        Outcome::Accepted
    } else {
        Outcome::Rejected
    }
}
