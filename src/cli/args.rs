//! CLI argument definitions using clap
//!
//! Commands:
//! - gradebook validate --entity <entity> [--input <path>]
//! - gradebook import --entity <entity> [--input <path>]
//! - gradebook schemas
//! - gradebook check-field --rule <name> --value <json>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::schema::Entity;

/// gradebook - validate grade-management records
#[derive(Parser, Debug)]
#[command(name = "gradebook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a single JSON record
    Validate {
        /// Entity schema to validate against
        #[arg(long)]
        entity: Entity,
        /// JSON file to read (stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Validate a batch of rows (NDJSON or a JSON array)
    Import {
        /// Entity schema to validate against
        #[arg(long)]
        entity: Entity,
        /// Rows file to read (stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// List registered entity schemas and their fields
    Schemas,

    /// Check one value against one catalog rule
    CheckField {
        /// Catalog rule name (e.g. "email", "motDePasse")
        #[arg(long)]
        rule: String,
        /// Value as JSON; anything that is not valid JSON is taken as a string
        #[arg(long)]
        value: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from(["gradebook", "validate", "--entity", "grade"]).unwrap();
        match cli.command {
            Command::Validate { entity, input } => {
                assert_eq!(entity, Entity::Grade);
                assert!(input.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_config() {
        let cli = Cli::try_parse_from([
            "gradebook",
            "import",
            "--entity",
            "institution-configuration",
            "--config",
            "gradebook.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("gradebook.json")));
    }

    #[test]
    fn test_unknown_entity_rejected() {
        assert!(Cli::try_parse_from(["gradebook", "validate", "--entity", "parent"]).is_err());
    }
}
