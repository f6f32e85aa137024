//! gradebook CLI entry point
//!
//! Parses arguments, dispatches to the CLI module, reports fatal errors
//! as a JSON error document and exits non-zero. Exit codes:
//! - 0: everything accepted
//! - 1: the command could not run (config, I/O, input, schema)
//! - 2: at least one record was rejected

use gradebook::cli;

fn main() {
    match cli::run() {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            if cli::write_error(e.code_str(), &e.to_string()).is_err() {
                eprintln!("{}", e);
            }
            std::process::exit(1);
        }
    }
}
