//! # depfreeze CLI
//!
//! This is the binary entry point for the `depfreeze` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Turning any error into an `ERROR:` line and exit code 1. Errors a command
//!   has already written to its trace are not printed again.
//!
//! The core logic lives in the `depfreeze` library crate; the binary is a thin
//! wrapper around it.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.downcast_ref::<commands::Reported>().is_none() {
                eprintln!("ERROR: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}
