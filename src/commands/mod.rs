//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `depfreeze` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and the shared
//!   [`Context`](crate::cli::Context) and performs the command's logic.
//!
//! Commands are thin: they resolve paths, build a status writer on stdout,
//! and call into the `depfreeze` library. An error a command has already
//! written to its trace is returned as [`Reported`], so `main` does not print
//! it a second time.

pub mod checkout;
pub mod generate;
pub mod make;
pub mod print;
pub mod rebuild;
pub mod tag;

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use depfreeze::error::Error;
use depfreeze::manifest::{self, PackageSnapshot};
use depfreeze::output::StatusWriter;

/// An error that is already in the status trace.
#[derive(Debug)]
pub(crate) struct Reported(pub(crate) Error);

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for Reported {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

/// Writes `err` to the trace and marks it as reported.
pub(crate) fn report<W: Write>(status: &mut StatusWriter<W>, err: Error) -> anyhow::Error {
    status.error(&err);
    Reported(err).into()
}

/// Loads a manifest, writing the same progress lines for every command.
pub(crate) fn load_manifest<W: Write>(
    file: &Path,
    status: &mut StatusWriter<W>,
) -> Result<PackageSnapshot> {
    status.write(&format!("Loading manifest @ {}...", file.display()));
    match manifest::read(file) {
        Ok(snapshot) => {
            status.writeln("done");
            Ok(snapshot)
        }
        Err(e) => {
            status.writeln("");
            Err(report(status, e))
        }
    }
}

/// Absolute form of `path`, for status messages and comparisons.
pub(crate) fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Invalid path: {}", path.display()))
}
