//! # Error Handling
//!
//! This module defines the centralized error type for `depfreeze`. It uses
//! `thiserror` to build a single `Error` enum covering every failure mode of
//! the library, and a `Result<T>` alias used throughout.
//!
//! The variants are grouped by how callers react to them:
//!
//! - **Input errors** (`NotADirectory`, `ManifestNotFound`, `Json`, `Config`,
//!   `Io`): reported immediately, nothing has been probed yet.
//! - **Subprocess errors** (`CommandSpawn`, `CommandFailed`): the program could
//!   not be started, or it ran and exited non-zero. These are kept apart so a
//!   caller can tell a missing tool from a failing query.
//! - **Probe errors** (`NotARepository`, `RepositoryNotFound`): a directory is
//!   not a checkout. Discovery uses these to classify dependencies as
//!   untracked instead of aborting.
//! - **Discovery errors** (`BuildTool`): the build tool failed; discovery is
//!   abandoned with no partial result.
//! - **Reconciliation errors** (`Precondition`, `Reconcile`): a batch was
//!   refused before any mutation, or a clone/checkout failed part way.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for depfreeze operations
#[derive(Error, Debug)]
pub enum Error {
    /// A path that must be an existing directory is not one.
    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// A directory exists but has no VCS metadata directory.
    #[error("Not a repository: {}", path.display())]
    NotARepository { path: PathBuf },

    /// The upward search for VCS metadata reached its stop directory.
    #[error("No repository found above {} (search stopped at {})", start.display(), stop.display())]
    RepositoryNotFound { start: PathBuf, stop: PathBuf },

    /// An external program could not be started at all.
    #[error("Failed to run {program}: {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external program ran and returned a non-zero exit code.
    #[error("{program} {} returns {code}{}", args.join(" "), if stderr.is_empty() { String::new() } else { format!(": {}", stderr) })]
    CommandFailed {
        program: String,
        args: Vec<String>,
        code: i32,
        stderr: String,
    },

    /// A build tool query failed during discovery.
    #[error("Build tool query '{query}' failed: {source}")]
    BuildTool {
        query: String,
        #[source]
        source: Box<Error>,
    },

    /// The manifest file does not exist.
    #[error("Manifest not found: {}", path.display())]
    ManifestNotFound { path: PathBuf },

    /// The settings file could not be parsed.
    #[error("Configuration error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// A reconciliation batch was refused before any command was issued.
    #[error("{message}:{}", paths.iter().map(|p| format!("\n    {}", p.display())).collect::<String>())]
    Precondition { message: String, paths: Vec<PathBuf> },

    /// A clone or checkout failed while a batch was being applied.
    #[error("Reconciliation failed at {}: {source}", path.display())]
    Reconcile {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON error from reading or writing a manifest.
    #[error("Manifest JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// True for the errors that mean "this directory is not a checkout".
    pub fn is_not_a_repository(&self) -> bool {
        matches!(
            self,
            Error::NotARepository { .. } | Error::RepositoryNotFound { .. }
        )
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
