//! # depfreeze
//!
//! This library inventories the version-control dependencies of a package,
//! freezes that inventory into a JSON manifest, and later rebuilds or
//! reconciles a directory tree against the manifest. It is used by the
//! `depfreeze` command-line tool but can be driven directly.
//!
//! ## Quick Example
//!
//! ```
//! use depfreeze::manifest::{self, PackageSnapshot};
//! use depfreeze::probe::RepositoryState;
//!
//! let snapshot = PackageSnapshot {
//!     target_package: "github.com/acme/app".to_string(),
//!     target_git: RepositoryState {
//!         home_dir: "github.com/acme/app".to_string(),
//!         hash: "1f2e3d".to_string(),
//!         ..RepositoryState::default()
//!     },
//!     gits: vec![],
//!     dot_deps: vec!["fmt".to_string()],
//! };
//!
//! let json = manifest::to_string(&snapshot).unwrap();
//! assert!(json.contains("\"TargetPackage\""));
//! assert_eq!(manifest::from_str(&json).unwrap(), snapshot);
//! ```
//!
//! ## Core Concepts
//!
//! - **Command execution (`command`, `git`)**: every external program runs
//!   through the [`command::CommandRunner`] trait with an explicit working
//!   directory. [`git::GitClient`] builds the VCS command lines.
//! - **Probing (`probe`)**: reads branch, hash, origin, descriptor, and status
//!   of one checkout, and finds the checkout that owns a directory.
//! - **Discovery (`discover`)**: asks the build tool for a package's
//!   dependencies and classifies each one as builtin, repository-backed, or
//!   untracked.
//! - **Manifest (`manifest`)**: the persisted [`manifest::PackageSnapshot`].
//! - **Reconciliation (`reconcile`)**: classifies every recorded repository
//!   against the disk, refuses unsafe batches up front, then clones and checks
//!   out.
//! - **Generation (`generate`)**: renders a manifest into a version-constant
//!   source file.
//!
//! ## Execution Flow
//!
//! 1.  **Make**: discover the package, summarize it, write the manifest.
//! 2.  **Rebuild**: on an empty tree, clone every repository and check out
//!     its recorded hash.
//! 3.  **Checkout**: on an existing tree, clone what is missing and move clean
//!     repositories to their recorded hash.

pub mod command;
pub mod config;
pub mod discover;
pub mod error;
pub mod generate;
pub mod git;
pub mod manifest;
pub mod output;
pub mod probe;
pub mod reconcile;

#[cfg(test)]
mod path_proptest;
