//! # Repository Probe
//!
//! Reads the state of one checkout by running the VCS client's read-only
//! queries inside it, and locates the checkout that owns a directory by
//! walking upward until a metadata directory is found.
//!
//! Each query is allowed to fail on its own. A repository without an `origin`
//! remote, or without any tags to describe, still probes successfully with
//! those fields left empty. Only the absence of the metadata directory is
//! fatal.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::git::{has_metadata_dir, GitClient};

/// The observed (or desired) state of one checkout.
///
/// `status` holds the raw porcelain status. The empty string is the only
/// representation of "clean".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RepositoryState {
    pub home_dir: String,
    pub parent_dir: String,
    pub branch: String,
    pub hash: String,
    pub origin_url: String,
    pub describe: String,
    pub status: String,
}

impl RepositoryState {
    pub fn is_clean(&self) -> bool {
        self.status.is_empty()
    }

    /// Home directory converted to the host path convention.
    pub fn home_path(&self) -> PathBuf {
        crate::manifest::from_slash(&self.home_dir)
    }

    /// Last component of the home directory; the name a clone creates.
    pub fn dir_name(&self) -> String {
        self.home_path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl fmt::Display for RepositoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.home_dir)?;
        writeln!(f, "    origin> {}", self.origin_url)?;
        writeln!(f, "    branch> {}", self.branch)?;
        writeln!(f, "    hash> {}", self.hash)?;
        write!(f, "    describe> {}", self.describe)
    }
}

/// Orders repositories shallowest first, then lexically by home directory.
pub fn repository_order(a: &RepositoryState, b: &RepositoryState) -> Ordering {
    let depth = |r: &RepositoryState| r.home_dir.replace('\\', "/").matches('/').count();
    depth(a)
        .cmp(&depth(b))
        .then_with(|| a.home_dir.cmp(&b.home_dir))
}

/// Extracts the current branch from `branch` output.
///
/// The current line is the one starting with `*`. The marker and any
/// parentheses (used for detached HEAD) are removed, so
/// `* (HEAD detached at abc1234)` yields `HEAD detached at abc1234`.
pub fn parse_current_branch(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix('*'))
        .map(|current| {
            current
                .chars()
                .filter(|c| *c != '(' && *c != ')')
                .collect::<String>()
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

/// Probes the checkout whose home directory is `path`.
pub fn probe(git: &GitClient<'_>, path: &Path) -> Result<RepositoryState> {
    if !path.is_dir() {
        return Err(Error::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    if !has_metadata_dir(path) {
        return Err(Error::NotARepository {
            path: path.to_path_buf(),
        });
    }

    let tolerate = |what: &str, result: Result<String>| match result {
        Ok(value) => value,
        Err(e) => {
            debug!("{} query failed in {}: {}", what, path.display(), e);
            String::new()
        }
    };

    let branches = tolerate("branch", git.branch_list(path));
    let origin_url = tolerate("origin", git.origin_url(path));
    let hash = tolerate("hash", git.head_hash(path));
    let status = tolerate("status", git.status(path));
    let describe = tolerate("describe", git.describe(path));

    Ok(RepositoryState {
        home_dir: path.to_string_lossy().into_owned(),
        parent_dir: path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default(),
        branch: parse_current_branch(&branches),
        hash: hash.trim().to_string(),
        origin_url: origin_url.trim().to_string(),
        describe: describe.trim().to_string(),
        status: status.trim().to_string(),
    })
}

/// Walks upward from `start` looking for a directory with VCS metadata.
///
/// The search stops with [`Error::RepositoryNotFound`] on reaching `stop`;
/// `stop` itself is never considered.
pub fn find_repository_home(start: &Path, stop: &Path) -> Result<PathBuf> {
    for dir in [start, stop] {
        if !dir.is_dir() {
            return Err(Error::NotADirectory {
                path: dir.to_path_buf(),
            });
        }
    }

    let mut current = Some(start);
    while let Some(dir) = current {
        if dir == stop {
            break;
        }
        if has_metadata_dir(dir) {
            return Ok(dir.to_path_buf());
        }
        current = dir.parent();
    }

    Err(Error::RepositoryNotFound {
        start: start.to_path_buf(),
        stop: stop.to_path_buf(),
    })
}
