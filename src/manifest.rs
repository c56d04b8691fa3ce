//! # Manifest Codec
//!
//! A manifest is a JSON rendering of a [`PackageSnapshot`]:
//!
//! ```json
//! {
//!   "TargetPackage": "github.com/acme/app",
//!   "TargetGit": { "HomeDir": "github.com/acme/app", "ParentDir": "github.com/acme", ... },
//!   "Gits": [ { "HomeDir": "github.com/acme/lib", ... } ],
//!   "DotDeps": ["fmt", "github.com/acme/lib"]
//! }
//! ```
//!
//! Paths inside a manifest are relative to the workspace root and always use
//! `/` separators. The helpers in this module do that conversion; they are
//! pure functions over strings so each entity applies them explicitly.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::probe::{repository_order, RepositoryState};

/// The unit persisted to a manifest file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageSnapshot {
    pub target_package: String,
    pub target_git: RepositoryState,
    /// Distinct repositories backing the dependencies.
    pub gits: Vec<RepositoryState>,
    /// Every dependency name, as reported by the build tool.
    pub dot_deps: Vec<String>,
}

impl PackageSnapshot {
    /// Target plus dependency repositories, one per home directory, in
    /// shallow-first order.
    pub fn repositories(&self) -> Vec<&RepositoryState> {
        let mut seen = HashSet::new();
        let mut repos: Vec<&RepositoryState> = std::iter::once(&self.target_git)
            .chain(self.gits.iter())
            .filter(|r| seen.insert(r.home_dir.clone()))
            .collect();
        repos.sort_by(|a, b| repository_order(a, b));
        repos
    }

    /// Home directories of repositories with local modifications.
    pub fn modified_repositories(&self) -> Vec<&RepositoryState> {
        self.repositories()
            .into_iter()
            .filter(|r| !r.is_clean())
            .collect()
    }

    /// Human-readable summary of the recorded package.
    pub fn summary(&self) -> String {
        let mut text = String::from("Manifest Summary\n");
        text.push_str(&format!("    package> {}\n", self.target_package));
        text.push_str(&format!("    dependencies> {}\n", self.dot_deps.len()));
        text.push_str("\n    repository summary>\n");
        for repo in self.repositories() {
            text.push_str(&format!(
                "        {}\n",
                repo.to_string().replace('\n', "\n        ")
            ));
        }
        text
    }
}

/// Removes the first occurrence of `prefix` from each path and trims leading
/// separators.
pub fn strip_prefix(paths: &[String], prefix: &str) -> Vec<String> {
    paths
        .iter()
        .map(|path| strip_one(path, prefix))
        .collect()
}

pub(crate) fn strip_one(path: &str, prefix: &str) -> String {
    let stripped = if prefix.is_empty() {
        path.to_string()
    } else {
        path.replacen(prefix, "", 1)
    };
    stripped.trim_start_matches(['/', '\\']).to_string()
}

/// Converts host separators to `/`.
pub fn to_slash(path: &str) -> String {
    if std::path::MAIN_SEPARATOR == '/' {
        path.to_string()
    } else {
        path.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// Converts `/` separators to the host convention.
pub fn from_slash(path: &str) -> PathBuf {
    if std::path::MAIN_SEPARATOR == '/' {
        PathBuf::from(path)
    } else {
        PathBuf::from(path.replace('/', std::path::MAIN_SEPARATOR_STR))
    }
}

impl RepositoryState {
    /// Copy with both path fields made relative to `root` and slash-separated.
    pub fn relative_to(&self, root: &str) -> RepositoryState {
        let paths = strip_prefix(
            &[to_slash(&self.home_dir), to_slash(&self.parent_dir)],
            &to_slash(root),
        );
        RepositoryState {
            home_dir: paths[0].clone(),
            parent_dir: paths[1].clone(),
            ..self.clone()
        }
    }
}

/// Serializes a snapshot to pretty JSON.
pub fn to_string(snapshot: &PackageSnapshot) -> Result<String> {
    let mut json = serde_json::to_string_pretty(snapshot)?;
    json.push('\n');
    Ok(json)
}

/// Parses a snapshot from JSON.
pub fn from_str(json: &str) -> Result<PackageSnapshot> {
    Ok(serde_json::from_str(json)?)
}

/// Writes a snapshot to `path`, replacing any existing file.
pub fn write(path: &Path, snapshot: &PackageSnapshot) -> Result<()> {
    std::fs::write(path, to_string(snapshot)?)?;
    Ok(())
}

/// Reads a snapshot from `path`.
pub fn read(path: &Path) -> Result<PackageSnapshot> {
    if !path.is_file() {
        return Err(Error::ManifestNotFound {
            path: path.to_path_buf(),
        });
    }
    from_str(&std::fs::read_to_string(path)?)
}
