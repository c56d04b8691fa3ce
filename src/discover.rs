//! # Dependency Discovery
//!
//! Builds a [`Discovery`] for a package directory:
//!
//! 1. Ask the build tool for the package's canonical import path and derive
//!    the workspace root by removing that path from the package directory.
//! 2. Ask the build tool for the transitive dependency names.
//! 3. Locate and probe the checkout that owns the package itself.
//! 4. Classify every dependency as builtin (no directory under the root),
//!    repository-backed (inside a checkout below the root), or untracked
//!    (on disk but outside any checkout).
//!
//! Repository-backed dependencies that live in the same checkout share a
//! single probed [`RepositoryState`] through an `Rc`, so each checkout is
//! probed once.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{info, warn};

use crate::command::{display_command, CommandRunner};
use crate::config::BuildToolSettings;
use crate::error::{Error, Result};
use crate::git::GitClient;
use crate::manifest::{from_slash, strip_one, to_slash, PackageSnapshot};
use crate::output::StatusWriter;
use crate::probe::{find_repository_home, probe, repository_order, RepositoryState};

/// How a dependency is provided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyKind {
    /// No directory under the workspace root; supplied by the toolchain.
    Builtin,
    /// Inside a checkout below the workspace root.
    Repository(Rc<RepositoryState>),
    /// On disk but not under version control.
    Untracked,
}

/// One entry of a package's dependency list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub kind: DependencyKind,
}

impl Dependency {
    pub fn repository(&self) -> Option<&Rc<RepositoryState>> {
        match &self.kind {
            DependencyKind::Repository(repo) => Some(repo),
            DependencyKind::Builtin | DependencyKind::Untracked => None,
        }
    }
}

/// The result of inventorying one package. Paths are absolute.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub package_dir: PathBuf,
    pub root_dir: PathBuf,
    pub import_path: String,
    pub target: Rc<RepositoryState>,
    pub dependencies: Vec<Dependency>,
}

impl Discovery {
    /// Distinct checkouts backing dependencies, shallow-first.
    pub fn dependency_repositories(&self) -> Vec<Rc<RepositoryState>> {
        let mut by_home: HashMap<&str, &Rc<RepositoryState>> = HashMap::new();
        for repo in self.dependencies.iter().filter_map(Dependency::repository) {
            by_home.entry(repo.home_dir.as_str()).or_insert(repo);
        }
        let mut repos: Vec<Rc<RepositoryState>> = by_home.into_values().cloned().collect();
        repos.sort_by(|a, b| repository_order(a, b));
        repos
    }

    /// Target and dependency checkouts, one per home directory.
    pub fn repositories(&self) -> Vec<Rc<RepositoryState>> {
        let mut repos = self.dependency_repositories();
        if !repos.iter().any(|r| r.home_dir == self.target.home_dir) {
            repos.push(Rc::clone(&self.target));
            repos.sort_by(|a, b| repository_order(a, b));
        }
        repos
    }

    fn names_of(&self, wanted: fn(&DependencyKind) -> bool) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .dependencies
            .iter()
            .filter(|d| wanted(&d.kind))
            .map(|d| d.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn builtin_names(&self) -> Vec<&str> {
        self.names_of(|k| matches!(k, DependencyKind::Builtin))
    }

    pub fn untracked_names(&self) -> Vec<&str> {
        self.names_of(|k| matches!(k, DependencyKind::Untracked))
    }

    /// The portable snapshot: paths relative to the workspace root, `/`
    /// separated.
    pub fn snapshot(&self) -> PackageSnapshot {
        let root = self.root_dir.to_string_lossy();
        PackageSnapshot {
            target_package: strip_one(
                &to_slash(&self.package_dir.to_string_lossy()),
                &to_slash(&root),
            ),
            target_git: self.target.relative_to(&root),
            gits: self
                .dependency_repositories()
                .iter()
                .map(|r| r.relative_to(&root))
                .collect(),
            dot_deps: self.dependencies.iter().map(|d| d.name.clone()).collect(),
        }
    }

    /// Human-readable summary of the package and its dependencies.
    pub fn summary(&self) -> String {
        let root = self.root_dir.to_string_lossy();
        let repos: Vec<RepositoryState> = self
            .repositories()
            .iter()
            .map(|r| r.relative_to(&root))
            .collect();

        let mut text = String::from("Package Summary\n");
        text.push_str(&format!("    home> {}\n", self.package_dir.display()));
        text.push_str(&format!("    root> {}\n", self.root_dir.display()));
        text.push_str("    repositories>\n");
        if !repos.is_empty() {
            let homes: Vec<&str> = repos.iter().map(|r| r.home_dir.as_str()).collect();
            text.push_str(&format!("        {}\n", homes.join(", ")));
        }
        text.push_str("    built ins>\n");
        let builtins = self.builtin_names();
        if !builtins.is_empty() {
            text.push_str(&format!("        {}\n", builtins.join(", ")));
        }
        text.push_str("    untracked>\n");
        let untracked = self.untracked_names();
        if !untracked.is_empty() {
            text.push_str(&format!("        {}\n", untracked.join(", ")));
        }
        text.push_str("\n    repository summary>\n");
        for repo in &repos {
            text.push_str(&format!(
                "        {}\n",
                repo.to_string().replace('\n', "\n        ")
            ));
        }
        text
    }
}

/// Removes `import_path` from the end of `package_dir` (or its first
/// occurrence) and trims trailing separators.
pub fn workspace_root(package_dir: &str, import_path: &str) -> String {
    let package_dir = to_slash(package_dir);
    let import_path = import_path.trim();
    let root = match package_dir.strip_suffix(import_path) {
        Some(root) => root.to_string(),
        None => package_dir.replacen(import_path, "", 1),
    };
    root.trim_end_matches(['/', '\\']).to_string()
}

/// Splits the build tool's dependency line, dropping a `[...]` wrapper.
pub fn parse_dependency_names(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_matches(['[', ']'])
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Inventories packages using a build tool and a VCS client.
pub struct Discoverer<'a> {
    runner: &'a dyn CommandRunner,
    build_tool: &'a BuildToolSettings,
    git: GitClient<'a>,
}

impl<'a> Discoverer<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        build_tool: &'a BuildToolSettings,
        vcs_program: &str,
    ) -> Self {
        Self {
            runner,
            build_tool,
            git: GitClient::new(runner, vcs_program),
        }
    }

    fn build_query(&self, dir: &Path, args: &[String]) -> Result<String> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner
            .run(dir, &self.build_tool.program, &args)
            .map(|output| output.stdout.trim().to_string())
            .map_err(|source| Error::BuildTool {
                query: display_command(&self.build_tool.program, &args),
                source: Box::new(source),
            })
    }

    /// Inventories the package at `package_dir`.
    pub fn discover<W: Write>(
        &self,
        package_dir: &Path,
        status: &mut StatusWriter<W>,
    ) -> Result<Discovery> {
        if !package_dir.is_dir() {
            return Err(Error::NotADirectory {
                path: package_dir.to_path_buf(),
            });
        }
        let package_dir = std::fs::canonicalize(package_dir)?;
        status.writeln(&format!(
            "Get package info for package @ {}",
            package_dir.display()
        ));

        let import_path = self.build_query(&package_dir, &self.build_tool.import_path_args)?;
        status.writeln(&format!("Import path -> {}", import_path));
        let root_dir = from_slash(&workspace_root(
            &package_dir.to_string_lossy(),
            &import_path,
        ));
        status.writeln(&format!("Root path @ {}", root_dir.display()));

        let raw_deps = self.build_query(&package_dir, &self.build_tool.deps_args)?;
        let names = parse_dependency_names(&raw_deps);
        status.writeln(&format!("Dependencies are: {}", names.join(", ")));

        let target_home = find_repository_home(&package_dir, &root_dir)?;
        let target = Rc::new(probe(&self.git, &target_home)?);
        status.writeln("Found package repository information");
        status.indent();
        status.write_repository(&target);
        status.outdent();

        let mut seen: HashMap<String, Rc<RepositoryState>> = HashMap::new();
        seen.insert(target.home_dir.clone(), Rc::clone(&target));

        status.writeln("Getting dependency information...");
        status.indent();
        let mut dependencies = Vec::with_capacity(names.len());
        for name in names {
            status.write(&format!("{}...", name));
            let kind = self.classify(&root_dir, &name, &mut seen, status)?;
            dependencies.push(Dependency { name, kind });
        }
        status.outdent();
        status.writeln("done");

        info!(
            "discovered {} dependencies for {}",
            dependencies.len(),
            import_path
        );
        Ok(Discovery {
            package_dir,
            root_dir,
            import_path,
            target,
            dependencies,
        })
    }

    fn classify<W: Write>(
        &self,
        root_dir: &Path,
        name: &str,
        seen: &mut HashMap<String, Rc<RepositoryState>>,
        status: &mut StatusWriter<W>,
    ) -> Result<DependencyKind> {
        let dep_dir = root_dir.join(from_slash(name));
        if !dep_dir.is_dir() {
            status.writeln("built in");
            return Ok(DependencyKind::Builtin);
        }

        let home = match find_repository_home(&dep_dir, root_dir) {
            Ok(home) => home,
            Err(e) if e.is_not_a_repository() => {
                warn!("{} is not under version control; it cannot be tracked", name);
                status.writeln("");
                status.warning(&format!(
                    "{} is not a builtin and not in a repository; untrackable",
                    name
                ));
                return Ok(DependencyKind::Untracked);
            }
            Err(e) => return Err(e),
        };

        let key = home.to_string_lossy().into_owned();
        if let Some(repo) = seen.get(&key) {
            status.writeln("repository (previously discovered)");
            return Ok(DependencyKind::Repository(Rc::clone(repo)));
        }
        let repo = Rc::new(probe(&self.git, &home)?);
        seen.insert(key, Rc::clone(&repo));
        status.writeln("repository");
        Ok(DependencyKind::Repository(repo))
    }
}
