//! # Reconciliation Engine
//!
//! Compares the repositories recorded in a [`PackageSnapshot`] with what is on
//! disk under an output root, and brings the tree in line by cloning and
//! checking out through the VCS client.
//!
//! Every operation runs in two strictly ordered stages:
//!
//! 1. **Classify** every desired repository (read-only) and check the
//!    operation's preconditions against the whole set.
//! 2. **Execute** the plan, one repository at a time.
//!
//! If any precondition fails, stage 2 never starts and no mutating command is
//! issued for any repository. A failure during stage 2 stops the batch
//! immediately; repositories already handled are left as they are.
//!
//! | Status            | `rebuild` | `checkout`          |
//! |-------------------|-----------|---------------------|
//! | `Missing`         | clone     | clone + checkout    |
//! | `CleanMatching`   | abort     | skip                |
//! | `CleanMismatched` | abort     | checkout            |
//! | `Dirty`           | abort     | abort               |
//! | `NotARepository`  | abort     | abort               |
//!
//! Only the hash is ever checked out; no branch switch is issued, so the
//! result may be a detached HEAD. A mismatch in branch alone is therefore
//! reported in the plan but skipped, which keeps a second `checkout` free of
//! mutating commands.

use std::fmt;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use log::info;

use crate::error::{Error, Result};
use crate::git::GitClient;
use crate::manifest::PackageSnapshot;
use crate::output::StatusWriter;
use crate::probe::{probe, RepositoryState};

/// Observed state of one desired repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryStatus {
    /// Nothing exists at the path.
    Missing,
    /// A clean checkout at the recorded branch and hash.
    CleanMatching,
    /// A clean checkout whose branch, hash, or both differ.
    CleanMismatched {
        branch_differs: bool,
        hash_differs: bool,
        observed_branch: String,
        observed_hash: String,
    },
    /// A checkout with local modifications.
    Dirty { status: String },
    /// Something exists at the path but it is not a checkout.
    NotARepository,
}

impl RepositoryStatus {
    fn label(&self) -> &'static str {
        match self {
            RepositoryStatus::Missing => "missing",
            RepositoryStatus::CleanMatching => "clean, matching",
            RepositoryStatus::CleanMismatched { .. } => "clean, mismatched",
            RepositoryStatus::Dirty { .. } => "local modifications",
            RepositoryStatus::NotARepository => "not a repository",
        }
    }
}

impl fmt::Display for RepositoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One desired repository with its resolved path and observed status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRepository {
    pub desired: RepositoryState,
    /// Absolute location under the output root.
    pub path: PathBuf,
    pub status: RepositoryStatus,
}

/// Classification of every distinct repository in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub repositories: Vec<ClassifiedRepository>,
}

impl Classification {
    /// Status of the repository recorded with `home_dir`.
    pub fn status_of(&self, home_dir: &str) -> Option<&RepositoryStatus> {
        self.repositories
            .iter()
            .find(|r| r.desired.home_dir == home_dir)
            .map(|r| &r.status)
    }

    fn paths_where(&self, pred: impl Fn(&RepositoryStatus) -> bool) -> Vec<PathBuf> {
        self.repositories
            .iter()
            .filter(|r| pred(&r.status))
            .map(|r| r.path.clone())
            .collect()
    }
}

/// What the engine does for one repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Clone at the recorded branch, then checkout the recorded hash.
    CloneAndCheckout,
    /// Checkout the recorded hash in the existing checkout.
    Checkout,
    /// Already reconciled; no command.
    Skip,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::CloneAndCheckout => "clone",
            Action::Checkout => "checkout",
            Action::Skip => "skip",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub repository: ClassifiedRepository,
    pub action: Action,
}

/// An ordered list of steps that passed the precondition check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub steps: Vec<Step>,
}

impl Plan {
    /// Plan for `rebuild`: every repository must be missing.
    pub fn rebuild(classification: &Classification) -> Result<Plan> {
        let existing =
            classification.paths_where(|s| !matches!(s, RepositoryStatus::Missing));
        if !existing.is_empty() {
            return Err(Error::Precondition {
                message: "The following directories already exist".to_string(),
                paths: existing,
            });
        }
        Ok(Plan {
            steps: classification
                .repositories
                .iter()
                .map(|r| Step {
                    repository: r.clone(),
                    action: Action::CloneAndCheckout,
                })
                .collect(),
        })
    }

    /// Plan for `checkout`: nothing may be dirty or a non-repository.
    pub fn checkout(classification: &Classification) -> Result<Plan> {
        let blocked = classification.paths_where(|s| {
            matches!(
                s,
                RepositoryStatus::Dirty { .. } | RepositoryStatus::NotARepository
            )
        });
        if !blocked.is_empty() {
            return Err(Error::Precondition {
                message:
                    "Local modifications or non-repository directories prevent checkout"
                        .to_string(),
                paths: blocked,
            });
        }
        Ok(Plan {
            steps: classification
                .repositories
                .iter()
                .map(|r| Step {
                    repository: r.clone(),
                    action: match r.status {
                        RepositoryStatus::Missing => Action::CloneAndCheckout,
                        RepositoryStatus::CleanMismatched {
                            hash_differs: true, ..
                        } => Action::Checkout,
                        _ => Action::Skip,
                    },
                })
                .collect(),
        })
    }

    /// Number of steps that will run a command.
    pub fn mutating_steps(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.action != Action::Skip)
            .count()
    }
}

/// What was done, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub outcomes: Vec<(PathBuf, Action)>,
}

impl Report {
    pub fn count(&self, action: Action) -> usize {
        self.outcomes.iter().filter(|(_, a)| *a == action).count()
    }
}

/// Drives classification and the clone/checkout batches.
pub struct Reconciler<'a> {
    git: GitClient<'a>,
}

impl<'a> Reconciler<'a> {
    pub fn new(git: GitClient<'a>) -> Self {
        Self { git }
    }

    /// Classifies every distinct repository of `snapshot` under `output_root`.
    ///
    /// Read-only: only the VCS client's query commands are run. Every home
    /// must be a relative path that stays inside `output_root`; if any does
    /// not, nothing is probed and all of them are reported together.
    pub fn classify(&self, snapshot: &PackageSnapshot, output_root: &Path) -> Result<Classification> {
        if !output_root.is_dir() {
            return Err(Error::NotADirectory {
                path: output_root.to_path_buf(),
            });
        }
        let output_root = std::fs::canonicalize(output_root)?;

        let desired = snapshot.repositories();
        let escaping: Vec<PathBuf> = desired
            .iter()
            .map(|r| r.home_path())
            .filter(|home| !is_below_root(home))
            .collect();
        if !escaping.is_empty() {
            return Err(Error::Precondition {
                message: "The following homes are not relative paths inside the output root"
                    .to_string(),
                paths: escaping,
            });
        }

        let repositories = desired
            .into_iter()
            .map(|desired| {
                let path = output_root.join(desired.home_path());
                let status = self.observe(desired, &path);
                ClassifiedRepository {
                    desired: desired.clone(),
                    path,
                    status,
                }
            })
            .collect();
        Ok(Classification { repositories })
    }

    fn observe(&self, desired: &RepositoryState, path: &Path) -> RepositoryStatus {
        if !path.exists() {
            return RepositoryStatus::Missing;
        }
        let observed = match probe(&self.git, path) {
            Ok(observed) => observed,
            Err(_) => return RepositoryStatus::NotARepository,
        };
        if !observed.is_clean() {
            return RepositoryStatus::Dirty {
                status: observed.status,
            };
        }
        let branch_differs = observed.branch != desired.branch;
        let hash_differs = observed.hash != desired.hash;
        if !branch_differs && !hash_differs {
            RepositoryStatus::CleanMatching
        } else {
            RepositoryStatus::CleanMismatched {
                branch_differs,
                hash_differs,
                observed_branch: observed.branch,
                observed_hash: observed.hash,
            }
        }
    }

    /// Clones every repository of `snapshot` into an output root where none
    /// of them exist yet.
    ///
    /// Any error returned here has already been written to `status`.
    pub fn rebuild<W: Write>(
        &self,
        snapshot: &PackageSnapshot,
        output_root: &Path,
        status: &mut StatusWriter<W>,
    ) -> Result<Report> {
        status.write("Checking for directory collisions...");
        let plan = match self
            .classify(snapshot, output_root)
            .and_then(|classification| Plan::rebuild(&classification))
        {
            Ok(plan) => plan,
            Err(e) => {
                status.writeln("");
                status.error(&e);
                return Err(e);
            }
        };
        status.writeln("done");
        self.run(&plan, status)
    }

    /// Brings every repository of `snapshot` to its recorded hash, cloning
    /// the missing ones.
    ///
    /// Any error returned here has already been written to `status`.
    pub fn checkout<W: Write>(
        &self,
        snapshot: &PackageSnapshot,
        output_root: &Path,
        status: &mut StatusWriter<W>,
    ) -> Result<Report> {
        status.write("Gathering summary...");
        let classification = match self.classify(snapshot, output_root) {
            Ok(classification) => classification,
            Err(e) => {
                status.writeln("");
                status.error(&e);
                return Err(e);
            }
        };
        let plan = match Plan::checkout(&classification) {
            Ok(plan) => plan,
            Err(e) => {
                status.writeln("");
                report_blocked(&classification, status);
                return Err(e);
            }
        };
        status.writeln("done");
        self.run(&plan, status)
    }

    fn run<W: Write>(&self, plan: &Plan, status: &mut StatusWriter<W>) -> Result<Report> {
        self.describe_plan(plan, status);
        status.writeln("");
        status.heading("Performing work...");
        status.indent();
        let report = self.execute(plan, status);
        status.outdent();
        let report = report?;
        status.writeln("done");
        info!(
            "reconciled {} repositories ({} cloned, {} checked out, {} skipped)",
            report.outcomes.len(),
            report.count(Action::CloneAndCheckout),
            report.count(Action::Checkout),
            report.count(Action::Skip)
        );
        Ok(report)
    }

    fn describe_plan<W: Write>(&self, plan: &Plan, status: &mut StatusWriter<W>) {
        status.writeln("");
        status.heading("What will be done:");
        status.indent();
        for step in &plan.steps {
            let repo = &step.repository;
            match (&step.action, &repo.status) {
                (Action::CloneAndCheckout, _) => {
                    status.writeln(&format!("{} will be cloned", repo.path.display()));
                }
                (
                    Action::Checkout,
                    RepositoryStatus::CleanMismatched {
                        branch_differs,
                        hash_differs,
                        observed_branch,
                        observed_hash,
                    },
                ) => {
                    status.writeln(&repo.path.display().to_string());
                    status.indent();
                    if *branch_differs {
                        status.writeln(&format!(
                            "branch differs: {} (recorded {}); not switched",
                            observed_branch, repo.desired.branch
                        ));
                    }
                    if *hash_differs {
                        status.writeln(&format!(
                            "switch hash from {} to {}",
                            observed_hash, repo.desired.hash
                        ));
                    }
                    status.outdent();
                }
                (Action::Checkout, _) => {
                    status.writeln(&format!(
                        "{} will be checked out",
                        repo.path.display()
                    ));
                }
                (
                    Action::Skip,
                    RepositoryStatus::CleanMismatched {
                        observed_branch, ..
                    },
                ) => {
                    status.writeln(&repo.path.display().to_string());
                    status.indent();
                    status.writeln(&format!(
                        "branch differs: {} (recorded {}); hash is current, nothing to do",
                        observed_branch, repo.desired.branch
                    ));
                    status.outdent();
                }
                (Action::Skip, _) => {
                    status.writeln(&repo.path.display().to_string());
                    status.indent();
                    status.writeln("branch and hash are current; nothing to do");
                    status.outdent();
                }
            }
        }
        status.outdent();
    }

    fn execute<W: Write>(&self, plan: &Plan, status: &mut StatusWriter<W>) -> Result<Report> {
        let mut report = Report::default();
        for step in &plan.steps {
            let repo = &step.repository;
            status.writeln(&repo.path.display().to_string());
            status.indent();
            let result = match step.action {
                Action::Skip => {
                    status.writeln("skipping");
                    Ok(())
                }
                Action::CloneAndCheckout => self
                    .clone_into(repo, status)
                    .and_then(|()| self.checkout_hash(repo, status)),
                Action::Checkout => self.checkout_hash(repo, status),
            };
            if let Err(source) = result {
                let err = Error::Reconcile {
                    path: repo.path.clone(),
                    source: Box::new(source),
                };
                status.error(&err);
                status.outdent();
                return Err(err);
            }
            if step.action != Action::Skip {
                status.writeln("done");
            }
            status.outdent();
            report.outcomes.push((repo.path.clone(), step.action));
        }
        Ok(report)
    }

    fn clone_into<W: Write>(
        &self,
        repo: &ClassifiedRepository,
        status: &mut StatusWriter<W>,
    ) -> Result<()> {
        let parent = repo.path.parent().ok_or_else(|| Error::NotADirectory {
            path: repo.path.clone(),
        })?;
        if !parent.is_dir() {
            std::fs::create_dir_all(parent)?;
        }
        let dir_name = repo
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| repo.desired.dir_name());
        let desired = &repo.desired;
        status.writeln(&self.git.clone_display(&desired.branch, &desired.origin_url, &dir_name));
        self.git
            .clone(parent, &desired.branch, &desired.origin_url, &dir_name)
    }

    fn checkout_hash<W: Write>(
        &self,
        repo: &ClassifiedRepository,
        status: &mut StatusWriter<W>,
    ) -> Result<()> {
        if repo.desired.hash.is_empty() {
            status.warning("no hash recorded; leaving the clone at its default head");
            return Ok(());
        }
        status.writeln(&self.git.checkout_display(&repo.desired.hash));
        self.git.checkout(&repo.path, &repo.desired.hash)
    }
}

/// True when `home` names a directory strictly below the output root.
fn is_below_root(home: &Path) -> bool {
    let mut named = false;
    for component in home.components() {
        match component {
            Component::Normal(_) => named = true,
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) | Component::ParentDir => return false,
        }
    }
    named
}

/// Writes the dirty and non-repository groups of a refused checkout.
fn report_blocked<W: Write>(classification: &Classification, status: &mut StatusWriter<W>) {
    let dirty = classification.paths_where(|s| matches!(s, RepositoryStatus::Dirty { .. }));
    let not_repos =
        classification.paths_where(|s| matches!(s, RepositoryStatus::NotARepository));
    if !dirty.is_empty() {
        status.error(&"The following repositories have local modifications:");
        status.indent();
        for path in &dirty {
            status.writeln(&path.display().to_string());
        }
        status.outdent();
    }
    if !not_repos.is_empty() {
        status.error(&"The following directories already exist but are not a repository:");
        status.indent();
        for path in &not_repos {
            status.writeln(&path.display().to_string());
        }
        status.outdent();
    }
}
