//! VCS client invocations.
//!
//! [`GitClient`] knows the command lines for the five read-only queries used by
//! the probe and for the two mutating operations used by reconciliation
//! (`clone` and `checkout`). It delegates execution to a [`CommandRunner`].

use std::path::Path;

use crate::command::{display_command, CommandRunner};
use crate::error::Result;

/// Name of the metadata directory that marks a checkout.
pub const VCS_METADATA_DIR: &str = ".git";

const BRANCH_ARGS: &[&str] = &["branch"];
const ORIGIN_ARGS: &[&str] = &["config", "--get", "remote.origin.url"];
const HASH_ARGS: &[&str] = &["rev-parse", "HEAD"];
const STATUS_ARGS: &[&str] = &["status", "--porcelain"];
const DESCRIBE_ARGS: &[&str] = &["describe", "--tags", "--abbrev=8", "--always", "--long"];

/// Returns true if `dir` contains a VCS metadata directory.
pub fn has_metadata_dir(dir: &Path) -> bool {
    dir.join(VCS_METADATA_DIR).is_dir()
}

/// True when a recorded branch can be passed to `clone -b`.
///
/// Detached checkouts are recorded with a `HEAD detached ...` description,
/// which is not a branch name.
pub fn is_clonable_branch(branch: &str) -> bool {
    let branch = branch.trim();
    !branch.is_empty() && !branch.starts_with("HEAD detached") && !branch.contains(' ')
}

/// Builds and runs VCS client command lines.
pub struct GitClient<'a> {
    runner: &'a dyn CommandRunner,
    program: String,
}

impl<'a> GitClient<'a> {
    pub fn new(runner: &'a dyn CommandRunner, program: impl Into<String>) -> Self {
        Self {
            runner,
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn query(&self, dir: &Path, args: &[&str]) -> Result<String> {
        Ok(self.runner.run(dir, &self.program, args)?.stdout)
    }

    /// Raw `branch` output, one name per line, current one marked with `*`.
    pub fn branch_list(&self, dir: &Path) -> Result<String> {
        self.query(dir, BRANCH_ARGS)
    }

    pub fn origin_url(&self, dir: &Path) -> Result<String> {
        self.query(dir, ORIGIN_ARGS)
    }

    pub fn head_hash(&self, dir: &Path) -> Result<String> {
        self.query(dir, HASH_ARGS)
    }

    /// Porcelain status; empty means clean.
    pub fn status(&self, dir: &Path) -> Result<String> {
        self.query(dir, STATUS_ARGS)
    }

    pub fn describe(&self, dir: &Path) -> Result<String> {
        self.query(dir, DESCRIBE_ARGS)
    }

    /// Arguments for cloning `url` into `dir_name`, at `branch` when it is usable.
    pub fn clone_args<'b>(branch: &'b str, url: &'b str, dir_name: &'b str) -> Vec<&'b str> {
        let mut args = vec!["clone"];
        if is_clonable_branch(branch) {
            args.push("-b");
            args.push(branch.trim());
        }
        args.push(url);
        args.push(dir_name);
        args
    }

    /// Printable form of a clone command.
    pub fn clone_display(&self, branch: &str, url: &str, dir_name: &str) -> String {
        display_command(&self.program, &Self::clone_args(branch, url, dir_name))
    }

    /// Clones `url` into `parent/dir_name`. Mutating.
    pub fn clone(&self, parent: &Path, branch: &str, url: &str, dir_name: &str) -> Result<()> {
        self.runner
            .run(parent, &self.program, &Self::clone_args(branch, url, dir_name))?;
        Ok(())
    }

    pub fn checkout_display(&self, hash: &str) -> String {
        display_command(&self.program, &["checkout", hash])
    }

    /// Checks out `hash` inside `home`. Mutating.
    pub fn checkout(&self, home: &Path, hash: &str) -> Result<()> {
        self.runner.run(home, &self.program, &["checkout", hash])?;
        Ok(())
    }

    /// Creates an annotated tag at HEAD.
    pub fn tag_annotated(&self, home: &Path, tag: &str, message: &str) -> Result<()> {
        self.runner
            .run(home, &self.program, &["tag", "-a", tag, "-m", message])?;
        Ok(())
    }

    pub fn push_tag(&self, home: &Path, remote: &str, tag: &str) -> Result<()> {
        self.runner.run(home, &self.program, &["push", remote, tag])?;
        Ok(())
    }
}

/// An in-memory stand-in for the VCS client and build tool.
///
/// Repositories live in a map keyed by home directory; `clone` also creates
/// the home directory and its metadata directory on disk so that later
/// filesystem checks see it. Every invocation is recorded.
#[cfg(test)]
pub(crate) mod fake {
    use std::collections::{HashMap, HashSet};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use crate::command::{CommandOutput, CommandRunner};
    use crate::error::{Error, Result};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Call {
        pub dir: PathBuf,
        pub program: String,
        pub args: Vec<String>,
    }

    impl Call {
        pub fn is_mutating(&self) -> bool {
            matches!(
                self.args.first().map(String::as_str),
                Some("clone") | Some("checkout")
            )
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct FakeRepo {
        pub branch: String,
        pub hash: String,
        pub origin: String,
        pub describe: String,
        pub status: String,
    }

    #[derive(Default)]
    pub struct FakeWorld {
        repos: Mutex<HashMap<PathBuf, FakeRepo>>,
        remotes: Mutex<HashMap<String, FakeRepo>>,
        outputs: Mutex<HashMap<String, std::result::Result<String, i32>>>,
        failing: Mutex<HashSet<String>>,
        calls: Mutex<Vec<Call>>,
    }

    fn fail(program: &str, args: &[&str], code: i32) -> Error {
        Error::CommandFailed {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            code,
            stderr: String::new(),
        }
    }

    impl FakeWorld {
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers a checkout at `home` and creates it on disk.
        pub fn add_repo(&self, home: &Path, repo: FakeRepo) {
            std::fs::create_dir_all(home.join(super::VCS_METADATA_DIR)).unwrap();
            self.repos.lock().unwrap().insert(home.to_path_buf(), repo);
        }

        /// Registers what a clone of `url` produces.
        pub fn add_remote(&self, url: &str, repo: FakeRepo) {
            self.remotes.lock().unwrap().insert(url.to_string(), repo);
        }

        pub fn set_status(&self, home: &Path, status: &str) {
            if let Some(repo) = self.repos.lock().unwrap().get_mut(home) {
                repo.status = status.to_string();
            }
        }

        pub fn repo(&self, home: &Path) -> Option<FakeRepo> {
            self.repos.lock().unwrap().get(home).cloned()
        }

        /// Scripts the output of a non-VCS program, keyed by `program args...`.
        pub fn respond(&self, command_line: &str, result: std::result::Result<&str, i32>) {
            self.outputs
                .lock()
                .unwrap()
                .insert(command_line.to_string(), result.map(str::to_string));
        }

        /// Makes any VCS invocation whose first argument is `subcommand` fail
        /// when run in `dir`.
        pub fn fail_in(&self, dir: &Path, subcommand: &str) {
            self.failing
                .lock()
                .unwrap()
                .insert(format!("{}|{}", dir.display(), subcommand));
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn mutating_calls(&self) -> Vec<Call> {
            self.calls().into_iter().filter(Call::is_mutating).collect()
        }

        pub fn clear_calls(&self) {
            self.calls.lock().unwrap().clear();
        }

        fn run_git(&self, dir: &Path, args: &[&str]) -> Result<CommandOutput> {
            let sub = args.first().copied().unwrap_or_default();
            let key = format!("{}|{}", dir.display(), sub);
            if self.failing.lock().unwrap().contains(&key) {
                return Err(fail("git", args, 1));
            }
            match sub {
                "clone" => {
                    let (branch, url, name) = match args {
                        [_, "-b", branch, url, name] => (branch.to_string(), *url, *name),
                        [_, url, name] => (String::new(), *url, *name),
                        _ => return Err(fail("git", args, 129)),
                    };
                    let home = dir.join(name);
                    if home.exists() {
                        return Err(fail("git", args, 128));
                    }
                    let mut repo = self
                        .remotes
                        .lock()
                        .unwrap()
                        .get(url)
                        .cloned()
                        .unwrap_or_else(|| FakeRepo {
                            hash: format!("tip-of-{url}"),
                            ..FakeRepo::default()
                        });
                    repo.origin = url.to_string();
                    if !branch.is_empty() {
                        repo.branch = branch;
                    }
                    self.add_repo(&home, repo);
                    Ok(CommandOutput::new(""))
                }
                _ => {
                    let mut repos = self.repos.lock().unwrap();
                    let repo = repos.get_mut(dir).ok_or_else(|| fail("git", args, 128))?;
                    let stdout = match args {
                        ["branch"] => format!("  other\n* {}", repo.branch),
                        ["config", "--get", "remote.origin.url"] => {
                            if repo.origin.is_empty() {
                                return Err(fail("git", args, 1));
                            }
                            repo.origin.clone()
                        }
                        ["rev-parse", "HEAD"] => repo.hash.clone(),
                        ["status", "--porcelain"] => repo.status.clone(),
                        ["describe", ..] => repo.describe.clone(),
                        ["checkout", hash] => {
                            repo.hash = hash.to_string();
                            String::new()
                        }
                        ["tag", ..] | ["push", ..] => String::new(),
                        _ => return Err(fail("git", args, 129)),
                    };
                    Ok(CommandOutput::new(stdout))
                }
            }
        }
    }

    impl CommandRunner for FakeWorld {
        fn run(&self, dir: &Path, program: &str, args: &[&str]) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push(Call {
                dir: dir.to_path_buf(),
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
            });
            if program == "git" {
                return self.run_git(dir, args);
            }
            let line = crate::command::display_command(program, args);
            match self.outputs.lock().unwrap().get(&line) {
                Some(Ok(stdout)) => Ok(CommandOutput::new(stdout.clone())),
                Some(Err(code)) => Err(fail(program, args, *code)),
                None => Err(Error::CommandSpawn {
                    program: program.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not scripted"),
                }),
            }
        }
    }
}
