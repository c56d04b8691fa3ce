//! Shared test utilities for integration and E2E tests.
//!
//! This module provides common fixtures and helper functions to reduce
//! duplication across test files.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_manifest("app.manifest", &manifests::single("u", "h"));
//!     fixture.command().args(["print", "-f", "app.manifest"]).assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::git;
    #[allow(unused_imports)]
    pub use super::manifests;
    pub use super::TestFixture;
}

/// Manifest documents for testing.
#[allow(dead_code)]
pub mod manifests {
    /// A repository entry with the given home, origin, branch and hash.
    pub fn repository(home: &str, origin: &str, branch: &str, hash: &str) -> String {
        let parent = home.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
        format!(
            r#"{{
    "HomeDir": "{home}",
    "ParentDir": "{parent}",
    "Branch": "{branch}",
    "Hash": "{hash}",
    "OriginUrl": "{origin}",
    "Describe": "v1.0.0-0-g{short}",
    "Status": ""
  }}"#,
            short = &hash[..hash.len().min(8)],
        )
    }

    /// A manifest whose only repository is the package itself.
    pub fn single(origin: &str, hash: &str) -> String {
        format!(
            r#"{{
  "TargetPackage": "github.com/acme/app",
  "TargetGit": {},
  "Gits": [],
  "DotDeps": ["fmt"]
}}
"#,
            repository("github.com/acme/app", origin, "master", hash)
        )
    }

    /// A manifest with the package and one dependency repository.
    pub fn with_dependency(app: (&str, &str), lib: (&str, &str)) -> String {
        format!(
            r#"{{
  "TargetPackage": "github.com/acme/app",
  "TargetGit": {},
  "Gits": [{}],
  "DotDeps": ["fmt", "github.com/acme/lib/sub"]
}}
"#,
            repository("github.com/acme/app", app.0, "master", app.1),
            repository("github.com/acme/lib", lib.0, "master", lib.1)
        )
    }

    /// Settings that turn the generated-file formatter off.
    pub const NO_FORMATTER: &str = "generate:\n  formatter: []\n";
}

/// Real VCS helpers for the tests gated behind `integration-tests`.
#[allow(dead_code)]
pub mod git {
    use std::path::Path;
    use std::process::Command;

    /// Runs git in `dir` with a fixed identity and returns trimmed stdout.
    pub fn run(dir: &Path, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(["-c", "user.name=depfreeze", "-c", "user.email=depfreeze@example.com"])
            .args(["-c", "init.defaultBranch=master", "-c", "commit.gpgsign=false"])
            .args(args)
            .current_dir(dir)
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Creates a repository at `dir` with one commit and returns its hash.
    pub fn init(dir: &Path) -> String {
        std::fs::create_dir_all(dir).expect("Failed to create repository dir");
        run(dir, &["init", "-q"]);
        commit(dir, "README.md", "first")
    }

    /// Writes `file` and commits it, returning the new hash.
    pub fn commit(dir: &Path, file: &str, content: &str) -> String {
        std::fs::write(dir.join(file), content).expect("Failed to write file");
        run(dir, &["add", "."]);
        run(dir, &["commit", "-q", "-m", content]);
        run(dir, &["rev-parse", "HEAD"])
    }

    pub fn head(dir: &Path) -> String {
        run(dir, &["rev-parse", "HEAD"])
    }
}

/// A test fixture that provides a temporary working directory.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_file("out/github.com/acme/app/README.md", "hello");
///
/// fixture.command().args(["rebuild", "-f", "m.json", "out"]).assert().failure();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a manifest file at `path`.
    pub fn with_manifest(self, path: &str, content: &str) -> Self {
        self.with_file(path, content)
    }

    /// Add a `.depfreeze.yaml` settings file.
    #[allow(dead_code)]
    pub fn with_settings(self, content: &str) -> Self {
        self.with_file(".depfreeze.yaml", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add an empty directory.
    #[allow(dead_code)]
    pub fn with_dir(self, path: &str) -> Self {
        self.temp_dir
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command configured to run in this fixture's directory, with
    /// colors off, no settings inherited from the environment, and a fixed
    /// identity for any commit or tag the VCS client creates.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("depfreeze");
        cmd.current_dir(self.path())
            .env("NO_COLOR", "1")
            .env_remove("DEPFREEZE_CONFIG")
            .env_remove("DEPFREEZE_MANIFEST")
            .env_remove("RUST_LOG")
            .env("GIT_AUTHOR_NAME", "depfreeze")
            .env("GIT_AUTHOR_EMAIL", "depfreeze@example.com")
            .env("GIT_COMMITTER_NAME", "depfreeze")
            .env("GIT_COMMITTER_EMAIL", "depfreeze@example.com");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("a/b.txt", "hello");
        assert!(fixture.path().join("a/b.txt").exists());
    }

    #[test]
    fn test_manifests_are_valid_json() {
        for doc in [
            manifests::single("https://example.com/app.git", "abc123"),
            manifests::with_dependency(("u1", "h1"), ("u2", "h2")),
        ] {
            serde_json::from_str::<serde_json::Value>(&doc).expect("Manifest should be valid JSON");
        }
    }
}
