//! # External Command Execution
//!
//! Every interaction with the VCS client and the build tool goes through the
//! [`CommandRunner`] trait. The real implementation, [`SystemRunner`], spawns
//! one process per call with its working directory set on the process itself,
//! so the caller's own current directory is never touched.
//!
//! A run that cannot start is reported as [`Error::CommandSpawn`]; a run that
//! starts and exits non-zero is reported as [`Error::CommandFailed`].

use std::path::Path;
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{Error, Result};

/// The captured result of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit code. Always 0 for values returned through `Ok`.
    pub code: i32,
    /// Complete standard output with trailing whitespace trimmed.
    pub stdout: String,
}

impl CommandOutput {
    pub fn new(stdout: impl Into<String>) -> Self {
        Self {
            code: 0,
            stdout: stdout.into(),
        }
    }
}

/// Trait for running external programs - allows scripting in tests
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` inside `dir` and waits for it to exit.
    ///
    /// Standard output is read until end-of-stream before this returns.
    fn run(&self, dir: &Path, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, dir: &Path, program: &str, args: &[&str]) -> Result<CommandOutput> {
        debug!("{} {} (in {})", program, args.join(" "), dir.display());

        // `output()` drains stdout and stderr concurrently until both reach EOF,
        // so a chatty child cannot block on a full pipe.
        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| Error::CommandSpawn {
                program: program.to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout)
            .trim_end()
            .to_string();

        if !output.status.success() {
            // Killed by a signal has no exit code.
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!("{} exited with {}", program, code);
            return Err(Error::CommandFailed {
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
                code,
                stderr,
            });
        }

        Ok(CommandOutput { code: 0, stdout })
    }
}

/// Formats a command line for status output.
pub fn display_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}
