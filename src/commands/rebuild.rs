//! # Rebuild Command Implementation
//!
//! Clones every repository recorded in a manifest into PATH and checks out
//! the recorded commits. Refuses to start if any of the target directories
//! already exists.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use depfreeze::command::SystemRunner;
use depfreeze::git::GitClient;
use depfreeze::output::StatusWriter;
use depfreeze::reconcile::Reconciler;

use crate::cli::Context;
use crate::commands::Reported;

/// Clone every repository of a manifest into an empty tree
#[derive(Args, Debug)]
pub struct RebuildArgs {
    /// Manifest file to read
    #[arg(short, long, value_name = "FILE", env = "DEPFREEZE_MANIFEST")]
    pub file: PathBuf,

    /// Output root the repositories are cloned under
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,
}

/// Execute the `rebuild` command.
pub fn execute(args: RebuildArgs, ctx: &Context) -> Result<()> {
    let mut status = StatusWriter::stdout(ctx.output.clone());
    let output_root = super::absolute(&args.path)?;
    status.writeln(&format!("Rebuilding manifest @ {}", args.file.display()));
    status.writeln(&format!("Output location @ {}", output_root.display()));

    let snapshot = super::load_manifest(&args.file, &mut status)?;
    let git = GitClient::new(&SystemRunner, ctx.settings.vcs.program.as_str());
    Reconciler::new(git)
        .rebuild(&snapshot, &output_root, &mut status)
        .map_err(Reported)?;
    Ok(())
}
