//! # Checkout Command Implementation
//!
//! Brings the repositories under PATH to the commits recorded in a manifest.
//! Missing repositories are cloned; clean ones at another commit are checked
//! out; nothing is touched if any repository has local modifications or a
//! target directory exists without being a checkout.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use depfreeze::command::SystemRunner;
use depfreeze::git::GitClient;
use depfreeze::output::StatusWriter;
use depfreeze::reconcile::Reconciler;

use crate::cli::Context;
use crate::commands::Reported;

/// Bring an existing tree to the commits recorded in a manifest
#[derive(Args, Debug)]
pub struct CheckoutArgs {
    /// Manifest file to read
    #[arg(short, long, value_name = "FILE", env = "DEPFREEZE_MANIFEST")]
    pub file: PathBuf,

    /// Output root holding the repositories
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,
}

/// Execute the `checkout` command.
pub fn execute(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let mut status = StatusWriter::stdout(ctx.output.clone());
    let output_root = super::absolute(&args.path)?;
    status.writeln(&format!("Checking out manifest @ {}", args.file.display()));
    status.writeln(&format!("Output location @ {}", output_root.display()));

    let snapshot = super::load_manifest(&args.file, &mut status)?;
    let git = GitClient::new(&SystemRunner, ctx.settings.vcs.program.as_str());
    let report = Reconciler::new(git)
        .checkout(&snapshot, &output_root, &mut status)
        .map_err(Reported)?;
    log::info!("checkout touched {} repositories", report.outcomes.len());
    Ok(())
}
