//! # Make Command Implementation
//!
//! Inventories the package at PATH and writes its manifest. Repositories with
//! local modifications are recorded as they are, with a warning: the recorded
//! hash does not describe their working tree.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use log::warn;

use depfreeze::command::{CommandRunner, SystemRunner};
use depfreeze::discover::{Discoverer, Discovery};
use depfreeze::manifest;
use depfreeze::output::StatusWriter;

use crate::cli::Context;

/// Inventory a package and write its manifest
#[derive(Args, Debug)]
pub struct MakeArgs {
    /// Manifest file to write (defaults to depfreeze.manifest inside PATH)
    #[arg(short, long, value_name = "FILE", env = "DEPFREEZE_MANIFEST")]
    pub file: Option<PathBuf>,

    /// Package directory
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,
}

/// Execute the `make` command.
pub fn execute(args: MakeArgs, ctx: &Context) -> Result<()> {
    let file = args
        .file
        .unwrap_or_else(|| args.path.join(&ctx.settings.manifest.file_name));
    let mut status = StatusWriter::stdout(ctx.output.clone());
    make_manifest(&SystemRunner, ctx, &args.path, &file, &mut status)?;
    Ok(())
}

/// Discovers the package at `path` and writes its manifest to `file`.
pub(crate) fn make_manifest<W: Write>(
    runner: &dyn CommandRunner,
    ctx: &Context,
    path: &Path,
    file: &Path,
    status: &mut StatusWriter<W>,
) -> Result<Discovery> {
    let settings = &ctx.settings;
    let discoverer = Discoverer::new(runner, &settings.build_tool, &settings.vcs.program);
    let discovery = match discoverer.discover(path, status) {
        Ok(discovery) => discovery,
        Err(e) => return Err(super::report(status, e)),
    };

    status.writeln("");
    for line in discovery.summary().lines() {
        status.writeln(line);
    }

    let snapshot = discovery.snapshot();
    let modified = snapshot.modified_repositories();
    if !modified.is_empty() {
        let homes: Vec<&str> = modified.iter().map(|r| r.home_dir.as_str()).collect();
        warn!("manifest records repositories with local modifications: {}", homes.join(", "));
        status.writeln("");
        status.warning("The following repositories have local modifications:");
        status.indent();
        for home in homes {
            status.writeln(home);
        }
        status.outdent();
    }

    status.write(&format!("Writing manifest @ {}...", file.display()));
    manifest::write(file, &snapshot)?;
    status.writeln("done");
    Ok(discovery)
}
