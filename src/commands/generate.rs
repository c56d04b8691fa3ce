//! # Const Command Implementation
//!
//! Writes a source file holding version constants for the package and each
//! repository recorded in a manifest. Also available as `generate`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use depfreeze::command::SystemRunner;
use depfreeze::generate::{write_version_file, DEFAULT_OUTPUT_FILE};
use depfreeze::output::StatusWriter;

use crate::cli::Context;

/// Generate a source file with version constants from a manifest
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Manifest file to read (defaults to depfreeze.manifest inside PATH)
    #[arg(short, long, value_name = "FILE", env = "DEPFREEZE_MANIFEST")]
    pub file: Option<PathBuf>,

    /// Output file name, relative to PATH
    #[arg(short, long, value_name = "OUTPUT", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Package name for the generated file (defaults to the last segment of the package)
    #[arg(long, value_name = "NAME")]
    pub package: Option<String>,

    /// Directory the file is written to
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,
}

/// Execute the `const` command.
pub fn execute(args: GenerateArgs, ctx: &Context) -> Result<()> {
    let mut status = StatusWriter::stdout(ctx.output.clone());
    let file = args
        .file
        .unwrap_or_else(|| args.path.join(&ctx.settings.manifest.file_name));
    let output = args.path.join(&args.output);
    status.writeln(&format!("Generating version file from manifest @ {}", file.display()));

    let snapshot = super::load_manifest(&file, &mut status)?;
    write_version_file(
        &SystemRunner,
        &snapshot,
        &output,
        args.package.as_deref(),
        &ctx.settings.generate.formatter,
        &mut status,
    )?;
    Ok(())
}
