//! # Tag Command Implementation
//!
//! Tags the package's own repository, then refreshes its manifest and its
//! version-constant file so that both carry the descriptor of the new tag.
//! Refuses to tag while any repository of the package has local
//! modifications.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use depfreeze::command::SystemRunner;
use depfreeze::discover::Discoverer;
use depfreeze::error::Error;
use depfreeze::generate::{write_version_file, DEFAULT_OUTPUT_FILE};
use depfreeze::git::GitClient;
use depfreeze::output::StatusWriter;

use crate::cli::Context;

/// Tag the package repository and refresh its manifest and version file
#[derive(Args, Debug)]
pub struct TagArgs {
    /// Name of the annotated tag to create
    #[arg(value_name = "TAG")]
    pub tag: String,

    /// Tag message (defaults to the tag name)
    #[arg(short, long, value_name = "MESSAGE")]
    pub message: Option<String>,

    /// Push the tag to origin
    #[arg(long)]
    pub push: bool,

    /// Manifest file to refresh (defaults to depfreeze.manifest inside PATH)
    #[arg(short, long, value_name = "FILE", env = "DEPFREEZE_MANIFEST")]
    pub file: Option<PathBuf>,

    /// Version file to regenerate, relative to PATH
    #[arg(short, long, value_name = "OUTPUT", default_value = DEFAULT_OUTPUT_FILE)]
    pub output: PathBuf,

    /// Package name for the version file (defaults to the last segment of the package)
    #[arg(long, value_name = "NAME")]
    pub package: Option<String>,

    /// Package directory
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,
}

/// Execute the `tag` command.
pub fn execute(args: TagArgs, ctx: &Context) -> Result<()> {
    let mut status = StatusWriter::stdout(ctx.output.clone());
    let runner = SystemRunner;
    let settings = &ctx.settings;

    let discoverer = Discoverer::new(&runner, &settings.build_tool, &settings.vcs.program);
    let discovery = match discoverer.discover(&args.path, &mut status) {
        Ok(discovery) => discovery,
        Err(e) => return Err(super::report(&mut status, e)),
    };

    let modified: Vec<PathBuf> = discovery
        .repositories()
        .iter()
        .filter(|r| !r.is_clean())
        .map(|r| r.home_path())
        .collect();
    if !modified.is_empty() {
        let err = Error::Precondition {
            message: "Cannot tag while repositories have local modifications".to_string(),
            paths: modified,
        };
        return Err(super::report(&mut status, err));
    }

    let git = GitClient::new(&runner, settings.vcs.program.as_str());
    let home = discovery.target.home_path();
    let message = args.message.as_deref().unwrap_or(&args.tag);
    status.write(&format!("Tagging {} as {}...", home.display(), args.tag));
    git.tag_annotated(&home, &args.tag, message)?;
    status.writeln("done");

    if args.push {
        status.write(&format!("Pushing {} to origin...", args.tag));
        git.push_tag(&home, "origin", &args.tag)?;
        status.writeln("done");
    }

    status.writeln("");
    let file = args
        .file
        .unwrap_or_else(|| args.path.join(&settings.manifest.file_name));
    let refreshed = super::make::make_manifest(&runner, ctx, &args.path, &file, &mut status)?;

    status.writeln("");
    write_version_file(
        &runner,
        &refreshed.snapshot(),
        &args.path.join(&args.output),
        args.package.as_deref(),
        &settings.generate.formatter,
        &mut status,
    )?;
    Ok(())
}
