//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use depfreeze::config::{self, Settings};
use depfreeze::output::OutputConfig;

use crate::commands;

/// depfreeze - Freeze and restore the VCS dependencies of a package
#[derive(Parser, Debug)]
#[command(name = "depfreeze")]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Settings file (defaults to .depfreeze.yaml in the current directory, if present)
    #[arg(long, global = true, value_name = "FILE", env = "DEPFREEZE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inventory a package's dependencies and write a manifest
    Make(commands::make::MakeArgs),

    /// Print the package summary stored in a manifest
    Print(commands::print::PrintArgs),

    /// Clone every repository of a manifest into an empty tree
    Rebuild(commands::rebuild::RebuildArgs),

    /// Bring an existing tree to the commits recorded in a manifest
    Checkout(commands::checkout::CheckoutArgs),

    /// Generate a source file with version constants from a manifest
    #[command(alias = "generate")]
    Const(commands::generate::GenerateArgs),

    /// Tag the package repository and refresh its manifest and version file
    Tag(commands::tag::TagArgs),
}

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub settings: Settings,
    pub output: OutputConfig,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let context = Context {
            settings: config::load(self.config.as_deref())?,
            output: OutputConfig::from_env_and_flag(&self.color),
        };

        match self.command {
            Commands::Make(args) => commands::make::execute(args, &context),
            Commands::Print(args) => commands::print::execute(args, &context),
            Commands::Rebuild(args) => commands::rebuild::execute(args, &context),
            Commands::Checkout(args) => commands::checkout::execute(args, &context),
            Commands::Const(args) => commands::generate::execute(args, &context),
            Commands::Tag(args) => commands::tag::execute(args, &context),
        }
    }
}

/// `RUST_LOG` wins over `--log-level` when both are set.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
