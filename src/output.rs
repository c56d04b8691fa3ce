//! # Output Configuration and Status Trace
//!
//! This module controls how `depfreeze` reports progress. Every long-running
//! operation writes an indented trace through a [`StatusWriter`], with
//! `ERROR:` and `WARNING:` markers for problems.
//!
//! ## Respecting User Preferences
//!
//! Color is decided by [`OutputConfig`], which respects:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust
//! use depfreeze::output::{OutputConfig, StatusWriter};
//!
//! let mut buffer = Vec::new();
//! let mut status = StatusWriter::new(&mut buffer, OutputConfig::from_env_and_flag("never"));
//! status.writeln("Cloning...");
//! status.indent();
//! status.warning("nothing to clone");
//! status.outdent();
//! drop(status);
//! assert_eq!(String::from_utf8(buffer).unwrap(), "Cloning...\n    WARNING: nothing to clone\n");
//! ```

use std::env;
use std::fmt::Display;
use std::io::{self, Write};

use console::style;

use crate::probe::RepositoryState;

/// Spaces added per indentation level.
const INDENT_WIDTH: usize = 4;

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether color output is supported based on environment.
    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always disabled.
    pub fn plain() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Writes an indented, human-readable progress trace.
///
/// Write failures are ignored: the trace is informational and must never
/// turn a successful operation into a failed one.
pub struct StatusWriter<W: Write> {
    out: W,
    config: OutputConfig,
    indent: usize,
    at_line_start: bool,
}

impl StatusWriter<io::Stdout> {
    /// A writer on standard output.
    pub fn stdout(config: OutputConfig) -> Self {
        Self::new(io::stdout(), config)
    }
}

impl StatusWriter<io::Sink> {
    /// A writer that discards everything.
    pub fn sink() -> Self {
        Self::new(io::sink(), OutputConfig::plain())
    }
}

impl<W: Write> StatusWriter<W> {
    pub fn new(out: W, config: OutputConfig) -> Self {
        Self {
            out,
            config,
            indent: 0,
            at_line_start: true,
        }
    }

    /// Writes `text` at the current indentation without a newline.
    ///
    /// Continuation writes on the same line are not indented again, so
    /// `write("Cloning...")` followed by `writeln("done")` gives one line.
    pub fn write(&mut self, text: &str) {
        for piece in text.split_inclusive('\n') {
            if self.at_line_start && piece != "\n" {
                let _ = write!(self.out, "{:width$}", "", width = self.indent);
            }
            let _ = self.out.write_all(piece.as_bytes());
            self.at_line_start = piece.ends_with('\n');
        }
        let _ = self.out.flush();
    }

    pub fn writeln(&mut self, text: &str) {
        self.write(text);
        self.write("\n");
    }

    /// Writes a line with an `ERROR:` prefix.
    pub fn error(&mut self, err: &dyn Display) {
        let marker = self.marker("ERROR:", |s| style(s).red().bold().to_string());
        self.writeln(&format!("{} {}", marker, err));
    }

    /// Writes a line with a `WARNING:` prefix.
    pub fn warning(&mut self, text: &str) {
        let marker = self.marker("WARNING:", |s| style(s).yellow().bold().to_string());
        self.writeln(&format!("{} {}", marker, text));
    }

    /// Writes a heading, bold when colors are enabled.
    pub fn heading(&mut self, text: &str) {
        let text = self.marker(text, |s| style(s).bold().to_string());
        self.writeln(&text);
    }

    /// Writes the fields of a repository as an indented block.
    pub fn write_repository(&mut self, repo: &RepositoryState) {
        for line in repo.to_string().lines() {
            self.writeln(line);
        }
    }

    pub fn indent(&mut self) {
        self.indent += INDENT_WIDTH;
    }

    pub fn outdent(&mut self) {
        self.indent = self.indent.saturating_sub(INDENT_WIDTH);
    }

    fn marker(&self, text: &str, styled: impl Fn(&str) -> String) -> String {
        if self.config.use_color {
            styled(text)
        } else {
            text.to_string()
        }
    }
}
