//! Version constant generation.
//!
//! Renders a manifest into a source file declaring a constant that holds the
//! target's descriptor and the descriptor of every repository it depends on.
//! The default template emits Go, matching the default build tool.

use std::io::Write;
use std::path::Path;

use log::{info, warn};

use crate::command::{display_command, CommandRunner};
use crate::error::{Error, Result};
use crate::manifest::PackageSnapshot;
use crate::output::StatusWriter;

/// File written when no output path is given.
pub const DEFAULT_OUTPUT_FILE: &str = "generated_depfreeze.go";

pub const CONSTANT_NAME: &str = "VersionInfo";
pub const TYPE_NAME: &str = "VersionInfoType";

/// Source template. Each `$NAME` placeholder is replaced verbatim.
pub const VERSION_TEMPLATE: &str = r#"// Code generated by depfreeze. DO NOT EDIT.

package $PACKAGE_NAME

// $CONSTANT_NAME holds version information for the package and its dependencies.
var $CONSTANT_NAME = $TYPE_NAME{$VERSION, []struct {
	Name    string
	Version string
}$DEPENDENCIES}

// $TYPE_NAME contains version information for a package and its dependencies.
type $TYPE_NAME struct {
	Version      string
	Dependencies []struct {
		Name    string
		Version string
	}
}
"#;

/// Quotes `value` as a double-quoted string literal.
fn quote(value: &str) -> String {
    // JSON string escaping is a valid subset of Go's interpreted literals.
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

/// Package name used when none is given: last path segment of the target.
pub fn default_package_name(snapshot: &PackageSnapshot) -> String {
    snapshot
        .target_package
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Renders the version file for `snapshot`.
pub fn render(snapshot: &PackageSnapshot, package_name: Option<&str>) -> String {
    let package_name = match package_name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => default_package_name(snapshot),
    };
    let entries: Vec<String> = snapshot
        .repositories()
        .iter()
        .map(|r| format!("{{{}, {}}}", quote(&r.home_dir), quote(&r.describe)))
        .collect();
    let dependencies = format!("{{{}}}", entries.join(",\n"));

    VERSION_TEMPLATE
        .replace("$PACKAGE_NAME", &package_name)
        .replace("$CONSTANT_NAME", CONSTANT_NAME)
        .replace("$TYPE_NAME", TYPE_NAME)
        .replace("$VERSION", &quote(&snapshot.target_git.describe))
        .replace("$DEPENDENCIES", &dependencies)
}

/// Writes the version file to `output` and runs `formatter` on it.
///
/// A formatter that is missing or fails only produces a warning; the
/// unformatted file is kept.
pub fn write_version_file<W: Write>(
    runner: &dyn CommandRunner,
    snapshot: &PackageSnapshot,
    output: &Path,
    package_name: Option<&str>,
    formatter: &[String],
    status: &mut StatusWriter<W>,
) -> Result<()> {
    let source = render(snapshot, package_name);
    std::fs::write(output, source)?;
    info!("wrote {}", output.display());
    status.writeln(&format!("Wrote {}", output.display()));

    let Some((program, args)) = formatter.split_first() else {
        return Ok(());
    };
    let dir = output.parent().filter(|p| !p.as_os_str().is_empty());
    let dir = dir.unwrap_or_else(|| Path::new("."));
    let file_name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::NotADirectory {
            path: output.to_path_buf(),
        })?;
    let mut args: Vec<&str> = args.iter().map(String::as_str).collect();
    args.push(&file_name);

    status.write(&format!("{}...", display_command(program, &args)));
    match runner.run(dir, program, &args) {
        Ok(_) => status.writeln("done"),
        Err(e) => {
            warn!("formatter failed on {}: {}", output.display(), e);
            status.writeln("");
            status.warning(&format!("formatting skipped: {}", e));
        }
    }
    Ok(())
}
