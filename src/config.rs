//! # Settings File
//!
//! `depfreeze` works without any configuration. An optional YAML file
//! (`.depfreeze.yaml` by default) can override the external programs it
//! drives and a few file names:
//!
//! ```yaml
//! vcs:
//!   program: git
//! build_tool:
//!   program: go
//!   import_path_args: ["list"]
//!   deps_args: ["list", "-f", "{{.Deps}}"]
//! manifest:
//!   file_name: depfreeze.manifest
//! generate:
//!   formatter: ["gofmt", "-w"]
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File name looked up in the current directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".depfreeze.yaml";

/// Manifest file name used by `make` when no `-f` is given.
pub const DEFAULT_MANIFEST_FILE: &str = "depfreeze.manifest";

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub vcs: VcsSettings,
    pub build_tool: BuildToolSettings,
    pub manifest: ManifestSettings,
    pub generate: GenerateSettings,
}

/// The version-control client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VcsSettings {
    pub program: String,
}

impl Default for VcsSettings {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

/// The build tool queried for import paths and dependency lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildToolSettings {
    pub program: String,
    /// Arguments that print the package's canonical import path.
    pub import_path_args: Vec<String>,
    /// Arguments that print the transitive dependency names on one line.
    pub deps_args: Vec<String>,
}

impl Default for BuildToolSettings {
    fn default() -> Self {
        Self {
            program: "go".to_string(),
            import_path_args: vec!["list".to_string()],
            deps_args: vec!["list".to_string(), "-f".to_string(), "{{.Deps}}".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestSettings {
    pub file_name: String,
}

impl Default for ManifestSettings {
    fn default() -> Self {
        Self {
            file_name: DEFAULT_MANIFEST_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateSettings {
    /// Command run on the generated file (the file path is appended).
    /// An empty list disables formatting.
    pub formatter: Vec<String>,
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self {
            formatter: vec!["gofmt".to_string(), "-w".to_string()],
        }
    }
}

/// Parse settings from a YAML string. An empty document yields defaults.
pub fn parse(yaml_content: &str) -> std::result::Result<Settings, serde_yaml::Error> {
    if yaml_content.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(yaml_content)
}

/// Load settings from a file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Resolve the settings for this invocation.
///
/// An explicit path must exist. Without one, `.depfreeze.yaml` in the current
/// directory is used if present, else the defaults.
pub fn load(explicit: Option<&Path>) -> Result<Settings> {
    match explicit {
        Some(path) => from_file(path),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if fallback.is_file() {
                from_file(fallback)
            } else {
                Ok(Settings::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_empty_gives_defaults() {
        let settings = parse("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.vcs.program, "git");
        assert_eq!(settings.build_tool.program, "go");
        assert_eq!(settings.manifest.file_name, "depfreeze.manifest");
    }

    #[test]
    fn test_parse_partial_override() {
        let yaml = r#"
build_tool:
  program: mytool
  deps_args: ["deps"]
"#;
        let settings = parse(yaml).unwrap();
        assert_eq!(settings.build_tool.program, "mytool");
        assert_eq!(settings.build_tool.deps_args, vec!["deps"]);
        // Untouched keys keep defaults.
        assert_eq!(settings.build_tool.import_path_args, vec!["list"]);
        assert_eq!(settings.vcs.program, "git");
    }

    #[test]
    fn test_parse_empty_formatter_disables_formatting() {
        let settings = parse("generate:\n  formatter: []\n").unwrap();
        assert!(settings.generate.formatter.is_empty());
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        assert!(parse("vcs:\n  programme: hg\n").is_err());
    }

    #[test]
    fn test_from_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.yaml");
        std::fs::write(&path, "vcs: [unclosed").unwrap();
        let err = from_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("bad.yaml"));
    }

    #[test]
    fn test_load_explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        let result = load(Some(&temp.path().join("missing.yaml")));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
