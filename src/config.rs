//! Run configuration loaded from `xgen.toml`
//!
//! The file is optional. Every section and key has a default, so an empty
//! file and a missing file behave the same. Command-line flags override the
//! values read here.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::files::{Wildcards, DEFAULT_MIXIN_WILDCARDS};
use crate::format::GoFormatter;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "xgen.toml";

/// Top-level `xgen.toml` contents
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Where generated models live and where the mixin library is
    pub reverse: ReverseSettings,
    /// Mixin naming conventions
    pub mixin: MixinSettings,
    /// External formatter
    pub format: FormatSettings,
}

/// `[reverse]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReverseSettings {
    /// Root of the generated model packages
    pub output_dir: PathBuf,
    /// Import path of `output_dir`
    pub name_space: String,
    /// User mixin library (skipped when it does not exist)
    pub mixin_dir: PathBuf,
    /// Import path of `mixin_dir`
    pub mixin_ns: String,
    /// Sub-directories of `output_dir` to patch; empty means `output_dir`
    pub connections: Vec<String>,
    /// Let local mixins grow from smaller declarations
    pub deep_match: bool,
}

impl Default for ReverseSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("models"),
            name_space: String::new(),
            mixin_dir: PathBuf::from("mixins"),
            mixin_ns: String::new(),
            connections: Vec::new(),
            deep_match: false,
        }
    }
}

impl ReverseSettings {
    /// Directories a patch run covers.
    pub fn target_dirs(&self) -> Vec<PathBuf> {
        if self.connections.is_empty() {
            return vec![self.output_dir.clone()];
        }
        self.connections
            .iter()
            .map(|conn| self.output_dir.join(conn))
            .collect()
    }
}

/// `[mixin]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MixinSettings {
    /// Declaration names that become mixins
    pub wildcards: Vec<String>,
}

impl Default for MixinSettings {
    fn default() -> Self {
        Self {
            wildcards: DEFAULT_MIXIN_WILDCARDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl MixinSettings {
    pub fn compile(&self) -> anyhow::Result<Wildcards> {
        Wildcards::new(self.wildcards.iter().cloned())
            .with_context(|| format!("Invalid mixin wildcards: {:?}", self.wildcards))
    }
}

/// `[format]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FormatSettings {
    /// Run the formatter at all
    pub enabled: bool,
    /// Also group imports with `goimports`
    pub group_imports: bool,
    pub gofmt: PathBuf,
    pub goimports: PathBuf,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            group_imports: true,
            gofmt: PathBuf::from("gofmt"),
            goimports: PathBuf::from("goimports"),
        }
    }
}

impl FormatSettings {
    /// The formatter these settings describe; `XGEN_GOFMT_BIN` and
    /// `XGEN_GOIMPORTS_BIN` take precedence over the configured binaries.
    pub fn formatter(&self) -> GoFormatter {
        if !self.enabled {
            return GoFormatter::disabled();
        }
        let formatter = GoFormatter::from_env_or(&self.gofmt, &self.goimports);
        if self.group_imports {
            formatter
        } else {
            formatter.without_import_grouping()
        }
    }
}

/// Load settings from a TOML file
///
/// Returns defaults if the file doesn't exist (not an error), `Err` if the
/// file exists but fails to parse.
pub fn load_settings(config_path: &Path) -> anyhow::Result<Settings> {
    if !config_path.exists() {
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config: {}", config_path.display()))?;

    let settings: Settings = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;

    Ok(settings)
}

/// Resolve the config path
///
/// Priority:
/// 1. Explicitly provided path (via CLI), even if missing
/// 2. `xgen.toml` in the working directory
/// 3. None (defaults)
pub fn resolve_config_path(explicit_path: Option<&Path>, work_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return Some(path.to_path_buf());
    }
    let detected = work_dir.join(CONFIG_FILE_NAME);
    detected.exists().then_some(detected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("xgen.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.mixin.wildcards, vec!["*Core", "*Mixin"]);
        assert_eq!(settings.reverse.target_dirs(), vec![PathBuf::from("models")]);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xgen.toml");
        std::fs::write(
            &path,
            r#"
[reverse]
output_dir = "out"
mixin_ns = "example.com/app/mixins"
connections = ["default", "cache"]
deep_match = true

[format]
enabled = false
"#,
        )
        .unwrap();
        let settings = load_settings(&path).unwrap();
        assert!(settings.reverse.deep_match);
        assert_eq!(settings.reverse.mixin_dir, PathBuf::from("mixins"));
        assert_eq!(
            settings.reverse.target_dirs(),
            vec![PathBuf::from("out/default"), PathBuf::from("out/cache")]
        );
        assert!(!settings.format.formatter().is_enabled());
        assert_eq!(settings.mixin, MixinSettings::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xgen.toml");
        std::fs::write(&path, "[reverse\noutput_dir = 1").unwrap();
        let err = load_settings(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_resolve_config_path() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_config_path(None, dir.path()), None);
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "").unwrap();
        assert_eq!(
            resolve_config_path(None, dir.path()),
            Some(dir.path().join(CONFIG_FILE_NAME))
        );
        let explicit = dir.path().join("other.toml");
        assert_eq!(resolve_config_path(Some(&explicit), dir.path()), Some(explicit.clone()));
    }
}
