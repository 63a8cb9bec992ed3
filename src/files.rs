//! Name wildcards and Go file discovery.

use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use crate::error::MixinError;

/// Declaration names that may be registered as mixins.
pub const DEFAULT_MIXIN_WILDCARDS: [&str; 2] = ["*Core", "*Mixin"];

/// A compiled list of shell-style wildcards (`*` and `?` only).
#[derive(Debug, Clone)]
pub struct Wildcards {
    patterns: Vec<String>,
    compiled: Vec<Regex>,
}

impl Wildcards {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let compiled = patterns
            .iter()
            .map(|p| Regex::new(&wildcard_to_regex(p)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns, compiled })
    }

    /// `*Core` and `*Mixin`.
    pub fn mixin_defaults() -> Self {
        let patterns: Vec<String> = DEFAULT_MIXIN_WILDCARDS.iter().map(|p| p.to_string()).collect();
        let compiled = patterns
            .iter()
            .filter_map(|p| Regex::new(&wildcard_to_regex(p)).ok())
            .collect();
        Self { patterns, compiled }
    }

    /// Matches nothing.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            compiled: Vec::new(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn matches(&self, name: &str) -> bool {
        self.compiled.iter().any(|re| re.is_match(name))
    }
}

impl Default for Wildcards {
    fn default() -> Self {
        Self::mixin_defaults()
    }
}

fn wildcard_to_regex(pattern: &str) -> String {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            _ => re.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    re.push('$');
    re
}

/// Test files never take part in patching or discovery.
pub fn is_go_test_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with("_test.go"))
}

/// Every regular file under `dir` ending with `ext`, sorted by path.
///
/// Paths matching one of `excludes` (tested against the path relative to
/// `dir`) are skipped; an excluded directory is not descended into.
pub fn find_files(dir: &Path, ext: &str, excludes: &Wildcards) -> Result<Vec<PathBuf>, MixinError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
            relative.as_os_str().is_empty() || !excludes.matches(&relative.to_string_lossy())
        });
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf);
            MixinError::io(&path, e.into())
        })?;
        if entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(ext) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Non-test `.go` files under `dir`, sorted by path.
pub fn find_go_files(dir: &Path) -> Result<Vec<PathBuf>, MixinError> {
    let files = find_files(dir, ".go", &Wildcards::empty())?;
    Ok(files.into_iter().filter(|p| !is_go_test_file(p)).collect())
}
