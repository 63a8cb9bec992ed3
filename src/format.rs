//! # Format Module
//!
//! Writes rewritten Go files through the external formatters: `gofmt` for
//! layout and `goimports` for import grouping.
//!
//! A formatter failure never loses a rewrite. The best bytes available
//! (unformatted, or formatted but ungrouped) are written, and the failure
//! is reported as [`MixinError::Format`], which callers treat as non-fatal.
//!
//! The binaries default to `gofmt` and `goimports` on `PATH` and can be
//! overridden with `XGEN_GOFMT_BIN` / `XGEN_GOIMPORTS_BIN`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::MixinError;
use crate::files::{find_files, Wildcards};
use crate::source::{GoFile, SourceEditor};

/// Environment override for the `gofmt` binary.
pub const GOFMT_BIN_ENV: &str = "XGEN_GOFMT_BIN";
/// Environment override for the `goimports` binary.
pub const GOIMPORTS_BIN_ENV: &str = "XGEN_GOIMPORTS_BIN";

/// Source-to-source formatting passes.
pub trait SourceFormatter: Send + Sync {
    /// Pretty-prints the code.
    fn format(&self, source: &[u8]) -> Result<Vec<u8>, String>;

    /// Splits imports into standard library and third-party groups.
    fn group_imports(&self, source: &[u8]) -> Result<Vec<u8>, String>;
}

/// Runs `gofmt` and `goimports` as child processes over stdin/stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoFormatter {
    gofmt: Option<PathBuf>,
    goimports: Option<PathBuf>,
}

impl GoFormatter {
    pub fn new() -> Self {
        Self::with_binaries("gofmt", "goimports")
    }

    /// Binaries from `XGEN_GOFMT_BIN` / `XGEN_GOIMPORTS_BIN`, falling back
    /// to the given defaults.
    pub fn from_env_or(gofmt: impl Into<PathBuf>, goimports: impl Into<PathBuf>) -> Self {
        let gofmt = std::env::var_os(GOFMT_BIN_ENV).map_or_else(|| gofmt.into(), PathBuf::from);
        let goimports = std::env::var_os(GOIMPORTS_BIN_ENV).map_or_else(|| goimports.into(), PathBuf::from);
        Self::with_binaries(gofmt, goimports)
    }

    pub fn from_env() -> Self {
        Self::from_env_or("gofmt", "goimports")
    }

    pub fn with_binaries(gofmt: impl Into<PathBuf>, goimports: impl Into<PathBuf>) -> Self {
        Self {
            gofmt: Some(gofmt.into()),
            goimports: Some(goimports.into()),
        }
    }

    /// Passes everything through unchanged.
    pub fn disabled() -> Self {
        Self {
            gofmt: None,
            goimports: None,
        }
    }

    /// Keeps `gofmt` but skips the import grouping pass.
    pub fn without_import_grouping(mut self) -> Self {
        self.goimports = None;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.gofmt.is_some() || self.goimports.is_some()
    }
}

impl Default for GoFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFormatter for GoFormatter {
    fn format(&self, source: &[u8]) -> Result<Vec<u8>, String> {
        match &self.gofmt {
            Some(bin) => run_filter(bin, source),
            None => Ok(source.to_vec()),
        }
    }

    fn group_imports(&self, source: &[u8]) -> Result<Vec<u8>, String> {
        match &self.goimports {
            Some(bin) => run_filter(bin, source),
            None => Ok(source.to_vec()),
        }
    }
}

/// Pipes `input` through `bin` and returns its stdout.
fn run_filter(bin: &Path, input: &[u8]) -> Result<Vec<u8>, String> {
    let name = bin.display().to_string();
    let mut child = Command::new(bin)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("{}: {}", name, e))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| format!("{}: stdin unavailable", name))?;
    let input = input.to_vec();
    let writer = std::thread::spawn(move || stdin.write_all(&input));
    let output = child
        .wait_with_output()
        .map_err(|e| format!("{}: {}", name, e))?;
    let written = writer.join();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} exited with {}: {}", name, output.status, stderr.trim()));
    }
    match written {
        Ok(Ok(())) => Ok(output.stdout),
        Ok(Err(e)) => Err(format!("{}: writing stdin: {}", name, e)),
        Err(_) => Err(format!("{}: stdin writer panicked", name)),
    }
}

/// Formats `source` and writes it to `path`; returns the written bytes.
///
/// On a formatter failure the unformatted (or formatted but ungrouped)
/// bytes are still written and `MixinError::Format` is returned.
pub fn write_go_file(path: &Path, source: &[u8], formatter: &dyn SourceFormatter) -> Result<Vec<u8>, MixinError> {
    let formatted = match formatter.format(source) {
        Ok(bytes) => bytes,
        Err(message) => {
            std::fs::write(path, source).map_err(|e| MixinError::io(path, e))?;
            return Err(MixinError::Format {
                path: path.to_path_buf(),
                message,
            });
        }
    };
    let grouped = match formatter.group_imports(&formatted) {
        Ok(bytes) => bytes,
        Err(message) => {
            std::fs::write(path, &formatted).map_err(|e| MixinError::io(path, e))?;
            return Err(MixinError::Format {
                path: path.to_path_buf(),
                message,
            });
        }
    };
    std::fs::write(path, &grouped).map_err(|e| MixinError::io(path, e))?;
    Ok(grouped)
}

/// Reformats one file in place. Returns whether its bytes changed.
pub fn prettify_go_file(path: &Path, formatter: &dyn SourceFormatter) -> Result<bool, MixinError> {
    let source = std::fs::read(path).map_err(|e| MixinError::io(path, e))?;
    let written = write_go_file(path, &source, formatter)?;
    let changed = written != source;
    debug!(file = %path.display(), changed, "prettified");
    Ok(changed)
}

/// Reformats every `.go` file under `dir`, optionally renaming the package
/// clause of each to `package_name`. Stops at the first error.
///
/// Returns the files whose bytes changed.
pub fn rewrite_package(
    dir: &Path,
    package_name: Option<&str>,
    formatter: &dyn SourceFormatter,
) -> Result<Vec<PathBuf>, MixinError> {
    let files = find_files(dir, ".go", &Wildcards::empty())?;
    let mut changed = Vec::new();
    for path in files {
        let original = std::fs::read(&path).map_err(|e| MixinError::io(&path, e))?;
        let source = match package_name {
            Some(name) => rename_package(&path, &original, name)?,
            None => original.clone(),
        };
        let written = write_go_file(&path, &source, formatter)?;
        if written != original {
            changed.push(path);
        }
    }
    Ok(changed)
}

fn rename_package(path: &Path, source: &[u8], name: &str) -> Result<Vec<u8>, MixinError> {
    let text = String::from_utf8_lossy(source).into_owned();
    let file = GoFile::parse(path, text)?;
    if file.package_name() == name {
        return Ok(source.to_vec());
    }
    let mut editor = SourceEditor::new(file.source());
    editor.replace(file.package_span(), format!("package {}", name));
    editor
        .apply()
        .map(String::into_bytes)
        .map_err(|e| MixinError::splice(path, e.to_string()))
}
