//! # Error Module
//!
//! Every failure the rewrite engine can report for a single file. Errors are
//! values: a batch over many files keeps going and collects one
//! [`MixinError`] per failed file.
//!
//! | Variant | Raised by | Fatal for the CLI |
//! |---------|-----------|-------------------|
//! | `Parse` | reading or parsing a Go file | yes |
//! | `Splice` | materializing field-list replacements | yes |
//! | `ImportReconcile` | rewriting the import block after a splice | yes |
//! | `Format` | the external `gofmt`/`goimports` step | no |
//! | `Io` | writing the rewritten file | yes |

use std::fmt;
use std::path::{Path, PathBuf};

/// Source-mapped parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// File the error was found in (empty for in-memory sources).
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// 1-based line number (`0` when unavailable).
    pub line: usize,
    /// 1-based column number (`0` when unavailable).
    pub column: usize,
    /// The offending source line.
    pub snippet: String,
    /// Caret pointer aligned to `snippet`.
    pub pointer: String,
}

impl ParseError {
    /// Creates an error with no location information (unreadable file).
    pub fn message_in_file(message: impl Into<String>, path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            message: message.into(),
            line: 0,
            column: 0,
            snippet: String::new(),
            pointer: String::new(),
        }
    }

    /// Creates a diagnostic pointing at byte `offset` of `source`.
    pub fn at_offset(message: impl Into<String>, path: &Path, source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = source[offset..]
            .find('\n')
            .map(|i| offset + i)
            .unwrap_or(source.len());
        let line = source[..line_start].matches('\n').count() + 1;
        let column = source[line_start..offset].chars().count() + 1;
        let snippet = source[line_start..line_end].trim_end_matches('\r').to_string();
        // Tabs are copied so the caret lines up under the snippet.
        let mut pointer: String = source[line_start..offset]
            .chars()
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        pointer.push('^');
        Self {
            path: path.to_path_buf(),
            message: message.into(),
            line,
            column,
            snippet,
            pointer,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            return write!(f, "{}: {}", self.path.display(), self.message);
        }
        write!(
            f,
            "{}:{}:{}: {}",
            self.path.display(),
            self.line,
            self.column,
            self.message
        )?;
        if !self.snippet.is_empty() {
            write!(f, "\n  {}\n  {}", self.snippet, self.pointer)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Errors reported while rewriting one Go file.
#[derive(Debug)]
pub enum MixinError {
    /// The file could not be read or parsed into declarations.
    Parse(ParseError),
    /// A field span could not be located or two replacements overlap.
    Splice {
        /// File being rewritten
        path: PathBuf,
        /// What went wrong
        message: String,
    },
    /// The import block could not be rewritten after a successful splice.
    ///
    /// The spliced content has been written; its imports may be stale.
    ImportReconcile {
        /// File being rewritten
        path: PathBuf,
        /// Underlying cause
        message: String,
    },
    /// The external formatter failed; unformatted bytes were written.
    Format {
        /// File being written
        path: PathBuf,
        /// Formatter diagnostics
        message: String,
    },
    /// Reading or writing a file failed.
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl MixinError {
    pub(crate) fn splice(path: &Path, message: impl Into<String>) -> Self {
        MixinError::Splice {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub(crate) fn import_reconcile(path: &Path, message: impl Into<String>) -> Self {
        MixinError::ImportReconcile {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        MixinError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// File the error belongs to.
    pub fn path(&self) -> &Path {
        match self {
            MixinError::Parse(e) => &e.path,
            MixinError::Splice { path, .. }
            | MixinError::ImportReconcile { path, .. }
            | MixinError::Format { path, .. }
            | MixinError::Io { path, .. } => path,
        }
    }

    /// Formatter failures are reported but do not fail a run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, MixinError::Format { .. })
    }
}

impl fmt::Display for MixinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixinError::Parse(e) => write!(f, "parse error: {}", e),
            MixinError::Splice { path, message } => {
                write!(f, "splice error in {}: {}", path.display(), message)
            }
            MixinError::ImportReconcile { path, message } => {
                write!(f, "import reconcile failed in {}: {}", path.display(), message)
            }
            MixinError::Format { path, message } => {
                write!(f, "format failed {}: {}", path.display(), message)
            }
            MixinError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for MixinError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MixinError::Parse(e) => Some(e),
            MixinError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ParseError> for MixinError {
    fn from(e: ParseError) -> Self {
        MixinError::Parse(e)
    }
}
