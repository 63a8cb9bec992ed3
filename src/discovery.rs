//! # Discovery Module
//!
//! Finds reusable declarations in Go source (names matching `*Core` or
//! `*Mixin` by default) and registers them as mixins before any model file
//! is patched.
//!
//! Two callers use it:
//!
//! - the user mixin library, registered into the default layer under an
//!   import path and alias, so models anywhere can embed them;
//! - every generated package directory, whose own `*Core`/`*Mixin`
//!   declarations are registered unqualified into that directory's local
//!   layer.

use std::path::Path;

use tracing::{debug, warn};

use crate::compose::{Registry, StructureSummary};
use crate::error::{MixinError, ParseError};
use crate::files::{find_go_files, Wildcards};
use crate::source::{GoFile, ADAPTIVE_ALIAS};

/// Registers the mixin declarations of one file.
///
/// Names are qualified as `alias.Name` when an alias is given. The
/// adaptive alias `#` qualifies with the file's own package name while the
/// summary keeps `#`, so the import is later written without an alias.
/// Returns the names actually registered.
pub fn add_former_mixins(
    registry: &mut Registry,
    path: &Path,
    namespace: &str,
    alias: &str,
    wildcards: &Wildcards,
) -> Result<Vec<String>, ParseError> {
    let file = GoFile::open(path)?;
    let qualifier = if alias == ADAPTIVE_ALIAS {
        file.package_name()
    } else {
        alias
    };
    let mut names = Vec::new();
    for decl in file.declarations() {
        if decl.fields().is_empty() || !wildcards.matches(decl.name()) {
            continue;
        }
        let name = if qualifier.is_empty() {
            decl.name().to_string()
        } else {
            format!("{}.{}", qualifier, decl.name())
        };
        let mut summary = StructureSummary::new(name.as_str()).with_import(namespace, alias);
        summary.parse_fields(&file, decl);
        if registry.register_substitute(summary) {
            debug!(file = %path.display(), mixin = %name, "registered mixin");
            names.push(name);
        }
    }
    Ok(names)
}

/// Registers every mixin declared under `dir` (recursively, test files
/// excluded), in file path order.
///
/// A missing directory yields no mixins. Files that fail to parse are
/// logged and skipped.
pub fn discover_mixins(
    registry: &mut Registry,
    dir: &Path,
    namespace: &str,
    alias: &str,
    wildcards: &Wildcards,
) -> Result<Vec<String>, MixinError> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "no mixin directory");
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for path in find_go_files(dir)? {
        match add_former_mixins(registry, &path, namespace, alias, wildcards) {
            Ok(found) => names.extend(found),
            Err(e) => warn!(file = %path.display(), error = %e, "skipping unparseable mixin file"),
        }
    }
    Ok(names)
}

/// Builds the default layer: the built-in `xq.*` mixins followed by every
/// mixin found in the user library at `dir`, qualified by package name and
/// imported from `namespace`.
///
/// The returned registry is meant to be frozen in an `Arc` before any file
/// is patched.
pub fn prepare_mixins(
    dir: &Path,
    namespace: &str,
    wildcards: &Wildcards,
) -> Result<(Registry, Vec<String>), MixinError> {
    let mut registry = Registry::with_defaults();
    let names = discover_mixins(&mut registry, dir, namespace, ADAPTIVE_ALIAS, wildcards)?;
    Ok((registry, names))
}
