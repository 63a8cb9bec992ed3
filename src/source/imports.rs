//! Import block reconciliation after a splice.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, warn};

use super::{GoFile, SourceEditor, Span};
use crate::error::MixinError;

/// Alias placeholder meaning "whatever the package calls itself".
pub const ADAPTIVE_ALIAS: &str = "#";

/// Imports a rewritten file needs, in the order they were requested.
///
/// The first alias requested for a path wins. The adaptive placeholder is
/// stored as "no alias".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    entries: Vec<(String, String)>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the path was already present or is empty.
    pub fn add(&mut self, path: &str, alias: &str) -> bool {
        if path.is_empty() || self.entries.iter().any(|(p, _)| p == path) {
            return false;
        }
        let alias = if alias == ADAPTIVE_ALIAS { "" } else { alias };
        self.entries.push((path.to_string(), alias.to_string()));
        true
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `(path, alias)` pairs; the alias is empty for none.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, a)| (p.as_str(), a.as_str()))
    }
}

/// Standard library paths have no dot in their first element.
pub fn is_std_import(path: &str) -> bool {
    !path.split('/').next().unwrap_or(path).contains('.')
}

/// Name a package is referenced by when imported without an alias.
///
/// Major-version suffixes are skipped: `github.com/go-redis/redis/v8` is
/// `redis`, `gopkg.in/yaml.v3` is `yaml`.
pub fn default_import_name(path: &str) -> String {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let name = if is_major_version(last) {
        segments.next().unwrap_or(last)
    } else {
        last
    };
    let name = match name.rsplit_once(".v") {
        Some((head, version)) if !version.is_empty() && version.bytes().all(|b| b.is_ascii_digit()) => head,
        _ => name,
    };
    name.trim_start_matches("go-").replace(['-', '.'], "_")
}

fn is_major_version(segment: &str) -> bool {
    segment.len() > 1
        && segment.starts_with('v')
        && segment[1..].bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    alias: Option<String>,
    path: String,
}

/// Rewrites the import block of `spliced`.
///
/// - `required` imports are added. A required import whose name is
///   already bound to another path is an error: the embeds written for it
///   would resolve to the wrong package.
/// - An existing import is dropped when its name was referenced in the
///   file before the splice (`roots_before`) and no longer is. Blank and
///   dot imports are always kept.
/// - The block is rendered grouped: standard library first, a blank line,
///   then everything else, each group sorted by path.
///
/// Returns `spliced` unchanged when no import is added or dropped.
pub fn reconcile_imports(
    path: &Path,
    spliced: &str,
    roots_before: &HashSet<String>,
    required: &ImportSet,
) -> Result<String, MixinError> {
    let file = GoFile::parse(path, spliced.to_string())
        .map_err(|e| MixinError::import_reconcile(path, e.to_string()))?;
    let roots_after = file.selector_roots();

    let mut entries = Vec::new();
    let mut paths = HashSet::new();
    let mut names = HashSet::new();
    let mut touched = false;
    for spec in file.import_specs() {
        if !paths.insert(spec.path.clone()) {
            touched = true;
            continue;
        }
        if !spec.is_side_effect() {
            let name = spec.local_name();
            if roots_before.contains(&name) && !roots_after.contains(&name) {
                debug!(file = %path.display(), import = %spec.path, "dropped unused import");
                touched = true;
                continue;
            }
            names.insert(name);
        }
        entries.push(Entry {
            alias: spec.alias.clone(),
            path: spec.path.clone(),
        });
    }

    for (import, alias) in required.iter() {
        if !paths.insert(import.to_string()) {
            continue;
        }
        let alias = (!alias.is_empty()).then(|| alias.to_string());
        let name = alias.clone().unwrap_or_else(|| default_import_name(import));
        if !names.insert(name.clone()) {
            warn!(file = %path.display(), import = %import, name = %name, "import name already bound");
            return Err(MixinError::import_reconcile(
                path,
                format!("`{}` already names another import, cannot import {}", name, import),
            ));
        }
        entries.push(Entry {
            alias,
            path: import.to_string(),
        });
        touched = true;
    }

    if !touched {
        return Ok(spliced.to_string());
    }

    let mut editor = SourceEditor::new(spliced);
    let block = render_import_block(&entries);
    match file.imports().split_first() {
        None => {
            if !block.is_empty() {
                editor.insert(file.package_span().end, format!("\n\n{}", block));
            }
        }
        Some((first, rest)) => {
            if block.is_empty() {
                editor.delete(through_newline(spliced, first.span()));
            } else {
                editor.replace(first.span(), block);
            }
            for decl in rest {
                editor.delete(through_newline(spliced, decl.span()));
            }
        }
    }
    editor
        .apply()
        .map_err(|e| MixinError::import_reconcile(path, e.to_string()))
}

fn through_newline(source: &str, span: Span) -> Span {
    if source[span.end..].starts_with('\n') {
        Span::new(span.start, span.end + 1)
    } else {
        span
    }
}

fn render_import_block(entries: &[Entry]) -> String {
    let (mut stdlib, mut third): (Vec<&Entry>, Vec<&Entry>) =
        entries.iter().partition(|e| is_std_import(&e.path));
    stdlib.sort_by(|a, b| a.path.cmp(&b.path));
    third.sort_by(|a, b| a.path.cmp(&b.path));

    let spec = |e: &Entry| match &e.alias {
        Some(alias) => format!("{} \"{}\"", alias, e.path),
        None => format!("\"{}\"", e.path),
    };
    match entries {
        [] => String::new(),
        [only] => format!("import {}", spec(only)),
        _ => {
            let groups: Vec<String> = [stdlib, third]
                .iter()
                .filter(|group| !group.is_empty())
                .map(|group| {
                    group
                        .iter()
                        .map(|e| format!("\t{}\n", spec(*e)))
                        .collect::<String>()
                })
                .collect();
            format!("import (\n{})", groups.join("\n"))
        }
    }
}
