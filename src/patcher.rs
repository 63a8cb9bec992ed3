//! # Patcher Module
//!
//! Rewrites generated model files in place: every struct declaration is
//! matched against the known mixins, the matched fields are replaced by
//! one embed line, the import block is repaired and the file goes through
//! the formatter.
//!
//! ## Passes
//!
//! - [`apply_mixins_to_file`] patches one file with a caller-owned
//!   [`Composer`].
//! - [`apply_dir_mixins`] patches one generated package: it registers the
//!   package's own `*Core`/`*Mixin` declarations first, then patches each
//!   file in path order with one shared composer.
//! - [`run_batch`] runs several directory passes on scoped threads. Each
//!   pass owns its composer; the default layer is shared read-only.
//!
//! ## Failure handling
//!
//! A file that cannot be parsed is reported and skipped; the pass goes on
//! with the next file. When the import block cannot be rewritten after a
//! splice, the spliced text is written anyway and the error is reported
//! for that file.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::compose::{Composer, Registry, StructureSummary};
use crate::discovery::add_former_mixins;
use crate::error::MixinError;
use crate::files::{find_go_files, Wildcards};
use crate::format::{write_go_file, SourceFormatter};
use crate::source::{
    default_import_name, reconcile_imports, GoFile, ImportSet, SourceEditor, Span,
};

/// Knobs shared by every pass of a run.
#[derive(Debug, Clone)]
pub struct PatchOptions {
    /// Log every substitution decision at `info`
    pub verbose: bool,
    /// Let local mixins grow from smaller declarations
    pub deep_match: bool,
    /// Names registered as local mixins before a directory pass
    pub wildcards: Wildcards,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            deep_match: false,
            wildcards: Wildcards::mixin_defaults(),
        }
    }
}

/// Patches one file. Returns whether its content changed.
///
/// Declarations are processed in source order and each one is registered
/// into the composer's local layer afterwards, so later declarations (in
/// this file or in files patched next with the same composer) can match
/// it.
pub fn apply_mixins_to_file(
    composer: &mut Composer,
    path: &Path,
    formatter: &dyn SourceFormatter,
    verbose: bool,
) -> Result<bool, MixinError> {
    let file = GoFile::open(path)?;
    let mut editor = SourceEditor::new(file.source());
    let mut imports = ImportSet::new();
    let mut names = ImportNames::of(&file);
    let mut changed = false;

    for decl in file.declarations() {
        let (Some(first), Some(last)) = (decl.fields().first(), decl.fields().last()) else {
            continue;
        };
        let mut summary = StructureSummary::new(decl.name());
        summary.parse_fields(&file, decl);
        if summary.is_isomorphic() {
            summary.is_exists = true;
        } else {
            for mixin in composer.substitute_summary(&mut summary, verbose) {
                if mixin.import_path.is_empty() {
                    continue;
                }
                let Some((qualifier, bare)) = mixin.name.split_once('.') else {
                    imports.add(&mixin.import_path, &mixin.import_alias);
                    continue;
                };
                let local = names.resolve(&mixin.import_path, qualifier);
                if local != qualifier {
                    debug!(file = %path.display(), mixin = %mixin.name, name = %local, "mixin package imported under another name");
                    summary.requalify(&mixin.name, &format!("{}.{}", local, bare));
                }
                let alias = if local == default_import_name(&mixin.import_path) {
                    ""
                } else {
                    local.as_str()
                };
                imports.add(&mixin.import_path, alias);
            }
        }
        if summary.is_changed {
            let indent = file.line_indent(first.span().start);
            editor.replace(Span::new(first.span().start, last.end()), summary.inner_code(indent));
            changed = true;
        }
        composer.register_substitute(summary);
    }

    if verbose {
        info!(file = %path.display(), changed, "{} {}", if changed { "+" } else { "-" }, path.display());
    } else {
        debug!(file = %path.display(), changed, "patched");
    }
    if !changed {
        return Ok(false);
    }

    let spliced = editor
        .apply()
        .map_err(|e| MixinError::splice(path, e.to_string()))?;
    let roots_before: &HashSet<String> = file.selector_roots();
    let content = match reconcile_imports(path, &spliced, roots_before, &imports) {
        Ok(content) => content,
        Err(e) => {
            std::fs::write(path, &spliced).map_err(|io| MixinError::io(path, io))?;
            return Err(e);
        }
    };
    write_go_file(path, content.as_bytes(), formatter)?;
    Ok(true)
}

/// Package names bound by the imports of the file being patched.
#[derive(Debug, Default)]
struct ImportNames {
    by_name: HashMap<String, String>,
    by_path: HashMap<String, String>,
}

impl ImportNames {
    fn of(file: &GoFile) -> Self {
        let mut names = Self::default();
        for spec in file.import_specs().filter(|spec| !spec.is_side_effect()) {
            names.bind(spec.local_name(), &spec.path);
        }
        names
    }

    fn bind(&mut self, name: String, path: &str) {
        self.by_path.entry(path.to_string()).or_insert_with(|| name.clone());
        self.by_name.entry(name).or_insert_with(|| path.to_string());
    }

    /// Name `path` is referenced by once imported; `wanted` unless the file
    /// already imports `path` under another name or `wanted` is taken.
    fn resolve(&mut self, path: &str, wanted: &str) -> String {
        if let Some(name) = self.by_path.get(path) {
            return name.clone();
        }
        let name = if self.by_name.contains_key(wanted) {
            let base = default_import_name(path);
            let mut candidate = base.clone();
            let mut n = 1;
            while self.by_name.contains_key(&candidate) {
                n += 1;
                candidate = format!("{}{}", base, n);
            }
            candidate
        } else {
            wanted.to_string()
        };
        self.bind(name.clone(), path);
        name
    }
}

/// Result of patching one file.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// `Ok(true)` when the file was rewritten
    pub result: Result<bool, MixinError>,
}

/// Everything one directory pass did.
#[derive(Debug, Default)]
pub struct DirReport {
    pub dir: PathBuf,
    /// Local mixins registered before patching
    pub local_mixins: Vec<String>,
    pub files: Vec<FileOutcome>,
}

impl DirReport {
    pub fn changed(&self) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .filter(|f| matches!(f.result, Ok(true)))
            .map(|f| f.path.as_path())
    }

    pub fn errors(&self) -> impl Iterator<Item = &MixinError> {
        self.files.iter().filter_map(|f| f.result.as_ref().err())
    }

    pub fn has_fatal(&self) -> bool {
        self.errors().any(MixinError::is_fatal)
    }
}

/// Patches every non-test `.go` file of one generated package.
///
/// The package's own mixin declarations are registered unqualified into a
/// fresh local layer first; the default layer is `defaults`.
pub fn apply_dir_mixins(
    dir: &Path,
    defaults: Arc<Registry>,
    options: &PatchOptions,
    formatter: &dyn SourceFormatter,
) -> Result<DirReport, MixinError> {
    let files = find_go_files(dir)?;
    let mut composer = Composer::new(defaults).with_reverse_matching(options.deep_match);
    let mut report = DirReport {
        dir: dir.to_path_buf(),
        ..DirReport::default()
    };

    for path in &files {
        // Parse failures surface again, per file, in the patch step.
        if let Ok(names) = add_former_mixins(composer.local_mut(), path, "", "", &options.wildcards) {
            report.local_mixins.extend(names);
        }
    }
    for path in files {
        let result = apply_mixins_to_file(&mut composer, &path, formatter, options.verbose);
        match &result {
            Err(e) if e.is_fatal() => warn!(file = %path.display(), error = %e, "file not patched"),
            Err(e) => warn!(file = %path.display(), error = %e, "file written unformatted"),
            Ok(_) => {}
        }
        report.files.push(FileOutcome { path, result });
    }
    Ok(report)
}

/// Runs [`apply_dir_mixins`] for every directory on up to `jobs` threads.
///
/// Results come back in the order of `dirs`.
pub fn run_batch(
    dirs: &[PathBuf],
    defaults: Arc<Registry>,
    options: &PatchOptions,
    formatter: &dyn SourceFormatter,
    jobs: usize,
) -> Vec<Result<DirReport, MixinError>> {
    if dirs.is_empty() {
        return Vec::new();
    }
    let jobs = jobs.clamp(1, dirs.len());
    let chunk = dirs.len().div_ceil(jobs);
    std::thread::scope(|scope| {
        let workers: Vec<_> = dirs
            .chunks(chunk)
            .map(|slice| {
                let defaults = Arc::clone(&defaults);
                scope.spawn(move || {
                    slice
                        .iter()
                        .map(|dir| apply_dir_mixins(dir, Arc::clone(&defaults), options, formatter))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        workers
            .into_iter()
            .zip(dirs.chunks(chunk))
            .flat_map(|(worker, slice)| match worker.join() {
                Ok(reports) => reports,
                Err(_) => slice
                    .iter()
                    .map(|dir| {
                        Err(MixinError::io(
                            dir,
                            std::io::Error::other("directory pass panicked"),
                        ))
                    })
                    .collect(),
            })
            .collect()
    })
}
