//! Per-declaration summaries: field lines, features and cached fingerprints.

use std::sync::{Arc, OnceLock};

use super::feature::{is_inline_feature, line_feature, MODEL_EXTENDS};
use crate::source::{DeclarationNode, GoFile, SourceNode};
use crate::text::truncate_text;

/// Longest field comment (in characters) carried into a rewritten line.
pub const COMMENT_MAX_CHARS: usize = 50;

/// Value cached against the generation of its owner.
///
/// A summary bumps its generation on every mutation. A stale memo is never
/// served: reads through `&self` recompute without caching, and the next
/// `&mut` access resets the cell.
#[derive(Debug, Clone)]
struct Memo<T> {
    generation: u64,
    cell: OnceLock<T>,
}

impl<T: Clone> Memo<T> {
    fn new(generation: u64) -> Self {
        Self {
            generation,
            cell: OnceLock::new(),
        }
    }

    fn get_or_init(&self, generation: u64, init: impl FnOnce() -> T) -> T {
        if self.generation == generation {
            self.cell.get_or_init(init).clone()
        } else {
            init()
        }
    }

    fn sync(&mut self, generation: u64) {
        if self.generation != generation {
            *self = Self::new(generation);
        }
    }
}

/// Summary of one struct declaration (a generated model or a mixin).
///
/// `features[i]` is always the feature of `field_lines[i]`; both are only
/// replaced together.
#[derive(Debug, Clone)]
pub struct StructureSummary {
    /// Declaration name, qualified (`xq.TimeMixin`) when imported
    pub name: String,
    /// Import path the name must be imported from (empty when local)
    pub import_path: String,
    /// Import alias (`#` resolves to no alias)
    pub import_alias: String,
    /// Mixins already folded into this declaration
    pub children: Vec<String>,
    /// At least one substitution was applied
    pub is_changed: bool,
    /// Fully reduced to an alias of another declaration
    pub is_exists: bool,
    field_lines: Vec<String>,
    features: Vec<String>,
    generation: u64,
    sorted: Memo<Arc<[String]>>,
    substitute: OnceLock<String>,
}

impl StructureSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            import_path: String::new(),
            import_alias: String::new(),
            children: Vec::new(),
            is_changed: false,
            is_exists: false,
            field_lines: Vec::new(),
            features: Vec::new(),
            generation: 0,
            sorted: Memo::new(0),
            substitute: OnceLock::new(),
        }
    }

    /// Builds a summary from verbatim field lines.
    pub fn from_lines<I, S>(name: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut summary = Self::new(name);
        summary.set_field_lines(lines.into_iter().map(Into::into).collect());
        summary
    }

    /// Sets where the summary's symbol is imported from.
    pub fn with_import(mut self, path: impl Into<String>, alias: impl Into<String>) -> Self {
        self.import_path = path.into();
        self.import_alias = alias.into();
        self
    }

    pub fn field_lines(&self) -> &[String] {
        &self.field_lines
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Replaces every field line and recomputes the features.
    pub fn set_field_lines(&mut self, lines: Vec<String>) {
        self.features = lines.iter().map(|line| line_feature(line)).collect();
        self.field_lines = lines;
        self.touch();
    }

    fn touch(&mut self) {
        self.generation += 1;
        self.sorted.sync(self.generation);
    }

    /// Reads every field of `decl`, keeping its trailing comment.
    ///
    /// Returns the number of fields.
    pub fn parse_fields(&mut self, file: &GoFile, decl: &DeclarationNode) -> usize {
        let mut lines = Vec::with_capacity(decl.fields().len());
        let mut features = Vec::with_capacity(decl.fields().len());
        for field in decl.fields() {
            let mut code = file.node_code(SourceNode::Field(field)).to_string();
            features.push(line_feature(&code));
            if let Some(comment) = field.comment() {
                let text = truncate_text(&file.comment_text(comment), COMMENT_MAX_CHARS);
                if !text.is_empty() && comment.is_block() {
                    // Code may follow a block comment on the same line.
                    code.push_str(&format!(" /* {} */", text));
                } else if !text.is_empty() {
                    code.push_str(" // ");
                    code.push_str(&text);
                }
            }
            lines.push(code);
        }
        self.field_lines = lines;
        self.features = features;
        self.touch();
        self.field_lines.len()
    }

    /// Sorted feature fingerprint, computed once per generation.
    pub fn sorted_features(&self) -> Arc<[String]> {
        self.sorted.get_or_init(self.generation, || {
            let mut sorted = self.features.clone();
            sorted.sort();
            sorted.into()
        })
    }

    /// Already nothing but an embed of another declaration.
    pub fn is_isomorphic(&self) -> bool {
        let sorted = self.sorted_features();
        sorted.len() == 1 && is_inline_feature(&sorted[0])
    }

    /// The embed line that stands in for this summary's fields.
    ///
    /// The first call fixes the prefix (`""` or `"*"`). An unnamed summary
    /// has no embed line and yields `""`.
    pub fn substitute(&self, prefix: &str) -> &str {
        self.substitute.get_or_init(|| {
            if self.name.is_empty() {
                String::new()
            } else {
                format!("{}{} {}", prefix, self.name, MODEL_EXTENDS)
            }
        })
    }

    /// Folds `fragment` into this summary.
    ///
    /// Every field whose feature belongs to the fragment is removed; the
    /// first removed position receives the fragment's embed line. Returns
    /// `false` without touching anything when no feature is shared.
    pub fn replace_summary(&mut self, fragment: &StructureSummary) -> bool {
        let embed = fragment.substitute("");
        if embed.is_empty() {
            return false;
        }
        let fingerprint = fragment.sorted_features();
        let mut found = false;
        let mut features = Vec::with_capacity(self.features.len());
        let mut lines = Vec::with_capacity(self.field_lines.len());
        for (feature, line) in self.features.iter().zip(&self.field_lines) {
            if fingerprint.binary_search(feature).is_err() {
                features.push(feature.clone());
                lines.push(line.clone());
            } else if !found {
                features.push(line_feature(embed));
                lines.push(embed.to_string());
                found = true;
            }
        }
        if found {
            self.features = features;
            self.field_lines = lines;
            self.is_changed = true;
            self.touch();
        }
        found
    }

    /// Renames the embed of `mixin` to `qualified`.
    ///
    /// Used when the package qualifier of a mixin is bound to another
    /// import in the file being patched. Returns `false` when no line
    /// embeds `mixin`.
    pub fn requalify(&mut self, mixin: &str, qualified: &str) -> bool {
        let target = line_feature(&format!("{} {}", mixin, MODEL_EXTENDS));
        let mut found = false;
        for (feature, line) in self.features.iter_mut().zip(self.field_lines.iter_mut()) {
            if *feature == target {
                *line = line.replacen(mixin, qualified, 1);
                *feature = line_feature(line);
                found = true;
            }
        }
        if found {
            self.touch();
        }
        found
    }

    /// Field lines joined for the inside of `struct { ... }`.
    ///
    /// `indent` is placed before every line but the first, which keeps
    /// the indentation already present in front of the replaced span.
    pub fn inner_code(&self, indent: &str) -> String {
        self.field_lines.join(&format!("\n{}", indent))
    }
}
