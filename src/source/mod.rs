//! # Source Module
//!
//! Just enough of a Go front end to patch generated model files: a
//! `tree-sitter-go` walk, a span editor and the import block rewriter.
//!
//! The walk keeps only byte spans from the syntax tree. It records the
//! package clause, every import declaration and every top-level `struct`
//! type declaration with its fields. Everything else in the file is left
//! byte for byte as it was.
//!
//! ```rust
//! use std::path::Path;
//! use xgen_mixin::source::{GoFile, SourceNode};
//!
//! let src = "package db\n\ntype User struct {\n\tId int `json:\"id\"` // key\n}\n";
//! let file = GoFile::parse(Path::new("user.go"), src.to_string()).unwrap();
//! let user = &file.declarations()[0];
//! assert_eq!(user.name(), "User");
//! let id = &user.fields()[0];
//! assert_eq!(file.node_code(SourceNode::Field(id)), "Id int `json:\"id\"`");
//! assert_eq!(file.comment_text(id.comment().unwrap()), "key");
//! ```

mod editor;
mod imports;
mod parser;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::ParseError;

pub use editor::{SourceEditor, SpliceError};
pub use imports::{default_import_name, is_std_import, reconcile_imports, ImportSet, ADAPTIVE_ALIAS};

/// Half-open byte range into a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// From the start of `self` to the end of `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start, other.end)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A `//` or `/* */` comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    span: Span,
    block: bool,
}

impl CommentNode {
    pub fn span(&self) -> Span {
        self.span
    }

    /// `/* */` form, which does not end the line.
    pub fn is_block(&self) -> bool {
        self.block
    }
}

/// One field of a struct, without its trailing comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNode {
    span: Span,
    comment: Option<CommentNode>,
}

impl FieldNode {
    pub fn span(&self) -> Span {
        self.span
    }

    /// Comment on the same line after the field.
    pub fn comment(&self) -> Option<&CommentNode> {
        self.comment.as_ref()
    }

    /// End of the field including its trailing comment.
    pub fn end(&self) -> usize {
        self.comment.as_ref().map_or(self.span.end, |c| c.span.end)
    }
}

/// A top-level `type Name struct { ... }` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationNode {
    name: String,
    span: Span,
    body: Span,
    fields: Vec<FieldNode>,
}

impl DeclarationNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// From the type name through the closing brace.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Inside of the braces, exclusive.
    pub fn body(&self) -> Span {
        self.body
    }

    pub fn fields(&self) -> &[FieldNode] {
        &self.fields
    }
}

/// One `alias "path"` entry of an import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit alias, including `_` and `.`
    pub alias: Option<String>,
    /// Unquoted import path
    pub path: String,
    span: Span,
}

impl ImportSpec {
    pub fn span(&self) -> Span {
        self.span
    }

    /// Blank and dot imports are kept even when nothing references them.
    pub fn is_side_effect(&self) -> bool {
        matches!(self.alias.as_deref(), Some("_") | Some("."))
    }

    /// Identifier the package is referenced by in this file.
    pub fn local_name(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => default_import_name(&self.path),
        }
    }
}

/// An `import` declaration, single or grouped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    span: Span,
    specs: Vec<ImportSpec>,
}

impl ImportDecl {
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn specs(&self) -> &[ImportSpec] {
        &self.specs
    }
}

/// Reference to any node the parser produces.
#[derive(Debug, Clone, Copy)]
pub enum SourceNode<'a> {
    Declaration(&'a DeclarationNode),
    Field(&'a FieldNode),
    Comment(&'a CommentNode),
}

impl SourceNode<'_> {
    pub fn span(&self) -> Span {
        match self {
            SourceNode::Declaration(decl) => decl.span,
            SourceNode::Field(field) => field.span,
            SourceNode::Comment(comment) => comment.span,
        }
    }
}

/// A parsed Go source file.
#[derive(Debug, Clone)]
pub struct GoFile {
    path: PathBuf,
    source: String,
    package: String,
    package_span: Span,
    imports: Vec<ImportDecl>,
    declarations: Vec<DeclarationNode>,
    selector_roots: HashSet<String>,
}

impl GoFile {
    /// Parses `source`; `path` is only used in diagnostics.
    pub fn parse(path: &Path, source: String) -> Result<Self, ParseError> {
        let parsed = parser::parse(path, &source)?;
        Ok(Self {
            path: path.to_path_buf(),
            source,
            package: parsed.package,
            package_span: parsed.package_span,
            imports: parsed.imports,
            declarations: parsed.declarations,
            selector_roots: parsed.selector_roots,
        })
    }

    /// Reads and parses a file.
    pub fn open(path: &Path) -> Result<Self, ParseError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| ParseError::message_in_file(e.to_string(), path))?;
        Self::parse(path, source)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn package_name(&self) -> &str {
        &self.package
    }

    /// The whole `package name` clause.
    pub fn package_span(&self) -> Span {
        self.package_span
    }

    pub fn imports(&self) -> &[ImportDecl] {
        &self.imports
    }

    pub fn import_specs(&self) -> impl Iterator<Item = &ImportSpec> {
        self.imports.iter().flat_map(|decl| decl.specs.iter())
    }

    /// Struct declarations in source order.
    pub fn declarations(&self) -> &[DeclarationNode] {
        &self.declarations
    }

    /// Identifiers used as the left side of a selector (`time` in
    /// `time.Time`). Local variables show up too, so the set over-reports
    /// package usage; that only ever keeps an import.
    pub fn selector_roots(&self) -> &HashSet<String> {
        &self.selector_roots
    }

    pub fn node_code(&self, node: SourceNode<'_>) -> &str {
        let span = node.span();
        &self.source[span.start..span.end]
    }

    /// Text from the start of `begin` to the end of `end`.
    pub fn span_code(&self, begin: SourceNode<'_>, end: SourceNode<'_>) -> &str {
        let span = begin.span().to(end.span());
        &self.source[span.start..span.end]
    }

    /// Comment text without its delimiters, trimmed.
    pub fn comment_text(&self, comment: &CommentNode) -> String {
        let text = self.node_code(SourceNode::Comment(comment));
        let inner = match text.strip_prefix("//") {
            Some(rest) => rest,
            None => text
                .strip_prefix("/*")
                .and_then(|t| t.strip_suffix("*/"))
                .unwrap_or(text),
        };
        inner.trim().to_string()
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn line_indent(&self, offset: usize) -> &str {
        let offset = offset.min(self.source.len());
        let line_start = self.source[..offset].rfind('\n').map_or(0, |i| i + 1);
        let rest = &self.source[line_start..];
        let width = rest
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(rest.len());
        &rest[..width]
    }

    pub fn into_source(self) -> String {
        self.source
    }
}

#[cfg(test)]
mod tests;
