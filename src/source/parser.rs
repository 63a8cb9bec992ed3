//! Go syntax tree walk with `tree-sitter-go`.
//!
//! Only the nodes a patch needs are lifted out of the tree: the package
//! clause, import specs, top-level struct type specs with their fields and
//! trailing comments, and the package names used in qualified types and
//! selectors.

use std::collections::HashSet;
use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree};

use super::{CommentNode, DeclarationNode, FieldNode, ImportDecl, ImportSpec, Span};
use crate::error::ParseError;

pub(crate) struct Parsed {
    pub(crate) package: String,
    pub(crate) package_span: Span,
    pub(crate) imports: Vec<ImportDecl>,
    pub(crate) declarations: Vec<DeclarationNode>,
    pub(crate) selector_roots: HashSet<String>,
}

fn go_language() -> Language {
    tree_sitter_go::LANGUAGE.into()
}

pub(crate) fn parse(path: &Path, source: &str) -> Result<Parsed, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&go_language())
        .map_err(|e| ParseError::message_in_file(format!("Failed to set language: {}", e), path))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ParseError::message_in_file("Failed to parse content", path))?;
    check_syntax(path, source, &tree)?;

    let root = tree.root_node();
    let mut package = None;
    let mut imports = Vec::new();
    let mut declarations = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        match child.kind() {
            "package_clause" => {
                let name = named_child_of_kind(child, "package_identifier")
                    .map(|n| text(source, n).to_string())
                    .unwrap_or_default();
                package = Some((name, span(child)));
            }
            "import_declaration" => imports.push(import_decl(source, child)),
            "type_declaration" => type_decl(source, child, &mut declarations),
            _ => {}
        }
    }
    let Some((package, package_span)) = package else {
        let offset = first_code_offset(root);
        return Err(ParseError::at_offset("expected package clause", path, source, offset));
    };

    Ok(Parsed {
        package,
        package_span,
        imports,
        declarations,
        selector_roots: collect_selector_roots(source, root),
    })
}

fn span(node: Node<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

fn text<'s>(source: &'s str, node: Node<'_>) -> &'s str {
    &source[node.byte_range()]
}

fn named_child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|n| n.kind() == kind);
    found
}

fn first_code_offset(root: Node<'_>) -> usize {
    let mut cursor = root.walk();
    let offset = root
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")
        .map_or(0, |n| n.start_byte());
    offset
}

/// Reports the first `ERROR` or `MISSING` node in source order.
fn check_syntax(path: &Path, source: &str, tree: &Tree) -> Result<(), ParseError> {
    let root = tree.root_node();
    if !root.has_error() {
        return Ok(());
    }
    let mut node = root;
    loop {
        if node.is_missing() {
            let message = format!("missing `{}`", node.kind());
            return Err(ParseError::at_offset(message, path, source, node.start_byte()));
        }
        if node.is_error() {
            let snippet: String = text(source, node).chars().take(20).collect();
            let message = format!("unexpected `{}`", snippet.trim());
            return Err(ParseError::at_offset(message, path, source, node.start_byte()));
        }
        let mut cursor = node.walk();
        let next = node
            .children(&mut cursor)
            .find(|child| child.has_error() || child.is_missing());
        match next {
            Some(child) => node = child,
            None => {
                return Err(ParseError::at_offset(
                    "syntax error",
                    path,
                    source,
                    node.start_byte(),
                ))
            }
        }
    }
}

fn import_decl(source: &str, node: Node<'_>) -> ImportDecl {
    let mut specs = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => specs.extend(import_spec(source, child)),
            "import_spec_list" => {
                let mut inner = child.walk();
                for spec in child.named_children(&mut inner) {
                    if spec.kind() == "import_spec" {
                        specs.extend(import_spec(source, spec));
                    }
                }
            }
            _ => {}
        }
    }
    ImportDecl {
        span: span(node),
        specs,
    }
}

fn import_spec(source: &str, node: Node<'_>) -> Option<ImportSpec> {
    let path = node.child_by_field_name("path")?;
    let alias = node
        .child_by_field_name("name")
        .map(|n| text(source, n).to_string());
    Some(ImportSpec {
        alias,
        path: text(source, path).trim_matches(|c| c == '"' || c == '`').to_string(),
        span: span(node),
    })
}

fn type_decl(source: &str, node: Node<'_>, out: &mut Vec<DeclarationNode>) {
    let mut cursor = node.walk();
    for spec in node.named_children(&mut cursor) {
        if spec.kind() != "type_spec" {
            continue;
        }
        let (Some(name), Some(ty)) = (
            spec.child_by_field_name("name"),
            spec.child_by_field_name("type"),
        ) else {
            continue;
        };
        if ty.kind() != "struct_type" {
            continue;
        }
        let Some(list) = named_child_of_kind(ty, "field_declaration_list") else {
            continue;
        };
        out.push(DeclarationNode {
            name: text(source, name).to_string(),
            span: Span::new(spec.start_byte(), ty.end_byte()),
            body: Span::new(list.start_byte() + 1, list.end_byte().saturating_sub(1)),
            fields: struct_fields(source, list),
        });
    }
}

/// Fields of a `field_declaration_list`, each with the comment that
/// follows it on the same line, if any.
fn struct_fields(source: &str, list: Node<'_>) -> Vec<FieldNode> {
    let mut cursor = list.walk();
    let children: Vec<Node<'_>> = list.children(&mut cursor).collect();

    let mut comments = Vec::new();
    let mut decls = Vec::new();
    for child in &children {
        match child.kind() {
            "comment" => comments.push(*child),
            "field_declaration" => {
                let mut inner = child.walk();
                comments.extend(child.children(&mut inner).filter(|n| n.kind() == "comment"));
                decls.push(*child);
            }
            _ => {}
        }
    }
    comments.sort_by_key(|c| c.start_byte());

    let list_end = list.end_byte();
    decls
        .iter()
        .enumerate()
        .map(|(i, decl)| {
            let code = field_code(*decl);
            let next_start = decls.get(i + 1).map_or(list_end, |n| n.start_byte());
            let comment = comments
                .iter()
                .find(|c| {
                    c.start_byte() >= code.end_byte()
                        && c.start_byte() < next_start
                        && c.start_position().row == code.end_position().row
                })
                .map(|c| CommentNode {
                    span: span(*c),
                    block: text(source, *c).starts_with("/*"),
                });
            FieldNode {
                span: Span::new(decl.start_byte(), code.end_byte()),
                comment,
            }
        })
        .collect()
}

/// Last child of a field that is not a comment.
fn field_code(decl: Node<'_>) -> Node<'_> {
    let mut cursor = decl.walk();
    let last = decl
        .children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .last();
    last.unwrap_or(decl)
}


/// Package names in `pkg.Type` and roots of `x.y` selector chains.
fn collect_selector_roots(source: &str, root: Node<'_>) -> HashSet<String> {
    let mut roots = HashSet::new();
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        match node.kind() {
            "qualified_type" => {
                if let Some(package) = node.child_by_field_name("package") {
                    roots.insert(text(source, package).to_string());
                }
            }
            "selector_expression" => {
                if let Some(operand) = node.child_by_field_name("operand") {
                    if operand.kind() == "identifier" {
                        roots.insert(text(source, operand).to_string());
                    }
                }
            }
            _ => {}
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return roots;
            }
        }
    }
}
