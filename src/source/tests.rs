use std::path::Path;

use super::*;

const MODELS: &str = r#"package default

import (
	"time"

	xq "github.com/azhai/xgen/xquery"
)

// User 用户
type User struct {
	Id        int       `json:"id" xorm:"notnull pk autoincr INT(10)"`
	Username  string    `json:"username" xorm:"notnull default '' VARCHAR(50)"` // 用户名
	CreatedAt time.Time `json:"created_at" xorm:"created TIMESTAMP"`          /* 创建时间 */
}

func (User) TableName() string {
	return "t_user"
}

type (
	Role struct {
		Id   int
		Name string; Level int
	}
	Code int
	Pair[K comparable, V any] struct {
		Key K
		Val V
	}
)

type Empty struct{}

type Menu struct {
	*xq.NestedMixin `json:",inline" xorm:"extends"`
	Meta struct {
		Title string
	} `json:"meta"`
}
"#;

fn parse(src: &str) -> GoFile {
    GoFile::parse(Path::new("models.go"), src.to_string()).unwrap()
}

#[test]
fn test_package_and_imports() {
    let file = parse(MODELS);
    assert_eq!(file.package_name(), "default");
    let clause = file.package_span();
    assert_eq!(&file.source()[clause.start..clause.end], "package default");
    let specs: Vec<_> = file.import_specs().collect();
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].path, "time");
    assert_eq!(specs[0].alias, None);
    assert_eq!(specs[1].alias.as_deref(), Some("xq"));
    assert_eq!(specs[1].local_name(), "xq");
    assert!(file.source()[file.imports()[0].span().start..].starts_with("import ("));
}

#[test]
fn test_struct_declarations_in_order() {
    let file = parse(MODELS);
    let names: Vec<_> = file.declarations().iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["User", "Role", "Pair", "Empty", "Menu"]);
    assert!(file.declarations()[3].fields().is_empty());
}

#[test]
fn test_fields_and_trailing_comments() {
    let file = parse(MODELS);
    let user = &file.declarations()[0];
    let fields = user.fields();
    assert_eq!(fields.len(), 3);
    assert_eq!(
        file.node_code(SourceNode::Field(&fields[0])),
        "Id        int       `json:\"id\" xorm:\"notnull pk autoincr INT(10)\"`"
    );
    assert!(fields[0].comment().is_none());
    let username = fields[1].comment().unwrap();
    assert_eq!(file.comment_text(username), "用户名");
    let created = fields[2].comment().unwrap();
    assert_eq!(file.comment_text(created), "创建时间");
    assert_eq!(fields[2].end(), created.span().end);
}

#[test]
fn test_semicolon_separated_fields() {
    let file = parse(MODELS);
    let role = &file.declarations()[1];
    let codes: Vec<_> = role
        .fields()
        .iter()
        .map(|f| file.node_code(SourceNode::Field(f)))
        .collect();
    assert_eq!(codes, vec!["Id   int", "Name string", "Level int"]);
}

#[test]
fn test_nested_struct_field_spans_lines() {
    let file = parse(MODELS);
    let menu = &file.declarations()[4];
    assert_eq!(menu.fields().len(), 2);
    let meta = file.node_code(SourceNode::Field(&menu.fields()[1]));
    assert!(meta.starts_with("Meta struct {"));
    assert!(meta.ends_with("} `json:\"meta\"`"));
    assert_eq!(
        file.node_code(SourceNode::Field(&menu.fields()[0])),
        "*xq.NestedMixin `json:\",inline\" xorm:\"extends\"`"
    );
}

#[test]
fn test_span_code_and_indent() {
    let file = parse(MODELS);
    let user = &file.declarations()[0];
    let first = &user.fields()[0];
    let last = &user.fields()[2];
    let comment = last.comment().unwrap();
    let code = file.span_code(SourceNode::Field(first), SourceNode::Comment(comment));
    assert!(code.starts_with("Id "));
    assert!(code.ends_with("/* 创建时间 */"));
    assert_eq!(file.line_indent(first.span().start), "\t");
    assert!(file.node_code(SourceNode::Declaration(user)).starts_with("User struct {"));
}

#[test]
fn test_selector_roots() {
    let file = parse(MODELS);
    let roots = file.selector_roots();
    assert!(roots.contains("time"));
    assert!(roots.contains("xq"));
    assert!(!roots.contains("NestedMixin"));
}

#[test]
fn test_missing_package_clause() {
    let err = GoFile::parse(Path::new("bad.go"), "type A struct{}\n".to_string()).unwrap_err();
    assert_eq!(err.line, 1);
    assert!(err.message.contains("package clause"));
}

#[test]
fn test_unclosed_struct_is_reported_after_its_opening() {
    let err = GoFile::parse(
        Path::new("bad.go"),
        "package m\n\ntype A struct {\n\tId int\n".to_string(),
    )
    .unwrap_err();
    assert!(err.line >= 3);
}

#[test]
fn test_unbalanced_function_body() {
    let result = GoFile::parse(Path::new("bad.go"), "package m\nfunc f() {\n".to_string());
    assert!(result.is_err());
}

#[test]
fn test_comment_forms() {
    let file = parse(MODELS);
    let fields = file.declarations()[0].fields();
    assert!(!fields[1].comment().unwrap().is_block());
    assert!(fields[2].comment().unwrap().is_block());
}

#[test]
fn test_struct_text_inside_strings_and_functions_is_not_a_declaration() {
    let src = "package m\n\nvar tpl = `type Fake struct {\n\tId int\n}`\n\nfunc f() {\n\ttype local struct{ X int }\n\t_ = local{}\n}\n\ntype Real struct {\n\tId int // key\n\tName string\n}\n";
    let file = parse(src);
    let names: Vec<_> = file.declarations().iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["Real"]);
    let fields = file.declarations()[0].fields();
    assert_eq!(fields.len(), 2);
    assert_eq!(file.comment_text(fields[0].comment().unwrap()), "key");
    assert!(fields[1].comment().is_none());
}

#[test]
fn test_comment_on_its_own_line_is_not_trailing() {
    let src = "package m\n\ntype A struct {\n\tId int\n\t// Name of the row\n\tName string\n}\n";
    let file = parse(src);
    let fields = file.declarations()[0].fields();
    assert!(fields[0].comment().is_none());
    assert!(fields[1].comment().is_none());
}
