//! Field feature extraction.
//!
//! A feature collapses one struct field line to `name:type` so that two
//! fields generated at different times, with different column comments or
//! constraints, still compare equal.

/// Tag written on every embedded mixin; recognised by both `encoding/json`
/// and xorm.
pub const MODEL_EXTENDS: &str = "`json:\",inline\" xorm:\"extends\"`";

/// Suffix of the feature of an embedded (inline/extends) field.
pub const INLINE_SUFFIX: &str = ":inline";

const JSON_INLINE_MARKER: &str = "json:\",inline\"";
const XORM_EXTENDS_MARKER: &str = "xorm:\"extends\"";

/// Extracts the matching feature of one field declaration.
///
/// ```
/// use xgen_mixin::compose::line_feature;
///
/// assert_eq!(line_feature("Id int `json:\"id\"`"), "Id:int");
/// assert_eq!(line_feature("*xq.TimeMixin `json:\",inline\" xorm:\"extends\"`"), "*xq.TimeMixin:inline");
/// assert_eq!(line_feature("Base"), "Base");
/// ```
///
/// A trailing `//` or `/* */` comment never takes part in the feature.
pub fn line_feature(code: &str) -> String {
    let mut tokens = code
        .split_whitespace()
        .take_while(|token| !token.starts_with("//") && !token.starts_with("/*"));
    let Some(name) = tokens.next() else {
        return String::new();
    };
    match tokens.next() {
        None => name.to_string(),
        Some(second) if is_inline_tag(second) => format!("{}{}", name, INLINE_SUFFIX),
        Some(second) => format!("{}:{}", name, second),
    }
}

fn is_inline_tag(token: &str) -> bool {
    token.contains(JSON_INLINE_MARKER) || token.contains(XORM_EXTENDS_MARKER)
}

/// True for the feature of an embedded mixin.
pub fn is_inline_feature(feature: &str) -> bool {
    feature.ends_with(INLINE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_and_comment_do_not_change_feature() {
        let a = "CreatedAt time.Time `json:\"created_at\" xorm:\"created comment('创建时间') TIMESTAMP\"` // 创建时间";
        let b = "CreatedAt time.Time `json:\"created_at\" xorm:\"created TIMESTAMP\"`";
        assert_eq!(line_feature(a), "CreatedAt:time.Time");
        assert_eq!(line_feature(a), line_feature(b));
    }

    #[test]
    fn test_xorm_extends_alone_is_inline() {
        assert_eq!(
            line_feature("UserCore `xorm:\"extends\"`"),
            "UserCore:inline"
        );
    }

    #[test]
    fn test_embedded_field_with_comment() {
        assert_eq!(line_feature("Base // shared columns"), "Base");
        assert_eq!(line_feature("Base /* shared */"), "Base");
        assert_eq!(line_feature("   "), "");
    }
}
