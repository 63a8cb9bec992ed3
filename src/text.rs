//! Small text helpers shared by the summary and the import renderer.

/// Collapses every run of whitespace (newlines included) into one space.
pub fn reduce_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates `s` to at most `size` characters, ending with `...` when cut.
///
/// Counts characters, not bytes, so CJK column comments are never split in
/// the middle of a code point. The result is always a single line.
pub fn truncate_text(s: &str, size: usize) -> String {
    if s.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = s.chars().collect();
    if size > 3 && chars.len() > size {
        let head: String = chars[..size - 3].iter().collect();
        return reduce_spaces(&format!("{}...", head));
    }
    reduce_spaces(s)
}
