use std::fmt;

use super::Span;

/// Two replacements overlap, or one falls outside the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceError {
    pub message: String,
}

impl fmt::Display for SpliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SpliceError {}

/// Collects span replacements over one source text and applies them in a
/// single pass.
///
/// Spans always refer to the original text, so edits can be registered in
/// any order.
#[derive(Debug)]
pub struct SourceEditor<'a> {
    source: &'a str,
    edits: Vec<(Span, String)>,
}

impl<'a> SourceEditor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            edits: Vec::new(),
        }
    }

    pub fn replace(&mut self, span: Span, text: impl Into<String>) {
        self.edits.push((span, text.into()));
    }

    pub fn insert(&mut self, offset: usize, text: impl Into<String>) {
        self.replace(Span::new(offset, offset), text);
    }

    pub fn delete(&mut self, span: Span) {
        self.replace(span, String::new());
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Materializes the rewritten text.
    pub fn apply(mut self) -> Result<String, SpliceError> {
        self.edits.sort_by_key(|(span, _)| (span.start, span.end));
        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for (span, text) in &self.edits {
            if span.start > span.end || span.end > self.source.len() {
                return Err(SpliceError {
                    message: format!("span {}..{} is outside the source", span.start, span.end),
                });
            }
            if span.start < cursor {
                return Err(SpliceError {
                    message: format!("edit at {}..{} overlaps the previous edit", span.start, span.end),
                });
            }
            if !self.source.is_char_boundary(span.start) || !self.source.is_char_boundary(span.end) {
                return Err(SpliceError {
                    message: format!("span {}..{} splits a character", span.start, span.end),
                });
            }
            out.push_str(&self.source[cursor..span.start]);
            out.push_str(text);
            cursor = span.end;
        }
        out.push_str(&self.source[cursor..]);
        Ok(out)
    }
}
