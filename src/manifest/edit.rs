//! Text splicing.

use super::Span;

/// Replace the bytes covered by `span` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub span: Span,
    pub text: String,
}

impl Edit {
    pub fn new(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
        }
    }
}

/// Apply non-overlapping edits to `source`.
///
/// Edits are applied back to front so the offsets of the remaining ones
/// stay valid; the order they are passed in does not matter.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by(|a, b| b.span.start.cmp(&a.span.start));

    let mut output = source.to_string();
    for edit in edits {
        output.replace_range(edit.span.start..edit.span.end, &edit.text);
    }
    output
}

/// Encode `value` as a JSON string literal, quotes included.
pub fn quote(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}
