//! Inline span scanning
//!
//! A single left-to-right pass over one line. Inline code, bold and italic
//! runs are recognized; everything else is kept verbatim as plain text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Alternation order is the tie-break: at a given start position code wins
/// over bold, and bold wins over italic.
static INLINE_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`([^`]+)`|\*\*([^*]+)\*\*|\*([^*]+)\*").expect("inline marker pattern is valid")
});

/// A run of text within one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum InlineSpan {
    PlainText(String),
    Bold(String),
    Italic(String),
    InlineCode(String),
}

impl InlineSpan {
    /// Text content without markers
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            InlineSpan::PlainText(text)
            | InlineSpan::Bold(text)
            | InlineSpan::Italic(text)
            | InlineSpan::InlineCode(text) => text,
        }
    }

    #[must_use]
    pub fn is_plain(&self) -> bool {
        matches!(self, InlineSpan::PlainText(_))
    }

    /// Re-emit the span with its original markers
    #[must_use]
    pub fn to_markup(&self) -> String {
        match self {
            InlineSpan::PlainText(text) => text.clone(),
            InlineSpan::Bold(text) => format!("**{text}**"),
            InlineSpan::Italic(text) => format!("*{text}*"),
            InlineSpan::InlineCode(text) => format!("`{text}`"),
        }
    }
}

/// Split a line into plain and styled spans.
///
/// An empty line yields no spans; a line without markers yields exactly one
/// `PlainText`. Styled content is never re-scanned, so markers inside a bold
/// run stay literal.
#[must_use]
pub fn format_inline(line: &str) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    for caps in INLINE_MARKERS.captures_iter(line) {
        let Some(whole) = caps.get(0) else {
            continue;
        };

        push_plain(&mut spans, line.get(cursor..whole.start()));

        let span = if let Some(code) = caps.get(1) {
            InlineSpan::InlineCode(code.as_str().to_owned())
        } else if let Some(bold) = caps.get(2) {
            InlineSpan::Bold(bold.as_str().to_owned())
        } else if let Some(italic) = caps.get(3) {
            InlineSpan::Italic(italic.as_str().to_owned())
        } else {
            continue;
        };
        spans.push(span);
        cursor = whole.end();
    }

    push_plain(&mut spans, line.get(cursor..));
    spans
}

/// Concatenated marker-free text of a span sequence
#[must_use]
pub fn spans_text(spans: &[InlineSpan]) -> String {
    spans.iter().map(InlineSpan::text).collect()
}

fn push_plain(spans: &mut Vec<InlineSpan>, gap: Option<&str>) {
    if let Some(gap) = gap.filter(|g| !g.is_empty()) {
        spans.push(InlineSpan::PlainText(gap.to_owned()));
    }
}
