//! Reference HTML rendering of formatted blocks
//!
//! Mirrors the markup the chat panel displays: one element per block, list
//! items carry their own marker, blank lines become `<br>`. All text is
//! escaped.

use super::block::Block;
use super::inline::InlineSpan;
use std::fmt::Write;

/// Render a block sequence as an HTML fragment
#[must_use]
pub fn to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        push_block(&mut out, block);
    }
    out
}

/// Render inline spans without a surrounding element
#[must_use]
pub fn spans_to_html(spans: &[InlineSpan]) -> String {
    let mut out = String::new();
    push_spans(&mut out, spans);
    out
}

fn push_block(out: &mut String, block: &Block) {
    match block {
        Block::Paragraph { content } => {
            out.push_str("<p>");
            push_spans(out, content);
            out.push_str("</p>");
        }
        Block::Header { level, content } => {
            let level = level.as_u8();
            let _ = write!(out, "<h{level}>");
            push_spans(out, content);
            let _ = write!(out, "</h{level}>");
        }
        Block::BulletItem { content } => {
            out.push_str(r#"<div class="list-item"><span class="marker">•</span><span>"#);
            push_spans(out, content);
            out.push_str("</span></div>");
        }
        Block::NumberedItem { index, content } => {
            let _ = write!(
                out,
                r#"<div class="list-item"><span class="marker">{}.</span><span>"#,
                escape(index)
            );
            push_spans(out, content);
            out.push_str("</span></div>");
        }
        Block::CodeBlock { language, lines } => {
            let _ = write!(
                out,
                r#"<pre><code class="language-{}">"#,
                escape(language)
            );
            out.push_str(&escape(&lines.join("\n")));
            out.push_str("</code></pre>");
        }
        Block::BlankLine => out.push_str("<br>"),
    }
    out.push('\n');
}

fn push_spans(out: &mut String, spans: &[InlineSpan]) {
    for span in spans {
        let (open, close) = match span {
            InlineSpan::PlainText(_) => ("", ""),
            InlineSpan::Bold(_) => ("<strong>", "</strong>"),
            InlineSpan::Italic(_) => ("<em>", "</em>"),
            InlineSpan::InlineCode(_) => ("<code>", "</code>"),
        };
        out.push_str(open);
        out.push_str(&escape(span.text()));
        out.push_str(close);
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
