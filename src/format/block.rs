//! Block-level structure of a message
//!
//! Lines are walked with an explicit cursor because fenced code blocks span
//! several lines. The order of the line checks matters: fences first, then
//! blank lines, `###` before `##`, bullets, numbered items, paragraphs.

use super::inline::{format_inline, spans_text, InlineSpan};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

const FENCE: &str = "```";

/// Language recorded for a fence that does not declare one
pub const DEFAULT_CODE_LANGUAGE: &str = "text";

const BULLET_PREFIXES: [&str; 3] = ["- ", "* ", "• "];

static NUMBERED_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]+)\.\s+(.*)").expect("numbered item pattern is valid")
});

/// Header depth; only `##` and `###` are recognized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderLevel {
    H2,
    H3,
}

impl HeaderLevel {
    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            HeaderLevel::H2 => 2,
            HeaderLevel::H3 => 3,
        }
    }
}

/// One block-level element of a formatted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        content: Vec<InlineSpan>,
    },
    Header {
        level: HeaderLevel,
        content: Vec<InlineSpan>,
    },
    BulletItem {
        content: Vec<InlineSpan>,
    },
    NumberedItem {
        /// The number exactly as written, e.g. `"01"`
        index: String,
        content: Vec<InlineSpan>,
    },
    /// Lines are kept verbatim; no inline formatting is applied
    CodeBlock {
        language: String,
        lines: Vec<String>,
    },
    BlankLine,
}

impl Block {
    /// Marker-free text of the block. Code blocks join their lines with `\n`.
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph { content }
            | Block::Header { content, .. }
            | Block::BulletItem { content }
            | Block::NumberedItem { content, .. } => spans_text(content),
            Block::CodeBlock { lines, .. } => lines.join("\n"),
            Block::BlankLine => String::new(),
        }
    }

    /// Inline content, if the block has any
    #[must_use]
    pub fn content(&self) -> Option<&[InlineSpan]> {
        match self {
            Block::Paragraph { content }
            | Block::Header { content, .. }
            | Block::BulletItem { content }
            | Block::NumberedItem { content, .. } => Some(content),
            Block::CodeBlock { .. } | Block::BlankLine => None,
        }
    }
}

/// Format a full message into block elements.
///
/// Empty input produces no blocks.
#[must_use]
pub fn format_message(text: &str) -> Vec<Block> {
    if text.is_empty() {
        return Vec::new();
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let mut blocks = Vec::with_capacity(lines.len());
    let mut cursor = 0;

    while let Some(&line) = lines.get(cursor) {
        cursor += 1;

        if let Some(declared) = line.trim().strip_prefix(FENCE) {
            let language = match declared.trim() {
                "" => DEFAULT_CODE_LANGUAGE,
                lang => lang,
            };
            let mut code = Vec::new();
            // Runs to the closing fence (consumed, not emitted) or end of input
            while let Some(&next) = lines.get(cursor) {
                cursor += 1;
                if next.trim().starts_with(FENCE) {
                    break;
                }
                code.push(next.to_owned());
            }
            blocks.push(Block::CodeBlock {
                language: language.to_owned(),
                lines: code,
            });
            continue;
        }

        blocks.push(format_line(line));
    }

    blocks
}

/// Classify a single line outside a code fence
fn format_line(line: &str) -> Block {
    if line.trim().is_empty() {
        return Block::BlankLine;
    }

    if let Some(rest) = line.strip_prefix("###") {
        return Block::Header {
            level: HeaderLevel::H3,
            content: format_inline(rest.trim()),
        };
    }

    if let Some(rest) = line.strip_prefix("##") {
        return Block::Header {
            level: HeaderLevel::H2,
            content: format_inline(rest.trim()),
        };
    }

    if let Some(rest) = BULLET_PREFIXES
        .iter()
        .find_map(|prefix| line.strip_prefix(*prefix))
    {
        return Block::BulletItem {
            content: format_inline(rest),
        };
    }

    if let Some(caps) = NUMBERED_ITEM.captures(line) {
        let index = caps.get(1).map_or("", |m| m.as_str());
        let rest = caps.get(2).map_or("", |m| m.as_str());
        return Block::NumberedItem {
            index: index.to_owned(),
            content: format_inline(rest),
        };
    }

    Block::Paragraph {
        content: format_inline(line),
    }
}
