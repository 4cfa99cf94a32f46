//! Property-based tests for the formatter
//!
//! The formatter must never lose text: spans re-emit their markers exactly,
//! and every input line is accounted for by exactly one block or code line.

use super::*;
use proptest::prelude::*;

// ============================================================================
// Generators
// ============================================================================

/// Prose that cannot be mistaken for a header, list item or fence
fn arb_prose_line() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9 ,.!?()]{0,40}"
}

fn arb_marked_line() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            "[a-z ]{1,8}",
            "[a-z ]{1,8}".prop_map(|s| format!("**{s}**")),
            "[a-z ]{1,8}".prop_map(|s| format!("*{s}*")),
            "[a-z ]{1,8}".prop_map(|s| format!("`{s}`")),
            Just("*".to_string()),
            Just("`".to_string()),
        ],
        0..8,
    )
    .prop_map(|parts| parts.concat())
}

fn arb_message_line() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_prose_line(),
        arb_marked_line(),
        Just(String::new()),
        Just("   ".to_string()),
        arb_prose_line().prop_map(|s| format!("- {s}")),
        arb_prose_line().prop_map(|s| format!("## {s}")),
        arb_prose_line().prop_map(|s| format!("### {s}")),
        (1u32..50, arb_prose_line()).prop_map(|(n, s)| format!("{n}. {s}")),
        "[a-z]{0,4}".prop_map(|lang| format!("```{lang}")),
    ]
}

fn arb_message() -> impl Strategy<Value = String> {
    proptest::collection::vec(arb_message_line(), 1..20).prop_map(|lines| lines.join("\n"))
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_spans_reemit_the_line(line in "\\PC{0,60}") {
        let rebuilt: String = format_inline(&line).iter().map(InlineSpan::to_markup).collect();
        prop_assert_eq!(rebuilt, line);
    }

    #[test]
    fn prop_marked_line_reemits(line in arb_marked_line()) {
        let rebuilt: String = format_inline(&line).iter().map(InlineSpan::to_markup).collect();
        prop_assert_eq!(rebuilt, line);
    }

    #[test]
    fn prop_no_adjacent_plain_spans(line in arb_marked_line()) {
        let spans = format_inline(&line);
        for pair in spans.windows(2) {
            prop_assert!(!(pair[0].is_plain() && pair[1].is_plain()));
        }
    }

    #[test]
    fn prop_styled_spans_are_never_empty(line in arb_marked_line()) {
        for span in format_inline(&line) {
            prop_assert!(!span.text().is_empty());
        }
    }

    #[test]
    fn prop_prose_is_one_paragraph(text in arb_prose_line()) {
        let blocks = format_message(&text);
        prop_assert_eq!(blocks.len(), 1);
        let is_paragraph = matches!(blocks[0], Block::Paragraph { .. });
        prop_assert!(is_paragraph);
        prop_assert_eq!(blocks[0].plain_text(), text);
    }

    #[test]
    fn prop_every_line_is_accounted_for(text in arb_message()) {
        prop_assume!(!text.is_empty());
        let line_count = text.split('\n').count();
        let blocks = format_message(&text);

        // Each non-code block is one line; a code block is its content plus
        // an opening fence and at most one closing fence.
        let mut min_lines = 0;
        let mut max_lines = 0;
        for block in &blocks {
            match block {
                Block::CodeBlock { lines, .. } => {
                    min_lines += lines.len() + 1;
                    max_lines += lines.len() + 2;
                }
                _ => {
                    min_lines += 1;
                    max_lines += 1;
                }
            }
        }
        prop_assert!(min_lines <= line_count && line_count <= max_lines);
    }

    #[test]
    fn prop_fence_free_text_maps_line_to_block(
        lines in proptest::collection::vec(arb_prose_line(), 1..10)
    ) {
        let text = lines.join("\n");
        let blocks = format_message(&text);
        prop_assert_eq!(blocks.len(), lines.len());
        for (block, line) in blocks.iter().zip(&lines) {
            prop_assert_eq!(&block.plain_text(), line);
        }
    }

    #[test]
    fn prop_html_escapes_all_text(text in "[a-z<>& \n]{0,60}") {
        let html = to_html(&format_message(&text));
        let stripped = html.replace("<p>", "").replace("</p>", "").replace("<br>", "");
        prop_assert!(!stripped.contains('<'));
        prop_assert!(!stripped.contains('>'));
    }
}
