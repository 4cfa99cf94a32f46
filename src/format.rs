//! Markup formatting for assistant replies
//!
//! Parsing produces plain data (`Block` / `InlineSpan`); rendering is a
//! separate concern so any front end can consume the same structure.

mod block;
mod html;
mod inline;

#[cfg(test)]
mod proptests;

pub use block::{format_message, Block, HeaderLevel, DEFAULT_CODE_LANGUAGE};
pub use html::{spans_to_html, to_html};
pub use inline::{format_inline, spans_text, InlineSpan};
