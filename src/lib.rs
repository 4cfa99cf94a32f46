//! Chat turn engine
//!
//! Formats bot replies into display blocks, turns backend failures into
//! readable chat lines, and drives a single-flight conversation session
//! against a pluggable backend.

pub mod config;
pub mod failure;
pub mod format;
pub mod message;
pub mod runtime;
pub mod state_machine;

pub use config::{Cli, EngineConfig, OutputFormat};
pub use failure::{normalize_error, ChatFailure, FailureKind, FALLBACK_ERROR_MESSAGE};
pub use format::{format_inline, format_message, to_html, Block, HeaderLevel, InlineSpan};
pub use message::{HistoryRecord, Message, RenderedMessage, Sender};
pub use runtime::{ChatBackend, ChatSession, ChatSnapshot, Confirmer, FnConfirmer};
pub use state_machine::{ChatState, TransitionError};
