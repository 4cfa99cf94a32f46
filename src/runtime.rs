//! Session runtime
//!
//! Owns the conversation log and executes the effects produced by the state
//! machine against the host's backend and confirmation prompt.

mod executor;
pub mod traits;


pub use executor::{ChatSession, CLEAR_HISTORY_PROMPT};
pub use traits::*;

use crate::message::{Message, RenderedMessage};
use serde::Serialize;

/// What a host renders: the log, the input buffer and the loading flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatSnapshot {
    pub messages: Vec<Message>,
    pub input: String,
    pub loading: bool,
}

impl ChatSnapshot {
    /// Messages paired with their display structure
    #[must_use]
    pub fn rendered(&self) -> Vec<RenderedMessage> {
        self.messages.iter().map(Message::render).collect()
    }
}
