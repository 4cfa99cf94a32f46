//! Effects produced by state transitions

use crate::failure::ChatFailure;
use crate::message::{HistoryRecord, Sender};

/// A message to append; the runtime assigns its timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub sender: Sender,
    pub text: String,
}

impl Draft {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// A backend call requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Send a prompt for a reply
    SendPrompt { user_id: String, prompt: String },

    /// Send the clear-history sentinel
    SendClear { user_id: String },

    /// Fetch stored history
    FetchHistory { user_id: String },
}

/// Effects to be executed after a state transition
#[derive(Debug, Clone)]
pub enum Effect {
    /// Append one message to the log
    AppendMessage(Draft),

    /// Replace the whole log
    ReplaceLog { entries: Vec<Draft> },

    /// Replace the log with stored history
    RestoreHistory { records: Vec<HistoryRecord> },

    /// Empty the input buffer
    ClearInput,

    /// Call the backend; the runtime issues it outside the state lock
    Call(Call),

    /// Record a failure that is not shown in the conversation
    LogFailure {
        operation: &'static str,
        failure: ChatFailure,
    },
}

impl Effect {
    #[must_use]
    pub fn append_user(text: impl Into<String>) -> Self {
        Effect::AppendMessage(Draft::user(text))
    }

    #[must_use]
    pub fn append_bot(text: impl Into<String>) -> Self {
        Effect::AppendMessage(Draft::bot(text))
    }

    #[must_use]
    pub fn send_prompt(user_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Effect::Call(Call::SendPrompt {
            user_id: user_id.into(),
            prompt: prompt.into(),
        })
    }

    #[must_use]
    pub fn send_clear(user_id: impl Into<String>) -> Self {
        Effect::Call(Call::SendClear {
            user_id: user_id.into(),
        })
    }

    #[must_use]
    pub fn fetch_history(user_id: impl Into<String>) -> Self {
        Effect::Call(Call::FetchHistory {
            user_id: user_id.into(),
        })
    }

    /// Whether executing this effect calls the backend
    #[must_use]
    pub fn is_outbound(&self) -> bool {
        matches!(self, Effect::Call(_))
    }
}
