//! Conversation state types

use serde::{Deserialize, Serialize};

/// The collaborator call a `Sending` conversation is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingCall {
    /// A user prompt sent for a reply
    Prompt,
    /// The clear-history sentinel
    ClearHistory,
    /// The one-shot history fetch
    History,
}

/// Conversation state
///
/// Every collaborator call goes through `Sending`, so at most one is ever in
/// flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatState {
    /// Ready for input, nothing outstanding
    #[default]
    Idle,

    /// Awaiting the backend
    Sending { call: PendingCall },
}

impl ChatState {
    #[must_use]
    pub fn sending(call: PendingCall) -> Self {
        ChatState::Sending { call }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, ChatState::Idle)
    }

    /// The observable loading flag
    #[must_use]
    pub fn is_loading(&self) -> bool {
        !self.is_idle()
    }

    #[must_use]
    pub fn pending_call(&self) -> Option<PendingCall> {
        match self {
            ChatState::Idle => None,
            ChatState::Sending { call } => Some(*call),
        }
    }
}

/// Context the transitions read but never change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatContext {
    /// Identity of the signed-in user; calls need one
    pub user_id: Option<String>,
    /// Reduced-bandwidth mode disables prompt submission
    pub low_bandwidth: bool,
}

impl ChatContext {
    #[must_use]
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            low_bandwidth: false,
        }
    }

    #[must_use]
    pub fn with_low_bandwidth(mut self, low_bandwidth: bool) -> Self {
        self.low_bandwidth = low_bandwidth;
        self
    }
}
