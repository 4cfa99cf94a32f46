//! Trait abstractions for the session's collaborators
//!
//! The transport and the confirmation prompt belong to the host; these
//! traits let the session drive them and let tests swap in mocks.

use crate::failure::ChatFailure;
use crate::message::HistoryRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Reply to a sent prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReply {
    pub result: String,
}

impl SendReply {
    #[must_use]
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
        }
    }
}

/// Stored history for a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryReply {
    #[serde(default)]
    pub chat_history: Vec<HistoryRecord>,
}

/// The chat backend
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a prompt (or the clear-history sentinel) on behalf of a user
    async fn send_message(&self, user_id: &str, prompt: &str) -> Result<SendReply, ChatFailure>;

    /// Fetch the user's stored conversation
    async fn get_history(&self, user_id: &str) -> Result<HistoryReply, ChatFailure>;
}

/// Yes/no prompt shown before destructive operations
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

// ============================================================================
// Blanket implementations
// ============================================================================

#[async_trait]
impl<T: ChatBackend + ?Sized> ChatBackend for Arc<T> {
    async fn send_message(&self, user_id: &str, prompt: &str) -> Result<SendReply, ChatFailure> {
        (**self).send_message(user_id, prompt).await
    }

    async fn get_history(&self, user_id: &str) -> Result<HistoryReply, ChatFailure> {
        (**self).get_history(user_id).await
    }
}

#[async_trait]
impl<T: Confirmer + ?Sized> Confirmer for Arc<T> {
    async fn confirm(&self, prompt: &str) -> bool {
        (**self).confirm(prompt).await
    }
}

/// Synchronous prompts, e.g. a terminal `y/N` question
pub struct FnConfirmer<F>(pub F);

#[async_trait]
impl<F> Confirmer for FnConfirmer<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    async fn confirm(&self, prompt: &str) -> bool {
        (self.0)(prompt)
    }
}
