//! Pure state transition function
//!
//! Given the same state, context and event this always yields the same new
//! state and effects. All I/O happens in the runtime that executes them.

use super::effect::Draft;
use super::{ChatContext, ChatState, Effect, Event, PendingCall};
use crate::failure::normalize_error;
use thiserror::Error;

/// In-band command that asks the backend to wipe the user's history
pub const CLEAR_HISTORY_SENTINEL: &str = "CLEAR_HISTORY";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    #[must_use]
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Reasons an event is rejected. A rejected event changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("A request is already in flight")]
    Busy,
    #[error("Message is empty")]
    EmptyInput,
    #[error("Sending is disabled in low bandwidth mode")]
    LowBandwidth,
    #[error("No user is signed in")]
    NoUser,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// # Errors
///
/// Returns a [`TransitionError`] when the event is not accepted in the
/// current state; the caller keeps the old state.
pub fn transition(
    state: &ChatState,
    context: &ChatContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Prompt submission
        // ============================================================

        // Idle + Submit -> Sending(Prompt)
        (ChatState::Idle, Event::Submit { text }) => {
            let prompt = text.trim();
            if prompt.is_empty() {
                return Err(TransitionError::EmptyInput);
            }
            if context.low_bandwidth {
                return Err(TransitionError::LowBandwidth);
            }
            let user_id = require_user(context)?;

            Ok(TransitionResult::new(ChatState::sending(PendingCall::Prompt))
                .with_effect(Effect::append_user(prompt))
                .with_effect(Effect::ClearInput)
                .with_effect(Effect::send_prompt(user_id, prompt)))
        }

        // Sending(Prompt) + reply -> Idle; the raw reply is stored, formatting
        // happens at display time
        (ChatState::Sending { call: PendingCall::Prompt }, Event::ReplyReceived { result }) => {
            Ok(TransitionResult::new(ChatState::Idle).with_effect(Effect::append_bot(result)))
        }

        // Sending(Prompt) + failure -> Idle with the error shown as a bot line
        (ChatState::Sending { call: PendingCall::Prompt }, Event::SendFailed { failure }) => {
            Ok(TransitionResult::new(ChatState::Idle)
                .with_effect(Effect::append_bot(normalize_error(&failure)))
                .with_effect(Effect::LogFailure {
                    operation: "send_message",
                    failure,
                }))
        }

        // ============================================================
        // Clear history
        // ============================================================

        // Idle + ClearConfirmed -> Sending(ClearHistory)
        (ChatState::Idle, Event::ClearConfirmed) => {
            let user_id = require_user(context)?;
            Ok(TransitionResult::new(ChatState::sending(PendingCall::ClearHistory))
                .with_effect(Effect::send_clear(user_id)))
        }

        // The server has wiped the stored history, so the log restarts with
        // the request and its confirmation
        (
            ChatState::Sending { call: PendingCall::ClearHistory },
            Event::ClearCompleted { result },
        ) => Ok(
            TransitionResult::new(ChatState::Idle).with_effect(Effect::ReplaceLog {
                entries: vec![Draft::user(CLEAR_HISTORY_SENTINEL), Draft::bot(result)],
            }),
        ),

        (ChatState::Sending { call: PendingCall::ClearHistory }, Event::ClearFailed { failure }) => {
            Ok(TransitionResult::new(ChatState::Idle).with_effect(Effect::LogFailure {
                operation: "clear_history",
                failure,
            }))
        }

        // ============================================================
        // History load
        // ============================================================
        (ChatState::Idle, Event::HistoryRequested) => {
            let user_id = require_user(context)?;
            Ok(TransitionResult::new(ChatState::sending(PendingCall::History))
                .with_effect(Effect::fetch_history(user_id)))
        }

        (ChatState::Sending { call: PendingCall::History }, Event::HistoryLoaded { records }) => {
            Ok(TransitionResult::new(ChatState::Idle)
                .with_effect(Effect::RestoreHistory { records }))
        }

        // Failure leaves the log as it was
        (ChatState::Sending { call: PendingCall::History }, Event::HistoryFailed { failure }) => {
            Ok(TransitionResult::new(ChatState::Idle).with_effect(Effect::LogFailure {
                operation: "get_history",
                failure,
            }))
        }

        // ============================================================
        // Single-flight guard
        // ============================================================
        (
            ChatState::Sending { .. },
            Event::Submit { .. } | Event::ClearConfirmed | Event::HistoryRequested,
        ) => Err(TransitionError::Busy),

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{} while {state:?}",
            event.name()
        ))),
    }
}

fn require_user(context: &ChatContext) -> Result<String, TransitionError> {
    context.user_id.clone().ok_or(TransitionError::NoUser)
}
