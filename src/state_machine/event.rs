//! Events that can occur in a conversation

use crate::failure::ChatFailure;
use crate::message::HistoryRecord;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Submit {
        text: String,
    },
    /// The user answered yes to the clear-history prompt
    ClearConfirmed,

    // Send outcomes
    ReplyReceived {
        result: String,
    },
    SendFailed {
        failure: ChatFailure,
    },

    // Clear outcomes
    ClearCompleted {
        result: String,
    },
    ClearFailed {
        failure: ChatFailure,
    },

    // History events
    HistoryRequested,
    HistoryLoaded {
        records: Vec<HistoryRecord>,
    },
    HistoryFailed {
        failure: ChatFailure,
    },
}

impl Event {
    /// Short name for logs and errors
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Event::Submit { .. } => "submit",
            Event::ClearConfirmed => "clear_confirmed",
            Event::ReplyReceived { .. } => "reply_received",
            Event::SendFailed { .. } => "send_failed",
            Event::ClearCompleted { .. } => "clear_completed",
            Event::ClearFailed { .. } => "clear_failed",
            Event::HistoryRequested => "history_requested",
            Event::HistoryLoaded { .. } => "history_loaded",
            Event::HistoryFailed { .. } => "history_failed",
        }
    }
}
