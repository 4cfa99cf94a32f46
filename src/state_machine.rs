//! Conversation state machine
//!
//! Elm-style: a pure `transition` turns (state, event) into a new state plus
//! effects, and the runtime executes the effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Call, Draft, Effect};
pub use event::Event;
pub use state::{ChatContext, ChatState, PendingCall};
pub use transition::{transition, TransitionError, TransitionResult, CLEAR_HISTORY_SENTINEL};
