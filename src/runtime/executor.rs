//! Chat session executor

use super::traits::{ChatBackend, Confirmer};
use super::ChatSnapshot;
use crate::config::EngineConfig;
use crate::message::{restore_messages, Message, RenderedMessage};
use crate::state_machine::{
    transition, Call, ChatContext, ChatState, Draft, Effect, Event, TransitionError,
    CLEAR_HISTORY_SENTINEL,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Question asked before the stored history is wiped
pub const CLEAR_HISTORY_PROMPT: &str =
    "⚠️ Are you sure? Your entire chat history will be permanently deleted.";

/// Mutable session data, only touched under the session lock
#[derive(Debug, Default)]
struct SessionState {
    state: ChatState,
    context: ChatContext,
    log: Vec<Message>,
    input: String,
    /// Identity whose history has already been requested
    history_loaded_for: Option<String>,
}

impl SessionState {
    fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            messages: self.log.clone(),
            input: self.input.clone(),
            loading: self.state.is_loading(),
        }
    }

    /// Now, but never earlier than the newest message
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        self.log.last().map_or(now, |last| now.max(last.timestamp))
    }

    fn push(&mut self, draft: Draft) {
        let timestamp = self.next_timestamp();
        self.log.push(Message::new(draft.sender, draft.text, timestamp));
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::AppendMessage(draft) => self.push(draft),
            Effect::ReplaceLog { entries } => {
                let timestamp = self.next_timestamp();
                self.log = entries
                    .into_iter()
                    .map(|draft| Message::new(draft.sender, draft.text, timestamp))
                    .collect();
                tracing::info!(user_id = ?self.context.user_id, "Chat history cleared");
            }
            Effect::RestoreHistory { records } => {
                self.log = restore_messages(records, Utc::now());
                tracing::info!(count = self.log.len(), "Chat history restored");
            }
            Effect::ClearInput => self.input.clear(),
            Effect::LogFailure { operation, failure } => {
                tracing::warn!(operation, kind = ?failure.kind, error = %failure, "Chat backend call failed");
            }
            // Issued by the session once the lock is released
            Effect::Call(_) => {}
        }
    }
}

/// State shared between a session and its in-flight backend task
struct SessionCore<B> {
    backend: B,
    inner: Mutex<SessionState>,
    snapshot_tx: watch::Sender<ChatSnapshot>,
}

/// A single user's chat session.
///
/// All state changes go through [`transition`]. Local effects are applied
/// under the session lock; backend calls run on a spawned task that feeds
/// the outcome back in, so a call always completes even if the caller stops
/// waiting, and observers never wait on the network.
pub struct ChatSession<B, C>
where
    B: ChatBackend + 'static,
    C: Confirmer + 'static,
{
    core: Arc<SessionCore<B>>,
    confirmer: C,
}

impl<B, C> ChatSession<B, C>
where
    B: ChatBackend + 'static,
    C: Confirmer + 'static,
{
    #[must_use]
    pub fn new(config: &EngineConfig, backend: B, confirmer: C) -> Self {
        let inner = SessionState {
            context: ChatContext::default().with_low_bandwidth(config.low_bandwidth),
            ..SessionState::default()
        };
        let (snapshot_tx, _) = watch::channel(inner.snapshot());
        Self {
            core: Arc::new(SessionCore {
                backend,
                inner: Mutex::new(inner),
                snapshot_tx,
            }),
            confirmer,
        }
    }

    /// Receive a snapshot whenever the log, input or loading flag changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.core.snapshot_tx.subscribe()
    }

    /// The most recently published snapshot
    #[must_use]
    pub fn snapshot(&self) -> ChatSnapshot {
        self.core.snapshot_tx.borrow().clone()
    }

    #[must_use]
    pub fn rendered_messages(&self) -> Vec<RenderedMessage> {
        self.core.snapshot_tx.borrow().rendered()
    }

    pub async fn state(&self) -> ChatState {
        self.core.inner.lock().await.state
    }

    pub async fn update_input(&self, text: impl Into<String>) {
        let mut inner = self.core.inner.lock().await;
        inner.input = text.into();
        self.core.publish(&inner);
    }

    pub async fn set_low_bandwidth(&self, low_bandwidth: bool) {
        let mut inner = self.core.inner.lock().await;
        inner.context.low_bandwidth = low_bandwidth;
        tracing::debug!(low_bandwidth, "Bandwidth mode changed");
    }

    /// Supply the signed-in user. A new identity starts from an empty log
    /// and input, then its stored history is loaded.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Busy`] without switching while a call is
    /// outstanding.
    pub async fn set_user(&self, user_id: impl Into<String>) -> Result<(), TransitionError> {
        let user_id = user_id.into();
        {
            let mut inner = self.core.inner.lock().await;
            if inner.context.user_id.as_deref() == Some(user_id.as_str()) {
                return Ok(());
            }
            if inner.state.is_loading() {
                tracing::debug!(user_id = %user_id, "User switch rejected: busy");
                return Err(TransitionError::Busy);
            }
            tracing::info!(user_id = %user_id, "User signed in");
            inner.context.user_id = Some(user_id);
            inner.log.clear();
            inner.input.clear();
            self.core.publish(&inner);
        }
        self.load_history().await
    }

    /// Load the current user's stored history, once per identity
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] if no user is set or a call is in flight.
    pub async fn load_history(&self) -> Result<(), TransitionError> {
        {
            let inner = self.core.inner.lock().await;
            if inner.context.user_id.is_some() && inner.history_loaded_for == inner.context.user_id {
                return Ok(());
            }
        }
        self.drive(Event::HistoryRequested).await
    }

    /// Submit a prompt and wait for the reply (or its failure) to land in
    /// the log. Dropping the returned future does not cancel the request.
    ///
    /// # Errors
    ///
    /// Rejections are no-ops: empty text, low bandwidth mode, no user, or a
    /// call already in flight.
    pub async fn submit(&self, text: &str) -> Result<(), TransitionError> {
        self.drive(Event::Submit {
            text: text.to_string(),
        })
        .await
    }

    /// Submit whatever is in the input buffer
    ///
    /// # Errors
    ///
    /// Same as [`Self::submit`].
    pub async fn submit_input(&self) -> Result<(), TransitionError> {
        let text = self.core.inner.lock().await.input.clone();
        self.submit(&text).await
    }

    /// Ask for confirmation, then wipe the stored history.
    ///
    /// Declining is not an error and changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Busy`] or [`TransitionError::NoUser`]
    /// without prompting when the clear could not start anyway.
    pub async fn clear_history(&self) -> Result<(), TransitionError> {
        {
            let inner = self.core.inner.lock().await;
            if inner.state.is_loading() {
                tracing::debug!("Clear history rejected: busy");
                return Err(TransitionError::Busy);
            }
            if inner.context.user_id.is_none() {
                tracing::debug!("Clear history rejected: no user");
                return Err(TransitionError::NoUser);
            }
        }

        if !self.confirmer.confirm(CLEAR_HISTORY_PROMPT).await {
            tracing::debug!("Clear history declined");
            return Ok(());
        }
        self.drive(Event::ClearConfirmed).await
    }

    /// Feed an event; if it leads to a backend call, run the call in the
    /// background and wait for the session to settle.
    async fn drive(&self, event: Event) -> Result<(), TransitionError> {
        let Some(call) = self.core.dispatch(event).await? else {
            return Ok(());
        };

        // Dropping the JoinHandle detaches the task; it still runs to the end
        let core = Arc::clone(&self.core);
        let task = tokio::spawn(async move { core.run(call).await });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Backend task failed");
                Ok(())
            }
        }
    }
}

// ============================================================================
// Event loop
// ============================================================================

impl<B: ChatBackend + 'static> SessionCore<B> {
    /// Execute a call and every call its outcome leads to
    async fn run(&self, mut call: Call) -> Result<(), TransitionError> {
        loop {
            let outcome = self.execute(call).await;
            match self.dispatch(outcome).await? {
                Some(next) => call = next,
                None => return Ok(()),
            }
        }
    }

    /// Run one transition under the lock, returning the backend call to make
    async fn dispatch(&self, event: Event) -> Result<Option<Call>, TransitionError> {
        let mut inner = self.inner.lock().await;
        let name = event.name();

        let result = transition(&inner.state, &inner.context, event).inspect_err(|e| {
            tracing::debug!(event = name, error = %e, "Event rejected");
        })?;

        inner.state = result.new_state;
        let mut pending = None;
        for effect in result.effects {
            match effect {
                Effect::Call(call) => {
                    if let Call::FetchHistory { user_id } = &call {
                        inner.history_loaded_for = Some(user_id.clone());
                    }
                    pending = Some(call);
                }
                other => inner.apply(other),
            }
        }
        self.publish(&inner);
        Ok(pending)
    }

    async fn execute(&self, call: Call) -> Event {
        match call {
            Call::SendPrompt { user_id, prompt } => {
                tracing::info!(user_id = %user_id, chars = prompt.chars().count(), "Sending prompt");
                match self.backend.send_message(&user_id, &prompt).await {
                    Ok(reply) => Event::ReplyReceived {
                        result: reply.result,
                    },
                    Err(failure) => Event::SendFailed { failure },
                }
            }
            Call::SendClear { user_id } => {
                tracing::info!(user_id = %user_id, "Clearing chat history");
                match self
                    .backend
                    .send_message(&user_id, CLEAR_HISTORY_SENTINEL)
                    .await
                {
                    Ok(reply) => Event::ClearCompleted {
                        result: reply.result,
                    },
                    Err(failure) => Event::ClearFailed { failure },
                }
            }
            Call::FetchHistory { user_id } => {
                tracing::debug!(user_id = %user_id, "Fetching chat history");
                match self.backend.get_history(&user_id).await {
                    Ok(reply) => Event::HistoryLoaded {
                        records: reply.chat_history,
                    },
                    Err(failure) => Event::HistoryFailed { failure },
                }
            }
        }
    }

    fn publish(&self, inner: &SessionState) {
        let snapshot = inner.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}
