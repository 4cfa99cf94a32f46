//! Chat messages and history records

use crate::format::{format_message, Block};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(alias = "assistant")]
    Bot,
}

/// One entry of the conversation log. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    #[serde(rename = "message", alias = "text")]
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    #[must_use]
    pub fn new(sender: Sender, text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp,
        }
    }

    #[must_use]
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Sender::User, text, timestamp)
    }

    #[must_use]
    pub fn bot(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self::new(Sender::Bot, text, timestamp)
    }

    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.sender == Sender::Bot
    }

    /// Display structure for bot messages; user text is shown as typed
    #[must_use]
    pub fn blocks(&self) -> Option<Vec<Block>> {
        self.is_bot().then(|| format_message(&self.text))
    }

    #[must_use]
    pub fn render(&self) -> RenderedMessage {
        RenderedMessage {
            blocks: self.blocks(),
            message: self.clone(),
        }
    }
}

/// A message paired with its display structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    pub message: Message,
    /// `None` for user messages
    pub blocks: Option<Vec<Block>>,
}

/// A history entry as returned by the backend.
///
/// Timestamps are kept as text because stored entries may lack a timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub sender: Sender,
    #[serde(alias = "text")]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HistoryRecord {
    #[must_use]
    pub fn new(sender: Sender, message: impl Into<String>, timestamp: Option<String>) -> Self {
        Self {
            sender,
            message: message.into(),
            timestamp,
        }
    }
}

/// Parse an RFC 3339 timestamp, or a naive ISO timestamp taken as UTC
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Turn history records into log messages.
///
/// Timestamps never go backwards: a missing, unparseable or earlier
/// timestamp takes the previous message's. The first message falls back to
/// `loaded_at`.
#[must_use]
pub fn restore_messages(records: Vec<HistoryRecord>, loaded_at: DateTime<Utc>) -> Vec<Message> {
    let mut previous: Option<DateTime<Utc>> = None;
    records
        .into_iter()
        .map(|record| {
            let parsed = record.timestamp.as_deref().and_then(parse_timestamp);
            let timestamp = match (parsed, previous) {
                (Some(ts), Some(prev)) => ts.max(prev),
                (Some(ts), None) => ts,
                (None, Some(prev)) => prev,
                (None, None) => loaded_at,
            };
            previous = Some(timestamp);
            Message::new(record.sender, record.message, timestamp)
        })
        .collect()
}
