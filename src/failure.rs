//! Collaborator failures and their user-facing text
//!
//! Failures coming back from the chat backend arrive in several shapes: a
//! structured response body, an `HTTP 400: {...}` style message with JSON
//! embedded in it, a bare message, or nothing useful at all. The normalizer
//! tries each shape in a fixed order and always produces a line of text.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

/// Shown when a failure carries nothing readable
pub const FALLBACK_ERROR_MESSAGE: &str = "An error occurred. Please try again.";

static STATUS_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+:\s*").expect("status prefix pattern is valid"));

/// A failed call to the chat backend
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", .message.as_deref().unwrap_or(FALLBACK_ERROR_MESSAGE))]
pub struct ChatFailure {
    pub kind: FailureKind,
    /// Raw message as produced by the transport
    pub message: Option<String>,
    /// Decoded server response body, when one was available
    pub response_body: Option<Value>,
}

/// Failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network errors and non-2xx responses
    Transport,
    /// The server answered but the payload had an unexpected shape
    MalformedPayload,
}

impl ChatFailure {
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
            response_body: None,
        }
    }

    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transport, message)
    }

    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(FailureKind::MalformedPayload, message)
    }

    /// A non-2xx response, described the way the fetch wrapper reports it
    /// (`HTTP 404: <body>`). A JSON body is also kept in decoded form.
    #[must_use]
    pub fn http_status(status: u16, body: &str) -> Self {
        Self {
            kind: FailureKind::Transport,
            message: Some(format!("HTTP {status}: {body}")),
            response_body: serde_json::from_str(body).ok(),
        }
    }

    /// A failure with nothing but its kind
    #[must_use]
    pub fn opaque(kind: FailureKind) -> Self {
        Self {
            kind,
            message: None,
            response_body: None,
        }
    }

    #[must_use]
    pub fn with_response_body(mut self, body: Value) -> Self {
        self.response_body = Some(body);
        self
    }

    /// Build a failure from a loosely shaped error value.
    ///
    /// Objects contribute `message` and the body at `response.data`; a bare
    /// string becomes the message. Anything else carries no text.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(message) => Self::transport(message.clone()),
            Value::Object(fields) => Self {
                kind: FailureKind::Transport,
                message: fields
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
                response_body: value.pointer("/response/data").cloned(),
            },
            _ => Self::opaque(FailureKind::Transport),
        }
    }
}

/// Render a failure as a single readable line.
///
/// First match wins: the `detail` of a structured response body, the
/// `detail` of JSON embedded in the message (status prefix stripped), the raw
/// message, then [`FALLBACK_ERROR_MESSAGE`].
#[must_use]
pub fn normalize_error(failure: &ChatFailure) -> String {
    detail_from_response_body(failure)
        .or_else(|| detail_from_message(failure))
        .or_else(|| raw_message(failure))
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_owned())
}

/// `detail` string of the structured response body, verbatim
#[must_use]
pub fn detail_from_response_body(failure: &ChatFailure) -> Option<String> {
    failure
        .response_body
        .as_ref()?
        .get("detail")?
        .as_str()
        .filter(|detail| !detail.is_empty())
        .map(str::to_owned)
}

/// `detail` of the JSON object starting at the first `{` of the message.
///
/// Unparseable JSON yields `None`.
#[must_use]
pub fn detail_from_message(failure: &ChatFailure) -> Option<String> {
    let message = failure.message.as_deref()?;
    let start = message.find('{')?;
    let (_, candidate) = message.split_at(start);
    let parsed: Value = serde_json::from_str(candidate).ok()?;

    let detail = match parsed.get("detail")? {
        Value::String(detail) => detail.clone(),
        Value::Null => return None,
        // FastAPI validation errors put a list here
        other => other.to_string(),
    };
    let detail = strip_status_prefix(&detail);
    (!detail.is_empty()).then(|| detail.to_owned())
}

/// The message as the transport produced it
#[must_use]
pub fn raw_message(failure: &ChatFailure) -> Option<String> {
    failure
        .message
        .as_deref()
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}

/// Drop a leading `"<digits>: "`, e.g. `"404: Not found"` -> `"Not found"`
#[must_use]
pub fn strip_status_prefix(detail: &str) -> &str {
    match STATUS_PREFIX.find(detail) {
        Some(prefix) => detail.split_at(prefix.end()).1,
        None => detail,
    }
}
