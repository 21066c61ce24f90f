//! Protocol event types
//!
//! Each line of the response body is one JSON object discriminated by its
//! `type` field. Only three variants exist; anything else is a parse failure
//! that the session skips.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Typed events from the chat stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Text to append to the assistant reply being streamed
    Content { content: String },
    /// Server-assigned identifier for a newly created conversation
    ChatCreated { chat_id: String },
    /// Terminal marker, no further lines follow
    Done,
}

impl StreamEvent {
    /// Protocol discriminant of this event
    pub fn event_type(&self) -> &'static str {
        match self {
            StreamEvent::Content { .. } => "content",
            StreamEvent::ChatCreated { .. } => "chat_created",
            StreamEvent::Done => "done",
        }
    }

    /// Convenience constructor for content events
    pub fn content(text: impl Into<String>) -> Self {
        StreamEvent::Content {
            content: text.into(),
        }
    }

    /// Convenience constructor for chat_created events
    pub fn chat_created(chat_id: impl Into<String>) -> Self {
        StreamEvent::ChatCreated {
            chat_id: chat_id.into(),
        }
    }

    /// Encode as one protocol line, newline included.
    pub fn to_line(&self) -> String {
        // Serializing a derive(Serialize) enum of strings cannot fail
        let mut line = serde_json::to_string(self).unwrap_or_default();
        line.push('\n');
        line
    }
}

/// Why a line did not yield an event.
///
/// Never fatal: the session logs it and moves on to the next line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// Empty or whitespace-only line (keep-alive)
    #[error("blank line")]
    Blank,
    /// Line is not valid JSON
    #[error("invalid JSON: {message}")]
    InvalidJson { message: String },
    /// JSON without a string `type` field
    #[error("missing event type")]
    MissingType,
    /// Discriminant this client does not know
    #[error("unknown event type: {0}")]
    UnknownType(String),
    /// Known discriminant but fields missing or mistyped
    #[error("invalid payload for '{event_type}': {message}")]
    InvalidPayload { event_type: String, message: String },
}

impl ParseFailure {
    /// Whether this failure is worth a warning (blank keep-alives are not)
    pub fn is_anomaly(&self) -> bool {
        !matches!(self, ParseFailure::Blank)
    }
}
