//! Session-level failure types.
//!
//! These describe why a submission did not reach `done`. Malformed lines are
//! not errors at all; they are dropped by the session and never surface here.

use thiserror::Error;

use crate::traits::HttpError;

/// Reasons a stream session ended without completing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// Another session already holds this conversation.
    #[error("a response is already streaming for this conversation")]
    SessionBusy,

    /// Submission with no non-whitespace text.
    #[error("message is empty")]
    EmptyMessage,

    /// Request failed before any body was read.
    #[error("request failed: {0}")]
    Transport(HttpError),

    /// Body read failed after streaming began.
    #[error("stream connection lost: {message}")]
    ConnectionLost { message: String },

    /// Body ended without a `done` event.
    #[error("stream ended before completion")]
    MissingDone,

    /// Aborted by the caller.
    #[error("stream cancelled")]
    Cancelled,
}

impl StreamError {
    /// Check if resubmitting the same message may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Transport(err) => err.is_transient(),
            StreamError::ConnectionLost { .. } | StreamError::MissingDone => true,
            StreamError::SessionBusy | StreamError::EmptyMessage | StreamError::Cancelled => false,
        }
    }

    /// Whether the failure happened after the body started streaming.
    pub fn is_mid_stream(&self) -> bool {
        matches!(
            self,
            StreamError::ConnectionLost { .. } | StreamError::MissingDone
        )
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::SessionBusy => {
                "Please wait for the current response to complete before sending another message."
                    .to_string()
            }
            StreamError::EmptyMessage => "Type a message before sending.".to_string(),
            StreamError::Transport(err) => format!("Failed to send message: {}", err),
            StreamError::ConnectionLost { .. } => {
                "Connection to the server was lost. The partial reply was kept.".to_string()
            }
            StreamError::MissingDone => {
                "The reply ended unexpectedly. The partial reply was kept.".to_string()
            }
            StreamError::Cancelled => "Response cancelled.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::SessionBusy => "E_STREAM_BUSY",
            StreamError::EmptyMessage => "E_STREAM_EMPTY",
            StreamError::Transport(_) => "E_STREAM_TRANSPORT",
            StreamError::ConnectionLost { .. } => "E_STREAM_CONN",
            StreamError::MissingDone => "E_STREAM_TRUNCATED",
            StreamError::Cancelled => "E_STREAM_CANCELLED",
        }
    }
}
