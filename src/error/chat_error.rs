//! Unified error type for the chat client.

use thiserror::Error;

use super::stream::StreamError;
use crate::traits::HttpError;

/// Unified error type for chatline operations.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Transport-level failure on a non-streaming request.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Stream session failure.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Response body could not be decoded.
    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Chat does not exist (or belongs to someone else).
    #[error("chat not found: {chat_id}")]
    NotFound { chat_id: String },
}

impl ChatError {
    /// Check if this error is likely transient and can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Http(err) => err.is_transient(),
            ChatError::Stream(err) => err.is_retryable(),
            ChatError::Json(_) | ChatError::Config(_) | ChatError::NotFound { .. } => false,
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ChatError::Http(_) => "E_HTTP",
            ChatError::Stream(err) => err.error_code(),
            ChatError::Json(_) => "E_JSON",
            ChatError::Config(_) => "E_CONFIG",
            ChatError::NotFound { .. } => "E_NOT_FOUND",
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::Http(err) => format!("Could not reach the chat server: {}", err),
            ChatError::Stream(err) => err.user_message(),
            ChatError::Json(_) => "The server sent an unexpected response.".to_string(),
            ChatError::Config(message) => format!("Configuration problem: {}", message),
            ChatError::NotFound { chat_id } => format!("Chat '{}' was not found.", chat_id),
        }
    }
}
