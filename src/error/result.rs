//! Result type alias for chatline operations.

use super::chat_error::ChatError;

/// Type alias for Results using ChatError.
///
/// # Example
///
/// ```ignore
/// use chatline::error::ChatResult;
///
/// async fn recent_chats(client: &ChatClient) -> ChatResult<Vec<ChatSummary>> {
///     client.list_chats().await
/// }
/// ```
pub type ChatResult<T> = Result<T, ChatError>;
