//! Chat API client.
//!
//! Builds the three requests this core needs against the server:
//! - `POST /api/chats/{chat_id}` - send a message, body streamed back as NDJSON
//! - `GET /api/chats/{chat_id}` - chat metadata and finished history
//! - `GET /api/chats` - list of the user's chats

use tracing::debug;

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::{ChatError, ChatResult};
use crate::models::{ChatDetail, ChatSummary, HistoryMessage, SendMessageRequest};
use crate::traits::{ByteStream, Headers, HttpClient, HttpError};

const NDJSON: &str = "application/x-ndjson";
const JSON: &str = "application/json";

/// Client for the chat server API.
#[derive(Debug, Clone)]
pub struct ChatClient<H = ReqwestHttpClient> {
    base_url: String,
    session_cookie: Option<String>,
    http: H,
}

impl ChatClient<ReqwestHttpClient> {
    /// Create a reqwest-backed client from configuration.
    pub fn from_config(config: &ClientConfig) -> ChatResult<Self> {
        let http = ReqwestHttpClient::from_config(config)?;
        Ok(Self::with_http(config, http))
    }
}

impl<H: HttpClient> ChatClient<H> {
    /// Create a client over any `HttpClient` implementation.
    pub fn with_http(config: &ClientConfig, http: H) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session_cookie: config.session_cookie.clone(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &H {
        &self.http
    }

    /// URL of one chat, with the identifier percent-encoded.
    pub fn chat_url(&self, chat_id: &str) -> String {
        format!("{}/api/chats/{}", self.base_url, urlencoding::encode(chat_id))
    }

    fn headers(&self, accept: &str) -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), JSON.to_string());
        headers.insert("Accept".to_string(), accept.to_string());
        if let Some(cookie) = &self.session_cookie {
            headers.insert("Cookie".to_string(), cookie.clone());
        }
        headers
    }

    /// Send a message and return the reply body as a byte stream.
    ///
    /// `chat_id` addresses the conversation; for a new conversation it is a
    /// client-generated id that the server adopts.
    pub async fn send_message(&self, chat_id: &str, message: &str) -> Result<ByteStream, HttpError> {
        let url = self.chat_url(chat_id);
        let body = serde_json::to_string(&SendMessageRequest::new(message))
            .map_err(|e| HttpError::Other(e.to_string()))?;

        debug!(%url, "Sending chat message");
        self.http.post_stream(&url, &body, &self.headers(NDJSON)).await
    }

    /// Fetch chat metadata and its finished message history.
    pub async fn fetch_chat(&self, chat_id: &str) -> ChatResult<ChatDetail> {
        let url = self.chat_url(chat_id);
        let response = self.http.get(&url, &self.headers(JSON)).await?;

        if response.status == 404 {
            return Err(ChatError::NotFound {
                chat_id: chat_id.to_string(),
            });
        }
        if !response.is_success() {
            return Err(HttpError::ServerError {
                status: response.status,
                message: response.text().unwrap_or_else(|_| "Unknown error".to_string()),
            }
            .into());
        }

        Ok(response.json()?)
    }

    /// Fetch only the message history of a chat.
    pub async fn fetch_history(&self, chat_id: &str) -> ChatResult<Vec<HistoryMessage>> {
        Ok(self.fetch_chat(chat_id).await?.messages)
    }

    /// List the user's chats (id and title).
    pub async fn list_chats(&self) -> ChatResult<Vec<ChatSummary>> {
        let url = format!("{}/api/chats", self.base_url);
        let response = self.http.get(&url, &self.headers(JSON)).await?;

        if !response.is_success() {
            return Err(HttpError::ServerError {
                status: response.status,
                message: response.text().unwrap_or_else(|_| "Unknown error".to_string()),
            }
            .into());
        }

        Ok(response.json()?)
    }
}
