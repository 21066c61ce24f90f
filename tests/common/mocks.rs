//! Mock implementations for test fixtures.
//!
//! Re-exports the mock transport from `chatline::adapters::mock` and adds a
//! builder for the chat server routes the tests use.

pub use chatline::adapters::mock::{LiveBody, MockHttpClient, MockResponse};
pub use chatline::traits::{HttpClient, HttpError};

use bytes::Bytes;

use super::{chat_detail, chat_url};

/// Configures the mock transport route by route.
pub struct MockChatServer {
    client: MockHttpClient,
}

impl MockChatServer {
    pub fn new(client: MockHttpClient) -> Self {
        Self { client }
    }

    /// Reply to a message in `chat_id` with these body chunks.
    pub fn with_reply_chunks(self, chat_id: &str, chunks: Vec<Vec<u8>>) -> Self {
        self.client.set_response(
            &chat_url(chat_id),
            MockResponse::Stream(chunks.into_iter().map(Bytes::from).collect()),
        );
        self
    }

    /// Reply with these lines, one chunk each.
    pub fn with_reply_lines(self, chat_id: &str, lines: Vec<String>) -> Self {
        self.client
            .set_response(&chat_url(chat_id), MockResponse::ndjson(lines));
        self
    }

    /// Serve history for `chat_id`.
    pub fn with_history(self, chat_id: &str, messages: &[(&str, &str)]) -> Self {
        self.client.set_response(
            &chat_url(chat_id),
            MockResponse::json(200, &chat_detail(chat_id, messages)),
        );
        self
    }

    /// Fail the request for `chat_id` before any body.
    pub fn with_failure(self, chat_id: &str, err: HttpError) -> Self {
        self.client
            .set_response(&chat_url(chat_id), MockResponse::Error(err));
        self
    }
}
