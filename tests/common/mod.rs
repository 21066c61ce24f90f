//! Common test utilities for integration tests.
//!
//! Fixtures for building NDJSON reply bodies, history payloads, and
//! clients wired to the in-crate mock transport.
//!
//! # Example
//!
//! ```ignore
//! use common::{mock_client, reply_lines};
//!
//! let client = mock_client();
//! client.http().set_response(&chat_url("c1"), MockResponse::ndjson(reply_lines(&["Hi"])));
//! ```

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use chatline::client::ChatClient;
use chatline::config::ClientConfig;
use chatline::stream::StreamEvent;
use serde_json::{json, Value};
use std::sync::Arc;

pub const BASE_URL: &str = "http://chat.test";

/// URL the client posts to and reads history from for `chat_id`.
pub fn chat_url(chat_id: &str) -> String {
    format!("{}/api/chats/{}", BASE_URL, chat_id)
}

/// Client over a fresh mock transport.
pub fn mock_client() -> Arc<ChatClient<MockHttpClient>> {
    let config = ClientConfig::default().with_base_url(BASE_URL);
    Arc::new(ChatClient::with_http(&config, MockHttpClient::new()))
}

/// One `content` line per piece, then `done` (without line terminators).
pub fn reply_lines(pieces: &[&str]) -> Vec<String> {
    pieces
        .iter()
        .map(|piece| StreamEvent::content(*piece))
        .chain(std::iter::once(StreamEvent::Done))
        .map(|event| event.to_line().trim_end().to_string())
        .collect()
}

/// A whole reply body as newline-terminated bytes.
pub fn reply_body(events: &[StreamEvent]) -> Vec<u8> {
    events
        .iter()
        .flat_map(|event| event.to_line().into_bytes())
        .collect()
}

/// Split `bytes` into chunks whose sizes cycle through `sizes`.
pub fn chunked(bytes: &[u8], sizes: &[usize]) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();
    let mut rest = bytes;
    let mut sizes = sizes.iter().copied().filter(|size| *size > 0).cycle();
    while !rest.is_empty() {
        let size = sizes.next().unwrap_or(rest.len()).min(rest.len());
        let (head, tail) = rest.split_at(size);
        chunks.push(head.to_vec());
        rest = tail;
    }
    chunks
}

/// `GET /api/chats/{id}` payload.
pub fn chat_detail(chat_id: &str, messages: &[(&str, &str)]) -> Value {
    json!({
        "chat": {
            "id": chat_id,
            "title": "Test chat",
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:05:00Z"
        },
        "messages": messages
            .iter()
            .enumerate()
            .map(|(i, (message_type, content))| json!({
                "id": i + 1,
                "chat_id": chat_id,
                "message_type": message_type,
                "content": content,
                "created_at": "2024-05-01T10:00:00Z"
            }))
            .collect::<Vec<_>>()
    })
}
