//! Mock implementations for testing.
//!
//! - [`MockHttpClient`] - HTTP client with canned or live-fed responses

pub mod http;

pub use http::{LiveBody, MockHttpClient, MockResponse, RecordedRequest};
