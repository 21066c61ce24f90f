//! Response body decoding for the chat stream
//!
//! The server answers a message with a chunked body of newline-delimited
//! JSON objects:
//! - `{"type":"chat_created","chat_id":"..."}` - new conversation identifier
//! - `{"type":"content","content":"..."}` - text for the assistant reply
//! - `{"type":"done"}` - terminal marker
//!
//! # Module structure
//! - `decoder` - `LineDecoder`, bytes to complete lines
//! - `events` - `StreamEvent` and `ParseFailure`
//! - `parser` - `parse_line`, one line to one event

mod decoder;
mod events;
mod parser;

pub use decoder::LineDecoder;
pub use events::{ParseFailure, StreamEvent};
pub use parser::parse_line;
