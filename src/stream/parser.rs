//! Line-to-event parsing
//!
//! The discriminant is read first so that an unknown `type` can be told apart
//! from a known one with a broken payload. Both are skipped by the caller, but
//! they are logged differently.

use serde_json::Value;

use super::events::{ParseFailure, StreamEvent};

/// Parse one complete line into a protocol event.
///
/// Surrounding whitespace (including a `\r` left by CRLF framing) is ignored.
/// Extra fields on a known event are ignored.
pub fn parse_line(line: &str) -> Result<StreamEvent, ParseFailure> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ParseFailure::Blank);
    }

    let value: Value = serde_json::from_str(trimmed).map_err(|e| ParseFailure::InvalidJson {
        message: e.to_string(),
    })?;

    let event_type = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ParseFailure::MissingType)?
        .to_string();

    match event_type.as_str() {
        "content" | "chat_created" | "done" => {
            serde_json::from_value(value).map_err(|e| ParseFailure::InvalidPayload {
                event_type,
                message: e.to_string(),
            })
        }
        // Ignore unknown events instead of failing the stream
        _ => Err(ParseFailure::UnknownType(event_type)),
    }
}
