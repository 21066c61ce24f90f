//! Chunk-to-line decoding for the response body.
//!
//! Network chunks do not line up with UTF-8 character boundaries or with
//! protocol line boundaries. `LineDecoder` keeps two carries across calls:
//! the undecoded byte tail (a multi-byte character split between chunks) and
//! the decoded text after the last `\n` (a line split between chunks).

use std::mem;

const REPLACEMENT: char = '\u{FFFD}';

/// Converts raw byte chunks into complete text lines.
///
/// Scoped to one response body. Lines are returned without their `\n`
/// terminator; a `\r` before the terminator is left for the parser to trim.
#[derive(Debug, Default)]
pub struct LineDecoder {
    /// Bytes of an incomplete UTF-8 sequence at the end of the last chunk
    byte_carry: Vec<u8>,
    /// Decoded text after the last newline seen so far
    text_carry: String,
}

impl LineDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every line it completes.
    ///
    /// The trailing segment after the last `\n` (possibly empty) stays in the
    /// carry until a later chunk terminates it or `flush` is called.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.byte_carry.extend_from_slice(chunk);
        self.decode_carry(false);
        self.split_lines()
    }

    /// Return the final unterminated line, if any, and clear all carry state.
    ///
    /// Called on end-of-data so that a last event without a trailing newline
    /// is not dropped. An incomplete character left in the byte carry decodes
    /// to U+FFFD.
    pub fn flush(&mut self) -> Option<String> {
        self.decode_carry(true);
        let remaining = mem::take(&mut self.text_carry);
        if remaining.is_empty() {
            None
        } else {
            Some(remaining)
        }
    }

    /// Whether any bytes or text are still held back.
    pub fn has_pending(&self) -> bool {
        !self.byte_carry.is_empty() || !self.text_carry.is_empty()
    }

    /// Move every decodable byte from the byte carry into the text carry.
    ///
    /// Invalid sequences become U+FFFD. A truncated sequence at the tail is
    /// kept for the next chunk unless `at_end` is set.
    fn decode_carry(&mut self, at_end: bool) {
        let bytes = mem::take(&mut self.byte_carry);
        let mut rest = bytes.as_slice();

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    self.text_carry.push_str(valid);
                    return;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    // Prefix up to `valid_up_to` is always valid UTF-8
                    if let Ok(valid) = std::str::from_utf8(valid) {
                        self.text_carry.push_str(valid);
                    }

                    match err.error_len() {
                        Some(invalid_len) => {
                            self.text_carry.push(REPLACEMENT);
                            rest = &after[invalid_len..];
                        }
                        None if at_end => {
                            self.text_carry.push(REPLACEMENT);
                            return;
                        }
                        None => {
                            self.byte_carry = after.to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Split complete lines off the front of the text carry.
    fn split_lines(&mut self) -> Vec<String> {
        let Some(last_newline) = self.text_carry.rfind('\n') else {
            return Vec::new();
        };

        let tail = self.text_carry.split_off(last_newline + 1);
        let complete = mem::replace(&mut self.text_carry, tail);

        // `complete` ends with '\n', so the final split segment is always empty
        let mut lines: Vec<String> = complete.split('\n').map(str::to_owned).collect();
        lines.pop();
        lines
    }
}
