//! Event stream framing.
//!
//! Each notification travels as one event: a single `data:` line holding the
//! JSON object, terminated by a blank line. Lines starting with `:` are
//! comments (keep-alives) and carry no event.

use bytes::BytesMut;
use thiserror::Error;
use tracing::warn;

use super::types::NotificationMessage;

/// Initial capacity of the decoder's line buffer.
const BUFFER_CAPACITY: usize = 8192;

/// Longest line the decoder buffers before discarding it.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Errors produced while turning an event's data into a notification.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The data was not a valid notification object.
    #[error("malformed notification frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Serialize a message to its JSON data string.
pub fn to_data(message: &NotificationMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

/// Encode a message as a complete event (`data: <json>\n\n`).
pub fn encode(message: &NotificationMessage) -> Result<String, serde_json::Error> {
    Ok(format!("data: {}\n\n", to_data(message)?))
}

/// Decode one event's data into a notification.
pub fn decode(data: &str) -> Result<NotificationMessage, FrameError> {
    Ok(serde_json::from_str(data)?)
}

/// Incremental event stream decoder.
///
/// Bytes may arrive split at arbitrary boundaries; complete events are
/// returned as their joined data strings once the terminating blank line
/// has been seen. An event containing a line that is not UTF-8, or longer
/// than [`MAX_LINE_LEN`], is logged and dropped as a whole.
#[derive(Debug)]
pub struct FrameDecoder {
    buffer: BytesMut,
    data: Vec<String>,
    /// Current event had a bad line and is dropped at its end.
    corrupt: bool,
    /// Still inside an oversized line whose head was discarded.
    overflowed: bool,
}

impl FrameDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(BUFFER_CAPACITY),
            data: Vec::new(),
            corrupt: false,
            overflowed: false,
        }
    }

    /// Feed a chunk of bytes and return the data of every event completed
    /// by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line_bytes = self.buffer.split_to(newline_pos + 1);
            line_bytes.truncate(line_bytes.len() - 1);
            if line_bytes.last() == Some(&b'\r') {
                line_bytes.truncate(line_bytes.len() - 1);
            }

            if self.overflowed {
                self.overflowed = false;
                continue;
            }

            let line = match std::str::from_utf8(&line_bytes) {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "Event stream line is not valid UTF-8");
                    self.corrupt = true;
                    continue;
                }
            };

            if line.is_empty() {
                if self.corrupt {
                    warn!(lines = self.data.len(), "Dropping corrupt event");
                    self.corrupt = false;
                } else if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                }
                self.data.clear();
                continue;
            }

            if line.starts_with(':') {
                continue;
            }

            if let Some(value) = field_value(line, "data") {
                self.data.push(value.to_string());
            }
        }

        if self.buffer.len() > MAX_LINE_LEN {
            warn!(
                buffered = self.buffer.len(),
                limit = MAX_LINE_LEN,
                "Event stream line too long, discarding"
            );
            self.buffer.clear();
            self.overflowed = true;
            self.corrupt = true;
        }

        events
    }

    /// Discard any partial event, e.g. after the connection dropped.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.data.clear();
        self.corrupt = false;
        self.overflowed = false;
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Return the value of `line` if it is the named field.
fn field_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(name)?;
    if rest.is_empty() {
        return Some("");
    }
    let value = rest.strip_prefix(':')?;
    Some(value.strip_prefix(' ').unwrap_or(value))
}
