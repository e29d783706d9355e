//! Newline-delimited record decoding.
//!
//! The backend streams one JSON object per line. Network chunks carry no
//! framing guarantees, so [`RecordDecoder`] keeps the unterminated tail of the
//! previous chunk as raw bytes and only parses lines once their `\n` arrives.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Discriminator value for records that carry assistant text.
pub const MESSAGE_RECORD_TYPE: &str = "message";
/// Discriminator value for server-side failure records.
pub const ERROR_RECORD_TYPE: &str = "error";

/// One decoded unit from the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamRecord {
    /// Full assistant content so far. Non-string payloads are already
    /// serialized to their JSON text.
    Message { content: String },
    /// Server-reported failure. Never applied to the transcript.
    Error { content: String },
    /// Unknown record type retained for forward-compatible passthrough.
    Other { record_type: String, payload: Value },
}

impl StreamRecord {
    pub fn record_type(&self) -> &str {
        match self {
            Self::Message { .. } => MESSAGE_RECORD_TYPE,
            Self::Error { .. } => ERROR_RECORD_TYPE,
            Self::Other { record_type, .. } => record_type,
        }
    }

    /// Parses one complete line into a record.
    pub fn parse_line(line: &str) -> Result<Self, RecordError> {
        let value = serde_json::from_str::<Value>(line).map_err(|source| RecordError::Json {
            excerpt: excerpt(line),
            source,
        })?;

        let Some(record_type) = value.get("type").and_then(Value::as_str) else {
            return Err(RecordError::MissingType {
                excerpt: excerpt(line),
            });
        };

        Ok(match record_type {
            MESSAGE_RECORD_TYPE => Self::Message {
                content: content_text(value.get("content")),
            },
            ERROR_RECORD_TYPE => Self::Error {
                content: content_text(value.get("content")),
            },
            other => Self::Other {
                record_type: other.to_owned(),
                payload: value,
            },
        })
    }
}

/// A candidate line that could not be turned into a record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("malformed record line `{excerpt}`: {source}")]
    Json {
        excerpt: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("record line `{excerpt}` has no string `type` field")]
    MissingType { excerpt: String },
}

/// Incremental decoder for NDJSON byte streams.
#[derive(Debug, Default)]
pub struct RecordDecoder {
    carry: Vec<u8>,
}

impl RecordDecoder {
    /// Feed one transport chunk and drain every record it completes, in order.
    ///
    /// Blank lines are skipped. Lines that fail to parse are returned as
    /// errors in their position; the caller decides how to report them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Result<StreamRecord, RecordError>> {
        // The carry never holds a newline, so only the new bytes need a scan.
        let scanned = self.carry.len();
        self.carry.extend_from_slice(bytes);
        let mut records = Vec::new();

        let Some(last_newline) = bytes.iter().rposition(|byte| *byte == b'\n') else {
            return records;
        };
        let last_newline = scanned + last_newline;

        let tail = self.carry.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.carry, tail);

        for line in complete.split(|byte| *byte == b'\n') {
            let line = String::from_utf8_lossy(line);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let parsed = StreamRecord::parse_line(line);
            match &parsed {
                Ok(record) => debug!(record_type = record.record_type(), "decoded stream record"),
                Err(error) => warn!(%error, "dropping malformed stream record"),
            }
            records.push(parsed);
        }

        records
    }

    /// Parse a complete payload in one shot. Any unterminated tail is ignored.
    pub fn parse_lines(input: &str) -> Vec<Result<StreamRecord, RecordError>> {
        let mut decoder = Self::default();
        decoder.feed(input.as_bytes())
    }

    /// Ends the stream. Returns the byte length of a discarded partial line.
    ///
    /// A partial JSON fragment cannot be parsed safely, so nothing is flushed.
    pub fn finish(&mut self) -> Option<usize> {
        let tail = std::mem::take(&mut self.carry);
        if tail.iter().all(u8::is_ascii_whitespace) {
            return None;
        }

        debug!(bytes = tail.len(), "discarding unterminated record tail");
        Some(tail.len())
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.carry.iter().all(u8::is_ascii_whitespace)
    }
}

fn content_text(content: Option<&Value>) -> String {
    match content {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn excerpt(line: &str) -> String {
    const LIMIT: usize = 80;
    match line.char_indices().nth(LIMIT) {
        Some((index, _)) => format!("{}...", &line[..index]),
        None => line.to_owned(),
    }
}
