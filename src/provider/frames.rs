//! Wire frames of the streaming generation endpoint
//!
//! Each frame arrives as a `data: <json>` line followed by a blank line.

use serde::{Deserialize, Serialize};

/// Prefix carried by every frame line
pub const DATA_PREFIX: &str = "data:";

/// One decoded frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamFrame {
    /// Incremental text
    #[serde(rename_all = "camelCase")]
    Chunk {
        chunk: String,
        /// Accumulated text so far, as seen by the provider
        #[serde(default, skip_serializing_if = "Option::is_none")]
        full_output: Option<String>,
    },

    /// Final text; ends the stream successfully
    #[serde(rename_all = "camelCase")]
    Complete {
        output: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tokens_used: Option<u64>,
    },

    /// Ends the stream with a provider-supplied message
    Error { error: String },
}

impl StreamFrame {
    pub fn chunk(delta: impl Into<String>, full_output: impl Into<String>) -> Self {
        StreamFrame::Chunk {
            chunk: delta.into(),
            full_output: Some(full_output.into()),
        }
    }

    pub fn complete(output: impl Into<String>) -> Self {
        StreamFrame::Complete {
            output: output.into(),
            tokens_used: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamFrame::Error {
            error: message.into(),
        }
    }

    /// Encode as a `data:` line terminated by a blank line
    pub fn to_sse(&self) -> String {
        // Serializing a plain enum of strings cannot fail.
        let json = serde_json::to_string(self).unwrap_or_default();
        format!("{} {}\n\n", DATA_PREFIX, json)
    }
}

/// Parse one line of the stream.
///
/// Returns `None` for lines that carry no frame (blank separators, comments,
/// `event:` fields) and `Some(Err(..))` for `data:` lines whose payload is not
/// a valid frame.
pub fn parse_line(line: &str) -> Option<Result<StreamFrame, serde_json::Error>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let payload = line.strip_prefix(DATA_PREFIX)?.trim_start();
    if payload.is_empty() {
        return None;
    }
    Some(serde_json::from_str(payload))
}
