//! Provider response and error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for text-generation calls
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never got a usable response, or the stream broke
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success response status
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// The provider sent an explicit error frame
    #[error("{0}")]
    Remote(String),

    /// The caller cancelled the request
    #[error("Request was cancelled")]
    Cancelled,
}

impl ProviderError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProviderError::Cancelled)
    }
}

/// Final result of one streamed generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamOutput {
    /// The generated text
    pub content: String,

    /// Whether the provider confirmed completion with a `complete` frame
    pub done: bool,

    /// Token usage, when the provider reports it
    pub tokens_used: Option<u64>,
}

impl StreamOutput {
    /// Output confirmed by a `complete` frame
    pub fn complete(content: String, tokens_used: Option<u64>) -> Self {
        Self {
            content,
            done: true,
            tokens_used,
        }
    }

    /// Whatever was accumulated when the stream ended early
    pub fn truncated(content: String) -> Self {
        Self {
            content,
            done: false,
            tokens_used: None,
        }
    }
}
