//! Remote text-generation provider
//!
//! The provider is a black box: it receives a prompt and answers with a
//! stream of `data:` frames (see [`frames`]). [`streaming`] turns that stream
//! into text.

pub mod client;
pub mod frames;
pub mod http_client;
pub mod response;
pub mod streaming;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

pub use client::ProviderConfig;
pub use frames::StreamFrame;
pub use http_client::HttpGenerator;
pub use response::{ProviderError, StreamOutput};
pub use streaming::{consume_stream, FrameDecoder, StreamConsumer};

/// Raw response body as it arrives
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ProviderError>> + Send>>;

/// Body of a generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Fully resolved prompt
    pub prompt: String,

    /// Step the request belongs to, for correlation on the provider side
    pub step_id: String,

    /// Always true: the engine only consumes streamed responses
    pub stream: bool,
}

impl GenerationRequest {
    pub fn new(step_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            step_id: step_id.into(),
            stream: true,
        }
    }
}

/// Trait for text generation - allows for different implementations
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Start a streamed generation and return the response body.
    ///
    /// Must return [`ProviderError::Cancelled`] promptly once `cancel` fires
    /// while the request is in flight.
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<ByteStream, ProviderError>;
}
