//! Streaming response consumer
//!
//! Turns the provider's byte stream into frames and accumulated text.
//!
//! # Overview
//!
//! Bytes are buffered until a full line is available, so a frame (or a
//! multi-byte character) split across reads is decoded only once complete.
//! Each `data:` line is parsed as a [`StreamFrame`]:
//!
//! - `chunk` - the accumulated text grows and the progress callback receives
//!   the delta
//! - `complete` - the final text is returned, nothing after it is read
//! - `error` - the stream fails with [`ProviderError::Remote`]
//!
//! Lines that fail to parse are logged and skipped. If the stream ends
//! without a `complete` or `error` frame, the text accumulated so far is
//! returned as a (possibly truncated) success.
//!
//! The byte stream is owned by the consumer and dropped on every exit path,
//! which releases the underlying connection.

use crate::provider::frames::{parse_line, StreamFrame};
use crate::provider::{ByteStream, ProviderError, StreamOutput};
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Incremental line decoder over raw bytes
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes and return every frame completed by them, in order
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamFrame> {
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(frame) = decode_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Decode whatever is left once the stream has ended
    pub fn finish(&mut self) -> Option<StreamFrame> {
        if self.buffer.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buffer);
        decode_line(&line)
    }

    /// Bytes held back waiting for a line terminator
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }
}

fn decode_line(line: &[u8]) -> Option<StreamFrame> {
    let text = match std::str::from_utf8(line) {
        Ok(text) => text,
        Err(e) => {
            warn!("Skipping stream line with invalid UTF-8: {}", e);
            return None;
        }
    };

    match parse_line(text)? {
        Ok(frame) => Some(frame),
        Err(e) => {
            warn!("Failed to parse stream line {:?}: {}", text.trim_end(), e);
            None
        }
    }
}

/// Accumulates chunk frames into the step's output
#[derive(Debug, Default)]
pub struct StreamConsumer {
    accumulated: String,
}

impl StreamConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text accumulated so far
    pub fn accumulated(&self) -> &str {
        &self.accumulated
    }

    /// Apply one frame. Returns `Some` once the frame ends the stream.
    pub fn apply<F>(
        &mut self,
        frame: StreamFrame,
        on_delta: &mut F,
    ) -> Option<Result<StreamOutput, ProviderError>>
    where
        F: FnMut(&str),
    {
        match frame {
            StreamFrame::Chunk { chunk, full_output } => {
                match full_output {
                    Some(full) => self.accumulated = full,
                    None => self.accumulated.push_str(&chunk),
                }
                on_delta(&chunk);
                None
            }
            StreamFrame::Complete {
                output,
                tokens_used,
            } => {
                debug!("Stream complete ({} chars)", output.len());
                self.accumulated = output.clone();
                Some(Ok(StreamOutput::complete(output, tokens_used)))
            }
            StreamFrame::Error { error } => Some(Err(ProviderError::Remote(error))),
        }
    }

    /// Read `stream` to its end, or until a terminal frame or cancellation.
    pub async fn consume<F>(
        mut self,
        mut stream: ByteStream,
        cancel: &CancellationToken,
        mut on_delta: F,
    ) -> Result<StreamOutput, ProviderError>
    where
        F: FnMut(&str),
    {
        let mut decoder = FrameDecoder::new();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
                next = stream.next() => next,
            };

            match next {
                Some(Ok(bytes)) => {
                    for frame in decoder.feed(&bytes) {
                        if let Some(result) = self.apply(frame, &mut on_delta) {
                            return result;
                        }
                    }
                }
                Some(Err(e)) => return Err(e),
                None => {
                    debug!("Stream closed with {} bytes pending", decoder.pending_bytes());
                    if let Some(frame) = decoder.finish() {
                        if let Some(result) = self.apply(frame, &mut on_delta) {
                            return result;
                        }
                    }
                    warn!(
                        "Stream ended without a completion frame, keeping {} chars",
                        self.accumulated.len()
                    );
                    return Ok(StreamOutput::truncated(self.accumulated));
                }
            }
        }
    }
}

/// Convenience wrapper around [`StreamConsumer::consume`]
pub async fn consume_stream<F>(
    stream: ByteStream,
    cancel: &CancellationToken,
    on_delta: F,
) -> Result<StreamOutput, ProviderError>
where
    F: FnMut(&str),
{
    StreamConsumer::new().consume(stream, cancel, on_delta).await
}
