//! HTTP client for the streaming generation endpoint

use crate::provider::{ByteStream, GenerationRequest, ProviderConfig, ProviderError, TextGenerator};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Calls the generation endpoint over HTTP and hands back the response body
#[derive(Debug, Clone)]
pub struct HttpGenerator {
    client: Client,
    config: ProviderConfig,
}

impl HttpGenerator {
    /// Build a client from configuration
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        if let Some(ref user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl TextGenerator for HttpGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<ByteStream, ProviderError> {
        debug!(
            "POST {} for step {} (prompt length {})",
            self.config.endpoint,
            request.step_id,
            request.prompt.len()
        );

        let mut builder = self.client.post(&self.config.endpoint).json(request);
        if let Some(ref key) = self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        // Dropping the send future aborts the connection.
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            response = builder.send() => response.map_err(|e| {
                ProviderError::Network(format!(
                    "Failed to connect to {}: {}",
                    self.config.endpoint, e
                ))
            })?,
        };

        let status = response.status();
        if !status.is_success() {
            let body = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
                body = response.text() => body.unwrap_or_default(),
            };
            warn!("Generation endpoint returned {}: {}", status, body.trim());
            return Err(ProviderError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| ProviderError::Network(e.to_string())));
        Ok(Box::pin(stream))
    }
}
