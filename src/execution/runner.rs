//! Step runner - executes one step against the text generator

use crate::{
    core::{prompt, Step},
    execution::error::StepExecutionError,
    provider::{consume_stream, GenerationRequest, ProviderError, StreamOutput, TextGenerator},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Executes a single step
pub struct StepRunner<G> {
    generator: G,
}

impl<G: TextGenerator> StepRunner<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Run `step` over `input`, forwarding each streamed delta to `on_progress`.
    ///
    /// No retries: any failure is returned as-is. Cancellation aborts both the
    /// in-flight request and the stream read.
    pub async fn run<F>(
        &self,
        step: &Step,
        input: &str,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<StreamOutput, StepExecutionError>
    where
        F: FnMut(&str),
    {
        info!("Executing step: {} ({})", step.id, step.kind);

        if cancel.is_cancelled() {
            return Err(StepExecutionError::new(&step.id, ProviderError::Cancelled));
        }

        let prompt = prompt::resolve(step.kind, &step.config, input);
        debug!("Prompt for step {}: {}", step.id, prompt);

        let request = GenerationRequest::new(&step.id, prompt);
        let result = match self.generator.generate(&request, cancel).await {
            Ok(body) => consume_stream(body, cancel, on_progress).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(output) => {
                debug!(
                    "Step {} produced {} chars (confirmed: {})",
                    step.id,
                    output.content.len(),
                    output.done
                );
                Ok(output)
            }
            Err(e) => {
                error!("Step {} failed: {}", step.id, e);
                Err(StepExecutionError::new(&step.id, e))
            }
        }
    }
}
