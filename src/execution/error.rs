use crate::provider::ProviderError;
use thiserror::Error;
use uuid::Uuid;

/// A single step failed
#[derive(Debug, Error)]
#[error("Step '{step_id}' failed: {source}")]
pub struct StepExecutionError {
    pub step_id: String,
    #[source]
    pub source: ProviderError,
}

impl StepExecutionError {
    pub fn new(step_id: impl Into<String>, source: ProviderError) -> Self {
        Self {
            step_id: step_id.into(),
            source,
        }
    }

    /// Message recorded on the step and passed to `on_step_error`
    pub fn message(&self) -> String {
        self.source.to_string()
    }

    pub fn is_cancelled(&self) -> bool {
        self.source.is_cancelled()
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Step(#[from] StepExecutionError),

    #[error("Pipeline was cancelled")]
    Cancelled,

    /// Another `execute` call replaced this run's record mid-flight
    #[error("Run {0} was superseded by a newer run")]
    Superseded(Uuid),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
