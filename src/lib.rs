//! textpipe - streaming text-transformation pipelines
//!
//! A pipeline is an ordered list of steps (summarize, translate, rewrite,
//! extract). Each step's prompt is sent to a remote text-generation service
//! and its streamed output becomes the next step's input.

pub mod cli;
pub mod core;
pub mod execution;
pub mod provider;

// Re-export commonly used types
pub use crate::core::{
    ExecutionStatus, PipelineExecution, Step, StepExecution, StepKind, StepStatus,
};
pub use execution::{
    ChannelCallbacks, ExecutionCallbacks, ExecutionEvent, PipelineError, PipelineExecutor,
    StepExecutionError,
};
pub use provider::{HttpGenerator, ProviderConfig, ProviderError, StreamFrame, TextGenerator};
