//! Pipeline execution engine

pub mod callbacks;
pub mod engine;
pub mod error;
pub mod runner;

pub use callbacks::{ChannelCallbacks, ExecutionCallbacks, ExecutionEvent, NoopCallbacks};
pub use engine::PipelineExecutor;
pub use error::{PipelineError, StepExecutionError};
pub use runner::StepRunner;
