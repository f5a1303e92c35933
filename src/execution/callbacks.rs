//! Observer surface for pipeline runs
//!
//! Every method has a no-op default, so an implementation only overrides
//! what it cares about. Callbacks are called synchronously from the run, in
//! order: progress for a step arrives in stream order, and steps never
//! interleave.
//!
//! # Example
//!
//! ```
//! use textpipe::execution::ExecutionCallbacks;
//!
//! struct LivePrinter;
//!
//! impl ExecutionCallbacks for LivePrinter {
//!     fn on_step_progress(&self, _step_id: &str, delta: &str) {
//!         print!("{}", delta);
//!     }
//! }
//! ```

use crate::core::PipelineExecution;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub trait ExecutionCallbacks: Send + Sync {
    fn on_step_start(&self, _step_id: &str) {}

    fn on_step_progress(&self, _step_id: &str, _delta: &str) {}

    fn on_step_complete(&self, _step_id: &str, _output: &str) {}

    fn on_step_error(&self, _step_id: &str, _message: &str) {}

    fn on_pipeline_complete(&self, _execution: &PipelineExecution) {}

    fn on_pipeline_error(&self, _message: &str) {}
}

/// Callbacks that do nothing
#[derive(Debug, Clone, Default)]
pub struct NoopCallbacks;

impl ExecutionCallbacks for NoopCallbacks {}

/// Events that can occur during pipeline execution
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    StepStarted { step_id: String },
    StepProgress { step_id: String, delta: String },
    StepCompleted { step_id: String, output: String },
    StepFailed { step_id: String, error: String },
    PipelineCompleted { execution: Box<PipelineExecution> },
    PipelineFailed { error: String },
}

impl ExecutionEvent {
    /// Whether this event ends the run
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            ExecutionEvent::PipelineCompleted { .. } | ExecutionEvent::PipelineFailed { .. }
        )
    }
}

/// Forwards every callback as an [`ExecutionEvent`] on an unbounded channel.
///
/// Sends never block the run; events are dropped once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelCallbacks {
    sender: UnboundedSender<ExecutionEvent>,
}

impl ChannelCallbacks {
    pub fn new(sender: UnboundedSender<ExecutionEvent>) -> Self {
        Self { sender }
    }

    /// Create callbacks and the receiving end of their channel
    pub fn channel() -> (Self, UnboundedReceiver<ExecutionEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self::new(sender), receiver)
    }

    fn emit(&self, event: ExecutionEvent) {
        let _ = self.sender.send(event);
    }
}

impl ExecutionCallbacks for ChannelCallbacks {
    fn on_step_start(&self, step_id: &str) {
        self.emit(ExecutionEvent::StepStarted {
            step_id: step_id.to_string(),
        });
    }

    fn on_step_progress(&self, step_id: &str, delta: &str) {
        self.emit(ExecutionEvent::StepProgress {
            step_id: step_id.to_string(),
            delta: delta.to_string(),
        });
    }

    fn on_step_complete(&self, step_id: &str, output: &str) {
        self.emit(ExecutionEvent::StepCompleted {
            step_id: step_id.to_string(),
            output: output.to_string(),
        });
    }

    fn on_step_error(&self, step_id: &str, message: &str) {
        self.emit(ExecutionEvent::StepFailed {
            step_id: step_id.to_string(),
            error: message.to_string(),
        });
    }

    fn on_pipeline_complete(&self, execution: &PipelineExecution) {
        self.emit(ExecutionEvent::PipelineCompleted {
            execution: Box::new(execution.clone()),
        });
    }

    fn on_pipeline_error(&self, message: &str) {
        self.emit(ExecutionEvent::PipelineFailed {
            error: message.to_string(),
        });
    }
}
