//! Execution state models

use crate::core::step::Step;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall pipeline execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Pipeline is currently running
    Running,
    /// Every step completed
    Completed,
    /// A step failed and the run halted
    Error,
    /// The run was cancelled by the caller
    Cancelled,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }
}

/// Status of a single step within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Not started yet
    Pending,
    /// Request in flight, output streaming
    Running,
    /// Output is final
    Completed,
    /// Step failed
    Error,
    /// Step was running when the run was cancelled
    Cancelled,
}

impl StepStatus {
    /// Check if step is in a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            StepStatus::Completed | StepStatus::Error | StepStatus::Cancelled
        )
    }
}

/// Run-time record of one step within one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepExecution {
    /// Back-reference to the step
    pub step_id: String,

    pub status: StepStatus,

    /// Text actually fed to the step
    pub input: String,

    /// Accumulated output; final once completed
    pub output: String,

    pub error: Option<String>,

    pub started_at: Option<DateTime<Utc>>,

    pub ended_at: Option<DateTime<Utc>>,

    /// Tokens reported by the provider, if any
    pub tokens_used: Option<u64>,
}

impl StepExecution {
    pub fn new(step_id: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepStatus::Pending,
            input: String::new(),
            output: String::new(),
            error: None,
            started_at: None,
            ended_at: None,
            tokens_used: None,
        }
    }

    /// pending -> running
    pub fn start(&mut self, input: &str) {
        debug_assert_eq!(self.status, StepStatus::Pending);
        self.status = StepStatus::Running;
        self.input = input.to_string();
        self.started_at = Some(Utc::now());
    }

    /// Grow the partial output while running
    pub fn append_output(&mut self, delta: &str) {
        if self.status == StepStatus::Running {
            self.output.push_str(delta);
        }
    }

    /// running -> completed
    pub fn complete(&mut self, output: String, tokens_used: Option<u64>) {
        debug_assert_eq!(self.status, StepStatus::Running);
        self.status = StepStatus::Completed;
        self.output = output;
        self.tokens_used = tokens_used;
        self.ended_at = Some(Utc::now());
    }

    /// running -> error
    pub fn fail(&mut self, message: String) {
        self.finish_unsuccessfully(StepStatus::Error, message);
    }

    /// running -> cancelled
    pub fn cancel(&mut self, message: String) {
        self.finish_unsuccessfully(StepStatus::Cancelled, message);
    }

    fn finish_unsuccessfully(&mut self, status: StepStatus, message: String) {
        debug_assert_eq!(self.status, StepStatus::Running);
        self.status = status;
        self.error = Some(message);
        self.ended_at = Some(Utc::now());
    }
}

/// Aggregate record for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineExecution {
    /// Unique execution ID
    pub id: Uuid,

    pub status: ExecutionStatus,

    /// One record per input step, same order
    pub step_executions: Vec<StepExecution>,

    /// Tokens consumed across all steps
    pub total_tokens: u64,

    pub started_at: DateTime<Utc>,

    pub ended_at: Option<DateTime<Utc>>,
}

impl PipelineExecution {
    /// Fresh running record with every step pending
    pub fn new(steps: &[Step]) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: ExecutionStatus::Running,
            step_executions: steps.iter().map(|s| StepExecution::new(&s.id)).collect(),
            total_tokens: 0,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Look up a step record by step ID
    pub fn step(&self, step_id: &str) -> Option<&StepExecution> {
        self.step_executions.iter().find(|s| s.step_id == step_id)
    }

    /// Number of steps that completed
    pub fn completed_steps(&self) -> usize {
        self.step_executions
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count()
    }

    /// Fraction of steps completed (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.step_executions.is_empty() {
            return 0.0;
        }
        self.completed_steps() as f64 / self.step_executions.len() as f64
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Mark pipeline as completed
    pub fn complete(&mut self) {
        self.finish(ExecutionStatus::Completed);
    }

    /// Mark pipeline as failed
    pub fn fail(&mut self) {
        self.finish(ExecutionStatus::Error);
    }

    /// Mark pipeline as cancelled
    pub fn cancel(&mut self) {
        self.finish(ExecutionStatus::Cancelled);
    }

    /// Only a running record moves; terminal records are left untouched.
    fn finish(&mut self, status: ExecutionStatus) {
        if self.status == ExecutionStatus::Running {
            self.status = status;
            self.ended_at = Some(Utc::now());
        }
    }
}
