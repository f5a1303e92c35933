//! Pipeline executor - drives a run from the first step to the last

use crate::{
    core::{ExecutionStatus, PipelineExecution, Step},
    execution::{
        callbacks::{ExecutionCallbacks, NoopCallbacks},
        error::{PipelineError, Result},
        runner::StepRunner,
    },
    provider::TextGenerator,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Mutable state shared between the run and `cancel()`
struct RunState {
    execution: Option<PipelineExecution>,
    cancel: CancellationToken,
}

/// Runs steps strictly in sequence, feeding each output into the next step.
///
/// The executor is caller-owned. Clones share the same run record and
/// cancellation token, so a clone handed to another task can `cancel()` the
/// run in flight. Callers must not start a second `execute` on the same
/// executor while one is running; if they do, the older run stops writing to
/// the record and returns [`PipelineError::Superseded`].
pub struct PipelineExecutor<G> {
    runner: Arc<StepRunner<G>>,
    state: Arc<Mutex<RunState>>,
}

impl<G> Clone for PipelineExecutor<G> {
    fn clone(&self) -> Self {
        Self {
            runner: self.runner.clone(),
            state: self.state.clone(),
        }
    }
}

impl<G: TextGenerator> PipelineExecutor<G> {
    pub fn new(generator: G) -> Self {
        Self {
            runner: Arc::new(StepRunner::new(generator)),
            state: Arc::new(Mutex::new(RunState {
                execution: None,
                cancel: CancellationToken::new(),
            })),
        }
    }

    /// Snapshot of the most recent run's record
    pub fn execution(&self) -> Option<PipelineExecution> {
        self.state.lock().execution.clone()
    }

    pub fn is_running(&self) -> bool {
        self.state
            .lock()
            .execution
            .as_ref()
            .is_some_and(|e| e.status == ExecutionStatus::Running)
    }

    /// Cancel the current run.
    ///
    /// Safe to call any number of times, before, during or after a run. A
    /// running record becomes `cancelled`; a finished one is left alone.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        state.cancel.cancel();
        if let Some(execution) = state.execution.as_mut() {
            if execution.status == ExecutionStatus::Running {
                info!("Cancelling pipeline execution {}", execution.id);
                execution.cancel();
            }
        }
    }

    /// Execute `steps` over `initial_input`.
    ///
    /// Returns the completed record, or the first error after the record has
    /// reached its terminal state. Steps after a failed one stay `pending`.
    pub async fn execute(
        &self,
        initial_input: &str,
        steps: &[Step],
        callbacks: Option<&dyn ExecutionCallbacks>,
    ) -> Result<PipelineExecution> {
        let callbacks = callbacks.unwrap_or(&NoopCallbacks);

        let (run_id, cancel) = {
            let mut state = self.state.lock();
            let execution = PipelineExecution::new(steps);
            let run_id = execution.id;
            state.execution = Some(execution);
            state.cancel = CancellationToken::new();
            (run_id, state.cancel.clone())
        };

        info!(
            "Starting pipeline execution {} ({} steps)",
            run_id,
            steps.len()
        );

        let mut current = initial_input.to_string();

        for (index, step) in steps.iter().enumerate() {
            if cancel.is_cancelled() {
                return self.finish_cancelled(run_id, callbacks);
            }

            self.update(run_id, |e| e.step_executions[index].start(&current))
                .ok_or(PipelineError::Superseded(run_id))?;
            callbacks.on_step_start(&step.id);

            let result = self
                .runner
                .run(step, &current, &cancel, |delta| {
                    self.update(run_id, |e| e.step_executions[index].append_output(delta));
                    callbacks.on_step_progress(&step.id, delta);
                })
                .await;

            match result {
                Ok(output) => {
                    self.update(run_id, |e| {
                        e.step_executions[index]
                            .complete(output.content.clone(), output.tokens_used);
                        e.total_tokens += output.tokens_used.unwrap_or(0);
                    })
                    .ok_or(PipelineError::Superseded(run_id))?;
                    info!("Step {} completed successfully", step.id);
                    callbacks.on_step_complete(&step.id, &output.content);
                    current = output.content;
                }
                Err(err) => {
                    let message = err.message();
                    let step_cancelled = err.is_cancelled();
                    self.update(run_id, |e| {
                        if step_cancelled {
                            e.step_executions[index].cancel(message.clone());
                        } else {
                            e.step_executions[index].fail(message.clone());
                        }
                    })
                    .ok_or(PipelineError::Superseded(run_id))?;
                    callbacks.on_step_error(&step.id, &message);

                    // The run ends cancelled even if the step failed on its own
                    if step_cancelled || cancel.is_cancelled() {
                        return self.finish_cancelled(run_id, callbacks);
                    }

                    self.update(run_id, PipelineExecution::fail)
                        .ok_or(PipelineError::Superseded(run_id))?;
                    let error = PipelineError::from(err);
                    warn!("Pipeline execution {} failed: {}", run_id, error);
                    callbacks.on_pipeline_error(&error.to_string());
                    return Err(error);
                }
            }
        }

        let execution = self
            .update(run_id, |e| {
                e.complete();
                e.clone()
            })
            .ok_or(PipelineError::Superseded(run_id))?;

        // cancel() landed after the last step finished
        if execution.status == ExecutionStatus::Cancelled {
            return self.finish_cancelled(run_id, callbacks);
        }

        info!(
            "Pipeline execution {} completed ({} tokens)",
            run_id, execution.total_tokens
        );
        callbacks.on_pipeline_complete(&execution);
        Ok(execution)
    }

    fn finish_cancelled(
        &self,
        run_id: Uuid,
        callbacks: &dyn ExecutionCallbacks,
    ) -> Result<PipelineExecution> {
        self.update(run_id, PipelineExecution::cancel)
            .ok_or(PipelineError::Superseded(run_id))?;
        let error = PipelineError::Cancelled;
        info!("Pipeline execution {} cancelled", run_id);
        callbacks.on_pipeline_error(&error.to_string());
        Err(error)
    }

    /// Apply `f` to the record of `run_id`, if it is still the live run
    fn update<R>(&self, run_id: Uuid, f: impl FnOnce(&mut PipelineExecution) -> R) -> Option<R> {
        let mut state = self.state.lock();
        match state.execution.as_mut() {
            Some(execution) if execution.id == run_id => Some(f(execution)),
            _ => None,
        }
    }
}
