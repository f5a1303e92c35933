//! Test utility functions for textpipe

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use textpipe::core::config::PipelineConfig;
use textpipe::core::{PipelineExecution, StepExecution, StepStatus};
use textpipe::execution::{ExecutionCallbacks, PipelineError, PipelineExecutor};
use textpipe::provider::{ByteStream, GenerationRequest, ProviderError, StreamFrame, TextGenerator};
use tokio_util::sync::CancellationToken;

/// One scripted answer of the mock generator
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Stream these body pieces, each as a separate read
    Body(Vec<String>),
    /// Stream these pieces, then stall until cancelled
    Stall(Vec<String>),
    /// Fail the request with this HTTP status before any body arrives
    Status(u16, String),
}

/// Streams `text` word by word, then a complete frame
pub fn streamed(text: &str, tokens_used: Option<u64>) -> MockResponse {
    let mut accumulated = String::new();
    let mut body = Vec::new();
    for word in text.split_inclusive(' ') {
        accumulated.push_str(word);
        body.push(StreamFrame::chunk(word, accumulated.clone()).to_sse());
    }
    body.push(
        StreamFrame::Complete {
            output: text.to_string(),
            tokens_used,
        }
        .to_sse(),
    );
    MockResponse::Body(body)
}

/// Streams some chunks, then an error frame
pub fn failing_after(chunks: &[&str], message: &str) -> MockResponse {
    let mut body: Vec<String> = chunks
        .iter()
        .map(|c| StreamFrame::Chunk {
            chunk: c.to_string(),
            full_output: None,
        }
        .to_sse())
        .collect();
    body.push(StreamFrame::error(message).to_sse());
    MockResponse::Body(body)
}

/// Streams some chunks, then never finishes on its own
pub fn stalling_after(chunks: &[&str]) -> MockResponse {
    MockResponse::Stall(
        chunks
            .iter()
            .map(|c| StreamFrame::Chunk {
                chunk: c.to_string(),
                full_output: None,
            }
            .to_sse())
            .collect(),
    )
}

/// Mock generator that replays scripted responses in order
#[derive(Clone, Default)]
pub struct MockGenerator {
    responses: Arc<Mutex<Vec<MockResponse>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

impl MockGenerator {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        let mut responses = responses;
        responses.reverse();
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }
}

fn body_stream(pieces: Vec<String>) -> impl futures::Stream<Item = Result<Bytes, ProviderError>> {
    stream::iter(pieces.into_iter().map(|p| Ok(Bytes::from(p))))
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<ByteStream, ProviderError> {
        self.requests.lock().push(request.clone());
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        let response = self.responses.lock().pop().ok_or_else(|| {
            ProviderError::Network(format!(
                "MockGenerator: no response scripted for step '{}'",
                request.step_id
            ))
        })?;

        let body: ByteStream = match response {
            MockResponse::Body(pieces) => Box::pin(body_stream(pieces)),
            MockResponse::Stall(pieces) => Box::pin(body_stream(pieces).chain(stream::pending())),
            MockResponse::Status(status, body) => return Err(ProviderError::Http { status, body }),
        };
        Ok(body)
    }
}

/// Callbacks that keep a readable log of everything they saw
#[derive(Default)]
pub struct RecordingCallbacks {
    log: Mutex<Vec<String>>,
    deltas: Mutex<Vec<(String, String)>>,
}

impl RecordingCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log lines such as `start:summary` or `error:french:rate limited`
    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    /// Concatenated deltas seen for one step
    pub fn streamed_text(&self, step_id: &str) -> String {
        self.deltas
            .lock()
            .iter()
            .filter(|(id, _)| id == step_id)
            .map(|(_, delta)| delta.as_str())
            .collect()
    }

    fn push(&self, line: String) {
        self.log.lock().push(line);
    }
}

impl ExecutionCallbacks for RecordingCallbacks {
    fn on_step_start(&self, step_id: &str) {
        self.push(format!("start:{}", step_id));
    }

    fn on_step_progress(&self, step_id: &str, delta: &str) {
        self.deltas.lock().push((step_id.to_string(), delta.to_string()));
    }

    fn on_step_complete(&self, step_id: &str, _output: &str) {
        self.push(format!("complete:{}", step_id));
    }

    fn on_step_error(&self, step_id: &str, message: &str) {
        self.push(format!("error:{}:{}", step_id, message));
    }

    fn on_pipeline_complete(&self, _execution: &PipelineExecution) {
        self.push("pipeline_complete".to_string());
    }

    fn on_pipeline_error(&self, message: &str) {
        self.push(format!("pipeline_error:{}", message));
    }
}

/// Test result from running a pipeline
pub struct PipelineTestResult {
    pub result: Result<PipelineExecution, PipelineError>,
    /// Record as left on the executor after the run
    pub execution: PipelineExecution,
    pub callbacks: RecordingCallbacks,
    pub generator: MockGenerator,
}

impl PipelineTestResult {
    pub fn step(&self, step_id: &str) -> &StepExecution {
        self.execution
            .step(step_id)
            .unwrap_or_else(|| panic!("Step '{}' not found in result", step_id))
    }

    pub fn summary(&self) -> String {
        let statuses: Vec<String> = self
            .execution
            .step_executions
            .iter()
            .map(|s| format!("{}={:?}", s.step_id, s.status))
            .collect();
        format!("{:?} [{}]", self.execution.status, statuses.join(", "))
    }
}

/// Run a pipeline YAML with a mock generator replaying `responses`
pub async fn run_pipeline_with_mock(
    yaml: &str,
    input: &str,
    responses: Vec<MockResponse>,
) -> PipelineTestResult {
    let config = PipelineConfig::from_yaml(yaml).expect("valid pipeline yaml");
    let generator = MockGenerator::new(responses);
    let executor = PipelineExecutor::new(generator.clone());
    let callbacks = RecordingCallbacks::new();

    let result = executor
        .execute(input, &config.to_steps(), Some(&callbacks))
        .await;
    let execution = executor.execution().expect("execute leaves a record");

    PipelineTestResult {
        result,
        execution,
        callbacks,
        generator,
    }
}

/// Assert a step completed with exactly this output
pub fn assert_step_completed(result: &PipelineTestResult, step_id: &str, expected_output: &str) {
    let step = result.step(step_id);
    assert_eq!(
        step.status,
        StepStatus::Completed,
        "Step '{}' should be completed: {}",
        step_id,
        result.summary()
    );
    assert_eq!(step.output, expected_output);
    assert!(step.ended_at.is_some());
}

/// Assert a step ended in `status` with an error containing `expected_error`
pub fn assert_step_ended(
    result: &PipelineTestResult,
    step_id: &str,
    status: StepStatus,
    expected_error: &str,
) {
    let step = result.step(step_id);
    assert_eq!(
        step.status, status,
        "Step '{}' has the wrong status: {}",
        step_id,
        result.summary()
    );
    let error = step.error.as_deref().unwrap_or_default();
    assert!(
        error.contains(expected_error),
        "Step '{}' error:\n{}\n\ndoes not contain:\n{}",
        step_id,
        error,
        expected_error
    );
}

/// Assert steps never started
pub fn assert_steps_pending(result: &PipelineTestResult, step_ids: &[&str]) {
    for id in step_ids {
        let step = result.step(id);
        assert_eq!(step.status, StepStatus::Pending, "{}", result.summary());
        assert!(step.started_at.is_none());
        assert!(step.output.is_empty());
    }
}
