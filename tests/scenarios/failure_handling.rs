//! Test: Failure Handling - a failed step stops the run

use crate::helpers::*;
use textpipe::core::{ExecutionStatus, StepStatus};
use textpipe::execution::PipelineError;

const THREE_STEPS: &str = r#"
name: "Test: Failure"

steps:
  - id: "summary"
    kind: summarize
  - id: "french"
    kind: translate
    config:
      targetLanguage: french
  - id: "casual"
    kind: rewrite
    config:
      tone: casual
"#;

/// Test that a provider error frame fails the step and the pipeline
#[tokio::test]
async fn test_error_frame_stops_pipeline() {
    let result = run_pipeline_with_mock(
        THREE_STEPS,
        "Some text",
        vec![
            streamed("A summary", Some(7)),
            failing_after(&["Un ", "rés"], "rate limited"),
        ],
    )
    .await;

    match result.result {
        Err(PipelineError::Step(ref err)) => {
            assert_eq!(err.step_id, "french");
            assert_eq!(err.message(), "rate limited");
        }
        ref other => panic!("Expected step failure, got {:?}", other),
    }

    assert_eq!(result.execution.status, ExecutionStatus::Error);
    assert!(result.execution.ended_at.is_some());
    assert_step_completed(&result, "summary", "A summary");
    assert_step_ended(&result, "french", StepStatus::Error, "rate limited");
    assert_eq!(result.step("french").error.as_deref(), Some("rate limited"));
    assert_steps_pending(&result, &["casual"]);

    // Partial output of the failed step is kept
    assert_eq!(result.step("french").output, "Un rés");
    assert_eq!(result.execution.total_tokens, 7);
    assert_eq!(result.execution.completed_steps(), 1);

    // The third step never reached the generator
    assert_eq!(result.generator.requests().len(), 2);

    assert_eq!(
        result.callbacks.log(),
        vec![
            "start:summary",
            "complete:summary",
            "start:french",
            "error:french:rate limited",
            "pipeline_error:Step 'french' failed: rate limited",
        ]
    );
}

/// Test that a non-success status fails the first step
#[tokio::test]
async fn test_http_status_fails_step() {
    let result = run_pipeline_with_mock(
        THREE_STEPS,
        "Some text",
        vec![MockResponse::Status(503, "upstream unavailable".to_string())],
    )
    .await;

    assert!(matches!(result.result, Err(PipelineError::Step(_))));
    assert_eq!(result.execution.status, ExecutionStatus::Error);
    assert_step_ended(&result, "summary", StepStatus::Error, "503");
    assert_step_ended(&result, "summary", StepStatus::Error, "upstream unavailable");
    assert_steps_pending(&result, &["french", "casual"]);
}

/// Test that a stream ending without a complete frame still succeeds
#[tokio::test]
async fn test_truncated_stream_keeps_accumulated_text() {
    let truncated = MockResponse::Body(vec![
        textpipe::StreamFrame::chunk("Partial ", "Partial ").to_sse(),
        textpipe::StreamFrame::chunk("answer", "Partial answer").to_sse(),
    ]);
    let result = run_pipeline_with_mock(
        THREE_STEPS,
        "Some text",
        vec![truncated, streamed("Réponse", None), streamed("answer lol", None)],
    )
    .await;

    assert!(result.result.is_ok(), "{}", result.summary());
    assert_step_completed(&result, "summary", "Partial answer");
    assert_eq!(result.step("french").input, "Partial answer");
}

/// Test that garbled frames are skipped without failing the step
#[tokio::test]
async fn test_garbled_frame_is_skipped() {
    let body = MockResponse::Body(vec![
        textpipe::StreamFrame::chunk("Good", "Good").to_sse(),
        "data: {not json\n\n".to_string(),
        textpipe::StreamFrame::complete("Good").to_sse(),
    ]);
    let result = run_pipeline_with_mock(
        THREE_STEPS,
        "Some text",
        vec![body, streamed("Bon", None), streamed("Good", None)],
    )
    .await;

    assert!(result.result.is_ok(), "{}", result.summary());
    assert_step_completed(&result, "summary", "Good");
}

/// Test that a generator with nothing scripted surfaces as a network error
#[tokio::test]
async fn test_missing_response_is_network_error() {
    let result = run_pipeline_with_mock(THREE_STEPS, "Some text", vec![]).await;

    assert_eq!(result.execution.status, ExecutionStatus::Error);
    assert_step_ended(&result, "summary", StepStatus::Error, "Network error");
}
