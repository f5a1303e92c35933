//! Test: Cancellation - stopping a run mid-flight

use crate::helpers::*;
use std::time::Duration;
use textpipe::core::config::PipelineConfig;
use textpipe::core::{ExecutionStatus, StepStatus};
use textpipe::execution::{ExecutionEvent, PipelineError, PipelineExecutor};
use textpipe::ChannelCallbacks;

const TWO_STEPS: &str = r#"
name: "Test: Cancellation"

steps:
  - id: "summary"
    kind: summarize
  - id: "french"
    kind: translate
    config:
      targetLanguage: french
"#;

/// Test that cancelling while a step streams stops the run
#[tokio::test]
async fn test_cancel_during_streaming() {
    let steps = PipelineConfig::from_yaml(TWO_STEPS).unwrap().to_steps();
    let generator = MockGenerator::new(vec![stalling_after(&["Part", "ial"])]);
    let executor = PipelineExecutor::new(generator.clone());
    let (callbacks, mut events) = ChannelCallbacks::channel();

    let run = {
        let executor = executor.clone();
        let steps = steps.clone();
        tokio::spawn(async move { executor.execute("Some text", &steps, Some(&callbacks)).await })
    };

    // Wait until both chunks have been streamed
    let mut seen = String::new();
    while seen != "Partial" {
        match events.recv().await {
            Some(ExecutionEvent::StepProgress { delta, .. }) => seen.push_str(&delta),
            Some(_) => {}
            None => panic!("run ended before streaming"),
        }
    }
    assert!(executor.is_running());

    executor.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("run should stop promptly")
        .unwrap();
    assert!(matches!(result, Err(PipelineError::Cancelled)));

    let execution = executor.execution().unwrap();
    assert_eq!(execution.status, ExecutionStatus::Cancelled);
    let summary = execution.step("summary").unwrap();
    assert_eq!(summary.status, StepStatus::Cancelled);
    assert_eq!(summary.output, "Partial");
    assert!(summary.ended_at.is_some());
    assert_eq!(execution.step("french").unwrap().status, StepStatus::Pending);
    assert_eq!(generator.requests().len(), 1);

    let mut rest = Vec::new();
    while let Ok(event) = events.try_recv() {
        rest.push(event);
    }
    assert!(rest.contains(&ExecutionEvent::StepFailed {
        step_id: "summary".to_string(),
        error: "Request was cancelled".to_string(),
    }));
    assert_eq!(
        rest.last(),
        Some(&ExecutionEvent::PipelineFailed {
            error: "Pipeline was cancelled".to_string(),
        })
    );
    assert!(!rest
        .iter()
        .any(|e| matches!(e, ExecutionEvent::PipelineCompleted { .. })));
}

/// Test that repeated cancel calls converge on the same record
#[tokio::test]
async fn test_cancel_is_idempotent() {
    let steps = PipelineConfig::from_yaml(TWO_STEPS).unwrap().to_steps();
    let executor = PipelineExecutor::new(MockGenerator::new(vec![stalling_after(&[])]));

    let run = {
        let executor = executor.clone();
        tokio::spawn(async move { executor.execute("text", &steps, None).await })
    };

    while !executor
        .execution()
        .and_then(|e| e.step("summary").map(|s| s.status == StepStatus::Running))
        .unwrap_or(false)
    {
        tokio::task::yield_now().await;
    }

    executor.cancel();
    executor.cancel();
    let result = run.await.unwrap();
    assert!(matches!(result, Err(PipelineError::Cancelled)));

    let first = executor.execution().unwrap();
    executor.cancel();
    assert_eq!(executor.execution().unwrap(), first);
    assert_eq!(first.status, ExecutionStatus::Cancelled);
}

/// Test that cancelling a finished run leaves it completed
#[tokio::test]
async fn test_cancel_after_completion_is_noop() {
    let steps = PipelineConfig::from_yaml(TWO_STEPS).unwrap().to_steps();
    let executor = PipelineExecutor::new(MockGenerator::new(vec![
        streamed("short", None),
        streamed("court", None),
    ]));
    executor.execute("text", &steps, None).await.unwrap();
    executor.cancel();

    let execution = executor.execution().unwrap();
    assert_eq!(execution.status, ExecutionStatus::Completed);
    assert!(execution
        .step_executions
        .iter()
        .all(|s| s.status == StepStatus::Completed));
}

/// Test that a cancel issued before a run does not affect the next run
#[tokio::test]
async fn test_cancel_before_run_does_not_stick() {
    let steps = PipelineConfig::from_yaml(TWO_STEPS).unwrap().to_steps();
    let executor = PipelineExecutor::new(MockGenerator::new(vec![
        streamed("short", None),
        streamed("court", None),
    ]));
    executor.cancel();

    let execution = executor.execute("text", &steps, None).await.unwrap();
    assert_eq!(execution.status, ExecutionStatus::Completed);
}
