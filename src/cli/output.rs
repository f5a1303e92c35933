//! CLI output formatting

use crate::core::{ExecutionStatus, PipelineExecution, StepKind, StepStatus};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar over `total` steps
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("#>-");
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a step status for display
pub fn format_step_status(status: StepStatus) -> String {
    match status {
        StepStatus::Pending => style("PENDING").dim().to_string(),
        StepStatus::Running => style("RUNNING").yellow().to_string(),
        StepStatus::Completed => style("COMPLETED").green().to_string(),
        StepStatus::Error => style("ERROR").red().to_string(),
        StepStatus::Cancelled => style("CANCELLED").yellow().to_string(),
    }
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Error => style("ERROR").red().to_string(),
        ExecutionStatus::Cancelled => style("CANCELLED").yellow().to_string(),
    }
}

/// One-line summary of a run
pub fn format_execution_summary(execution: &PipelineExecution) -> String {
    let status_icon = match execution.status {
        ExecutionStatus::Completed => CHECK,
        ExecutionStatus::Error => CROSS,
        ExecutionStatus::Running => SPINNER,
        ExecutionStatus::Cancelled => WARN,
    };

    let mut line = format!(
        "{} {} - {} ({}/{}) - {}",
        status_icon,
        style(&execution.id.to_string()[..8]).dim(),
        format_status(execution.status),
        execution.completed_steps(),
        execution.step_executions.len(),
        style(format!("{:.0}%", execution.progress() * 100.0)).cyan()
    );

    if let Some(ended) = execution.ended_at {
        if let Ok(duration) = ended.signed_duration_since(execution.started_at).to_std() {
            line.push_str(&format!(" in {}", style(format_duration(duration)).dim()));
        }
    }
    if execution.total_tokens > 0 {
        line.push_str(&format!(" - {} tokens", execution.total_tokens));
    }
    line
}

/// Per-step status lines for a finished run
pub fn format_step_table(execution: &PipelineExecution) -> Vec<String> {
    execution
        .step_executions
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let mut line = format!(
                "  {}. {} {}",
                i + 1,
                style(&step.step_id).bold(),
                format_step_status(step.status)
            );
            if let Some(ref error) = step.error {
                line.push_str(&format!(": {}", style(error).red()));
            }
            line
        })
        .collect()
}

/// Describe a step kind and its settings
pub fn format_kind(kind: StepKind) -> String {
    let mut text = format!(
        "{} {} - {}",
        style(kind.to_string()).cyan().bold(),
        style(format!("({})", kind.label())).dim(),
        kind.description()
    );
    for (key, options) in kind.config_keys() {
        text.push_str(&format!("\n    {}: {}", key, options.join(", ")));
    }
    text
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}.{}s", secs, duration.subsec_millis() / 100)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
