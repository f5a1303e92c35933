//! Terminal output for live pipeline runs
//!
//! `TerminalOutput` implements [`ExecutionCallbacks`] and renders a run as it
//! happens:
//!
//! - Step headers with progress indicators: `[1/3] summarize`
//! - Streamed text printed as each chunk arrives
//! - Horizontal separators between steps
//! - A progress bar instead of streamed text in quiet mode
//!
//! # Example
//!
//! ```no_run
//! use textpipe::cli::terminal_output::TerminalOutput;
//! use textpipe::execution::ExecutionCallbacks;
//!
//! let output = TerminalOutput::new(vec!["summary".to_string()], false);
//! output.on_step_start("summary");
//! output.on_step_progress("summary", "Hello");
//! ```

use crate::cli::output::{create_progress_bar, format_execution_summary, CHECK, CROSS, WARN};
use crate::core::PipelineExecution;
use crate::execution::ExecutionCallbacks;
use console::style;
use indicatif::ProgressBar;
use std::io::{self, Write};

/// Callback that renders a run to the terminal
#[derive(Debug)]
pub struct TerminalOutput {
    step_ids: Vec<String>,
    progress: Option<ProgressBar>,
}

impl TerminalOutput {
    /// Create terminal output for a run over `step_ids`.
    ///
    /// With `quiet` set, streamed text is suppressed and a progress bar
    /// advances once per finished step.
    pub fn new(step_ids: Vec<String>, quiet: bool) -> Self {
        let progress = quiet.then(|| create_progress_bar(step_ids.len()));
        Self { step_ids, progress }
    }

    fn position(&self, step_id: &str) -> usize {
        self.step_ids
            .iter()
            .position(|id| id == step_id)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// `[N/M] step-id`
    fn step_header(&self, step_id: &str) -> String {
        format!(
            "[{}/{}] {}",
            style(self.position(step_id)).cyan(),
            style(self.step_ids.len()).dim(),
            style(step_id).bold()
        )
    }

    fn print_separator(&self) {
        let width = term_size::dimensions_stdout()
            .map(|(w, _)| w)
            .unwrap_or(80);
        println!("{}", style("─".repeat(width)).dim());
    }

    fn flush_stdout(&self) {
        let _ = io::stdout().flush();
    }
}

impl ExecutionCallbacks for TerminalOutput {
    fn on_step_start(&self, step_id: &str) {
        match self.progress {
            Some(ref bar) => bar.set_message(step_id.to_string()),
            None => {
                if self.position(step_id) > 1 {
                    self.print_separator();
                }
                println!("\n{}\n", self.step_header(step_id));
            }
        }
    }

    fn on_step_progress(&self, _step_id: &str, delta: &str) {
        if self.progress.is_none() {
            print!("{}", delta);
            self.flush_stdout();
        }
    }

    fn on_step_complete(&self, _step_id: &str, _output: &str) {
        match self.progress {
            Some(ref bar) => bar.inc(1),
            None => println!(),
        }
    }

    fn on_step_error(&self, step_id: &str, message: &str) {
        let line = format!(
            "{} {} {}",
            CROSS,
            style(step_id).bold(),
            style(message).red()
        );
        match self.progress {
            Some(ref bar) => bar.println(line),
            None => println!("\n{}", line),
        }
    }

    fn on_pipeline_complete(&self, execution: &PipelineExecution) {
        if let Some(ref bar) = self.progress {
            bar.finish_and_clear();
        }
        println!("\n{} {}", CHECK, format_execution_summary(execution));
    }

    fn on_pipeline_error(&self, message: &str) {
        if let Some(ref bar) = self.progress {
            bar.abandon();
        }
        println!("\n{} {}", WARN, style(message).yellow());
    }
}
