//! CLI command definitions

use crate::provider::client::DEFAULT_ENDPOINT;
use clap::Args;
use std::path::PathBuf;

/// Run a pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Initial input text (overrides the file's `input`)
    #[arg(short, long, conflicts_with = "input_file")]
    pub input: Option<String>,

    /// Read the initial input from a file
    #[arg(long)]
    pub input_file: Option<PathBuf>,

    /// Generation endpoint URL
    #[arg(long, env = "TEXTPIPE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Bearer token for the generation endpoint
    #[arg(long, env = "TEXTPIPE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Connect timeout for the generation endpoint, in seconds
    #[arg(long, default_value_t = 10)]
    pub connect_timeout: u64,

    /// Cancel the run after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Show a progress bar instead of streaming text
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the final execution record as JSON
    #[arg(long)]
    pub json: bool,
}

/// Validate a pipeline file
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Print each step's prompt template
    #[arg(long)]
    pub prompts: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List step kinds
#[derive(Debug, Args, Clone)]
pub struct KindsCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
