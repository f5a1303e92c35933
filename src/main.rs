use anyhow::{bail, Context, Result};
use std::time::Duration;
use textpipe::cli::commands::{KindsCommand, RunCommand, ValidateCommand};
use textpipe::cli::output::*;
use textpipe::cli::terminal_output::TerminalOutput;
use textpipe::cli::{Cli, Command};
use textpipe::core::config::PipelineConfig;
use textpipe::core::{prompt, validate_steps, ExecutionStatus, StepKind};
use textpipe::execution::{ExecutionCallbacks, PipelineExecutor};
use textpipe::provider::{HttpGenerator, ProviderConfig};
use tracing::{debug, error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set logging subscriber: {}", e))?;

    match &cli.command {
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Validate(cmd) => validate_pipeline(cmd)?,
        Command::Kinds(cmd) => list_kinds(cmd)?,
    }

    Ok(())
}

fn resolve_input(cmd: &RunCommand, config: &PipelineConfig) -> Result<String> {
    if let Some(ref input) = cmd.input {
        return Ok(input.clone());
    }
    if let Some(ref path) = cmd.input_file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()));
    }
    match config.input {
        Some(ref input) => Ok(input.clone()),
        None => bail!(
            "No input given: use --input, --input-file or set `input` in the pipeline file"
        ),
    }
}

async fn run_pipeline(cmd: &RunCommand) -> Result<()> {
    let config = PipelineConfig::from_file(&cmd.file).context("Failed to load pipeline config")?;
    let input = resolve_input(cmd, &config)?;
    let steps = config.to_steps();

    // stdout carries only the execution record under --json
    for issue in validate_steps(&steps) {
        if cmd.json {
            warn!("{}", issue);
        } else {
            println!("{} {}", WARN, style(issue).yellow());
        }
    }

    if !cmd.json {
        println!(
            "{} Running pipeline: {} ({} steps)",
            ROCKET,
            style(&config.name).bold(),
            style(steps.len()).cyan()
        );
    }

    let mut provider = ProviderConfig::new()
        .with_endpoint(&cmd.endpoint)
        .with_connect_timeout(cmd.connect_timeout)
        .with_user_agent(concat!("textpipe/", env!("CARGO_PKG_VERSION")));
    if let Some(ref key) = cmd.api_key {
        provider = provider.with_api_key(key);
    }
    let generator = HttpGenerator::new(provider).context("Failed to create HTTP client")?;
    let executor = PipelineExecutor::new(generator);

    let interrupt = {
        let executor = executor.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling run");
                executor.cancel();
            }
        })
    };
    let deadline = cmd.timeout.map(|secs| {
        let executor = executor.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            warn!("Timed out after {}s, cancelling run", secs);
            executor.cancel();
        })
    });

    let terminal = (!cmd.json).then(|| {
        let step_ids = steps.iter().map(|s| s.id.clone()).collect();
        TerminalOutput::new(step_ids, cmd.quiet)
    });
    let callbacks = terminal.as_ref().map(|t| t as &dyn ExecutionCallbacks);
    let result = executor.execute(&input, &steps, callbacks).await;

    interrupt.abort();
    if let Some(handle) = deadline {
        handle.abort();
    }

    let execution = executor.execution();
    if cmd.json {
        if let Some(ref execution) = execution {
            println!("{}", serde_json::to_string_pretty(execution)?);
        }
    } else if let Some(ref execution) = execution {
        if execution.status != ExecutionStatus::Completed {
            for line in format_step_table(execution) {
                println!("{}", line);
            }
        }
    }

    match result {
        Ok(execution) => {
            debug!("Pipeline {} finished", execution.id);
            if !cmd.json {
                if let Some(last) = execution.step_executions.last() {
                    println!("\n{}", style("Final output:").bold());
                    println!("{}", last.output);
                }
            }
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            if !cmd.json {
                println!(
                    "\n{} {} {}",
                    CROSS,
                    style(&config.name).bold(),
                    style("failed").red()
                );
            }
            std::process::exit(1);
        }
    }
}

fn validate_pipeline(cmd: &ValidateCommand) -> Result<()> {
    let config = match PipelineConfig::from_file(&cmd.file) {
        Ok(config) => config,
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(format!("{:#}", e)).red());
            std::process::exit(1);
        }
    };

    let steps = config.to_steps();
    let issues = validate_steps(&steps);

    if cmd.json {
        let data = serde_json::json!({
            "name": config.name,
            "steps": steps,
            "issues": issues,
        });
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} Pipeline configuration is valid!", CHECK);
    println!("  Name: {}", style(&config.name).bold());
    println!("  Steps: {}", style(steps.len()).cyan());
    for (i, step) in steps.iter().enumerate() {
        println!(
            "  {}. {} {}",
            i + 1,
            style(&step.id).bold(),
            style(format!("({})", step.kind.label())).dim()
        );
        if cmd.prompts {
            for line in prompt::template(step.kind, &step.config).lines() {
                println!("       {}", style(line).dim());
            }
        }
    }

    if !issues.is_empty() {
        println!("\n{} {} advisory issue(s):", INFO, issues.len());
        for issue in &issues {
            println!("  {} {}", WARN, style(issue).yellow());
        }
    }

    Ok(())
}

fn list_kinds(cmd: &KindsCommand) -> Result<()> {
    if cmd.json {
        let data: Vec<_> = StepKind::ALL
            .iter()
            .map(|kind| {
                serde_json::json!({
                    "kind": kind,
                    "label": kind.label(),
                    "description": kind.description(),
                    "defaultConfig": kind.default_config(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    println!("{} Step kinds:", INFO);
    for kind in StepKind::ALL {
        println!("  {}", format_kind(kind));
    }
    Ok(())
}
