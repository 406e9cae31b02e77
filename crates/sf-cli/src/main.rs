//! `scanforge` — command-line front end over the orchestration executor.
//! Grounded on the teacher CLI's shape (clap-derive subcommands, an
//! `ExitError` carrying a process exit code, JSON-first output) adapted from
//! a daemon-attached client to a single in-process executor: every
//! invocation opens the WAL-backed store, runs one operation, and closes it.

#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod exit_error;
mod toolconfig;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use exit_error::ExitError;
use sf_adapters::ToolRegistry;
use sf_core::{
    CheckpointConfig, RunContext, RunId, ScanTarget, SystemClock, TargetType, WorkflowConfig,
    WorkflowType,
};
use sf_executor::Executor;
use sf_storage::Store;

#[derive(Parser)]
#[command(name = "scanforge", version, about = "Security workflow orchestration")]
struct Cli {
    /// Path to the WAL-backed run store.
    #[arg(long, global = true, default_value = "scanforge.wal")]
    state_dir: PathBuf,

    /// TOML file declaring the registered tool adapters.
    #[arg(long, global = true)]
    tools: Option<PathBuf>,

    /// TOML file overriding the default workflow config (concurrency, retry,
    /// checkpoint, validation).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a new workflow run and block until it completes or pauses.
    Create {
        /// Workflow template type: code-commit, dependency-update,
        /// emergency-vuln, release-regression.
        workflow_type: String,
        /// Path or identifier of the scan target.
        target: String,
        /// Tool ids to run (defaults to the template's required tools if
        /// empty).
        #[arg(long = "tool")]
        tools: Vec<String>,
    },
    /// Show a run's current state.
    Status { run_id: String },
    /// Mark a run paused.
    Pause { run_id: String },
    /// Resume a paused run past its human-review gate.
    Resume { run_id: String },
    /// Cancel a running (non-terminal) run.
    Cancel { run_id: String },
    /// Delete a run and its checkpoints.
    Delete { run_id: String },
    /// List every known run.
    List,
    /// List a run's checkpoints.
    ListCheckpoints { run_id: String },
    /// List the registered workflow templates.
    ListTemplates,
}

fn parse_workflow_type(s: &str) -> Result<WorkflowType, ExitError> {
    match s {
        "code-commit" => Ok(WorkflowType::CodeCommit),
        "dependency-update" => Ok(WorkflowType::DependencyUpdate),
        "emergency-vuln" => Ok(WorkflowType::EmergencyVuln),
        "release-regression" => Ok(WorkflowType::ReleaseRegression),
        "custom" => Ok(WorkflowType::Custom),
        other => Err(ExitError::new(3, format!("unknown workflow type '{other}'"))),
    }
}

fn parse_run_id(s: &str) -> Result<RunId, ExitError> {
    RunId::parse(s).map_err(|e| ExitError::new(3, format!("invalid run id '{s}': {e}")))
}

fn print_json(value: &impl serde::Serialize) -> Result<(), ExitError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| ExitError::new(1, format!("failed to render output: {e}")))?;
    println!("{rendered}");
    Ok(())
}

fn build_executor(cli: &Cli) -> Result<Executor<SystemClock>, ExitError> {
    let registry = Arc::new(ToolRegistry::new());
    if let Some(tools_path) = &cli.tools {
        toolconfig::load_into(&registry, tools_path).map_err(|e| ExitError::new(3, e.to_string()))?;
    }

    let workflow_config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| ExitError::new(3, format!("reading {}: {e}", path.display())))?;
            WorkflowConfig::from_toml_str(&raw)
                .map_err(|e| ExitError::new(3, format!("parsing {}: {e}", path.display())))?
        }
        None => WorkflowConfig::default(),
    };

    let store = Store::open(&cli.state_dir, CheckpointConfig::default())
        .map_err(|e| ExitError::new(1, format!("opening store {}: {e}", cli.state_dir.display())))?;

    Ok(Executor::new(registry, Arc::new(store), workflow_config, SystemClock))
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let executor = build_executor(&cli)?;

    match cli.command {
        Command::Create { workflow_type, target, tools } => {
            let workflow_type = parse_workflow_type(&workflow_type)?;
            let context = RunContext {
                workflow_type,
                target: ScanTarget::new(TargetType::SourceRepo, target),
                tool_ids: tools,
                tool_options: HashMap::new(),
                created_by: std::env::var("USER").ok(),
                tags: Vec::new(),
            };
            let state = executor.execute(context).await?;
            print_json(&state)?;
        }
        Command::Status { run_id } => {
            let state = executor.get_status(parse_run_id(&run_id)?)?;
            print_json(&state)?;
        }
        Command::Pause { run_id } => {
            let state = executor.pause(parse_run_id(&run_id)?)?;
            print_json(&state)?;
        }
        Command::Resume { run_id } => {
            let state = executor.resume(parse_run_id(&run_id)?).await?;
            print_json(&state)?;
        }
        Command::Cancel { run_id } => {
            let state = executor.cancel(parse_run_id(&run_id)?)?;
            print_json(&state)?;
        }
        Command::Delete { run_id } => {
            executor.delete(parse_run_id(&run_id)?)?;
            println!("deleted {run_id}");
        }
        Command::List => {
            print_json(&executor.list_workflows())?;
        }
        Command::ListCheckpoints { run_id } => {
            print_json(&executor.list_checkpoints(parse_run_id(&run_id)?))?;
        }
        Command::ListTemplates => {
            print_json(&executor.list_templates())?;
        }
    }

    executor.close()?;
    Ok(())
}

#[tokio::main]
async fn main() {
    sf_executor::init_tracing();
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {}", err.message);
        std::process::exit(err.code);
    }
}
