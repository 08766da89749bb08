// crates/flowcli/src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flowcore::{ExecutionStatus, NodeCategory, Value, Workflow, WorkflowExecution, WorkflowNode};
use flownodes::definitions::{IF_CONDITION, MANUAL_TRIGGER, SET_DATA};
use flowruntime::{FlowRuntime, RunOptions, RuntimeConfig};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flow")]
#[command(about = "Flow Engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a workflow file
    Run {
        /// Path to workflow JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// Input data as JSON string
        #[arg(short, long)]
        input: Option<String>,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a workflow file
    Validate {
        /// Path to workflow JSON file
        file: PathBuf,
    },

    /// List available node types
    Nodes {
        /// Only show this category
        #[arg(short, long)]
        category: Option<NodeCategory>,

        /// Filter by name, description or tag
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Create a new example workflow
    Init {
        /// Output file path
        #[arg(short, long, default_value = "workflow.json")]
        output: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            input,
            verbose,
        } => {
            init_logging(verbose);
            run_workflow(&file, input).await?;
        }

        Commands::Validate { file } => {
            validate_workflow(&file)?;
        }

        Commands::Nodes { category, search } => {
            list_nodes(category, search.as_deref());
        }

        Commands::Init { output } => {
            create_example_workflow(&output)?;
        }
    }

    Ok(())
}

fn load_workflow(file: &Path) -> Result<Workflow> {
    let workflow_json = std::fs::read_to_string(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let workflow = Workflow::from_json(&workflow_json)
        .with_context(|| format!("parsing {}", file.display()))?;
    Ok(workflow)
}

async fn run_workflow(file: &Path, input: Option<String>) -> Result<()> {
    println!("🚀 Loading workflow from: {}", file.display());

    let workflow = load_workflow(file)?;

    println!("📋 Workflow: {}", workflow.name);
    println!("   Nodes: {}", workflow.nodes.len());
    println!("   Connections: {}", workflow.edges.len());
    println!();

    let input: Value = match input {
        Some(raw) => serde_json::from_str(&raw).context("--input must be valid JSON")?,
        None => Value::Null,
    };

    let runtime = flownodes::default_runtime(RuntimeConfig::default());

    // Subscribe to snapshots for real-time output
    let mut events = runtime.subscribe_events();
    let event_task = tokio::spawn(async move {
        let mut progress = Progress::default();
        while let Ok(snapshot) = events.recv().await {
            progress.print(&snapshot);
        }
    });

    let execution = runtime
        .execute(&workflow, RunOptions::default().with_input(input))
        .await;

    // Closing the bus lets the listener drain and stop.
    drop(runtime);
    event_task.await?;

    println!();
    println!("📊 Execution Summary:");
    println!("   Execution ID: {}", execution.id);
    println!("   Status: {}", execution.status);
    println!("   Nodes run: {}", execution.node_executions.len());
    if let Some(error) = &execution.error {
        println!("   Error: {}", error);
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&execution)?);

    if execution.status != ExecutionStatus::Success {
        anyhow::bail!("workflow finished with status {}", execution.status);
    }
    Ok(())
}

/// Tracks what has already been printed across snapshots.
#[derive(Default)]
struct Progress {
    status: Option<ExecutionStatus>,
    records: Vec<ExecutionStatus>,
}

impl Progress {
    fn print(&mut self, snapshot: &WorkflowExecution) {
        for (index, record) in snapshot.node_executions.iter().enumerate() {
            if self.records.get(index) == Some(&record.status) {
                continue;
            }
            match record.status {
                ExecutionStatus::Running if record.retry_count > 0 => println!(
                    "  🔁 Retrying node: {} (attempt {})",
                    record.node_id,
                    record.retry_count + 1
                ),
                ExecutionStatus::Running => println!("  ⚡ Starting node: {}", record.node_id),
                ExecutionStatus::Success => println!(
                    "  ✅ Node {} completed in {}ms",
                    record.node_id,
                    record.duration.unwrap_or(0)
                ),
                _ => println!(
                    "  ❌ Node {} {}: {}",
                    record.node_id,
                    record.status,
                    record.error.as_deref().unwrap_or("")
                ),
            }
            if index < self.records.len() {
                self.records[index] = record.status;
            } else {
                self.records.push(record.status);
            }
        }

        if self.status == Some(snapshot.status) {
            return;
        }
        self.status = Some(snapshot.status);
        match snapshot.status {
            ExecutionStatus::Running => println!("▶️  Workflow started"),
            ExecutionStatus::Success => println!(
                "✨ Workflow completed successfully in {}ms",
                snapshot.duration.unwrap_or(0)
            ),
            ExecutionStatus::Pending => {}
            status => println!(
                "💥 Workflow {} after {}ms",
                status,
                snapshot.duration.unwrap_or(0)
            ),
        }
    }
}

fn validate_workflow(file: &Path) -> Result<()> {
    println!("🔍 Validating workflow: {}", file.display());

    let workflow = load_workflow(file)?;
    let runtime = flownodes::default_runtime(RuntimeConfig::default());
    let report = flowruntime::validate_workflow(&workflow, runtime.catalog(), runtime.registry());

    for issue in &report.issues {
        println!("   {}", issue);
    }

    if !report.is_valid() {
        anyhow::bail!("workflow {} is invalid", workflow.name);
    }

    println!("✅ Workflow is valid:");
    println!("   Name: {}", workflow.name);
    println!("   Nodes: {}", workflow.nodes.len());
    println!("   Connections: {}", workflow.edges.len());
    Ok(())
}

fn list_nodes(category: Option<NodeCategory>, search: Option<&str>) {
    println!("📦 Available Node Types:");
    println!();

    let catalog = flownodes::builtin_catalog();
    let definitions = match (category, search) {
        (_, Some(query)) => catalog.search(query),
        (Some(category), None) => catalog.get_by_category(category),
        (None, None) => catalog.get_all(),
    };

    for definition in definitions {
        if category.is_some_and(|c| c != definition.category) {
            continue;
        }
        println!("  • {} ({})", definition.id, definition.category);
        println!("    {}", definition.description);
    }
}

fn example_workflow() -> Workflow {
    let mut workflow = Workflow::new("Example Branching Workflow");
    workflow.description = Some("Routes the test value to one of two branches".to_string());

    workflow.add_node(
        WorkflowNode::new("start", MANUAL_TRIGGER)
            .with_label("Start")
            .with_parameter("testData", json!({"value": 20}))
            .with_position(100.0, 100.0),
    );
    workflow.add_node(
        WorkflowNode::new("check", IF_CONDITION)
            .with_label("Value above 10?")
            .with_parameter("condition", "data.value > 10")
            .with_position(300.0, 100.0),
    );
    workflow.add_node(
        WorkflowNode::new("high", SET_DATA)
            .with_label("High")
            .with_parameter("values", json!({"bucket": "high"}))
            .with_position(500.0, 50.0),
    );
    workflow.add_node(
        WorkflowNode::new("low", SET_DATA)
            .with_label("Low")
            .with_parameter("values", json!({"bucket": "low"}))
            .with_position(500.0, 150.0),
    );

    workflow.connect("start", "check");
    workflow.connect_handle("check", "true", "high");
    workflow.connect_handle("check", "false", "low");
    workflow
}

fn create_example_workflow(output: &Path) -> Result<()> {
    let workflow = example_workflow();

    let json = serde_json::to_string_pretty(&workflow)?;
    std::fs::write(output, json)?;

    println!("✨ Created example workflow: {}", output.display());
    println!();
    println!("Run it with:");
    println!("  flow run --file {}", output.display());

    Ok(())
}
