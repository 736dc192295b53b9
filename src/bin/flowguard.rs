//! `flowguard` CLI: run or statically analyze a workflow defined in a
//! YAML configuration file.

use clap::{Parser, Subcommand};
use flowguard::config::Config;
use flowguard::context::Context;
use flowguard::engine::Engine;
use flowguard::registry::Registry;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "flowguard",
    version,
    about = "Declarative YAML workflow engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a workflow defined in a configuration file.
    Run {
        /// Path to the YAML configuration file.
        config: PathBuf,
        /// Name of the workflow to run.
        workflow: String,
    },
    /// Print a deterministic analysis report for a workflow.
    Analyze { config: PathBuf, workflow: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "flowguard failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Run { config, workflow } => {
            let config = load_config(&config)?;
            let engine = Engine::builder(config, Registry::new()).build()?;
            let mut context = Context::new();
            let result = engine.run_to_completion(&workflow, &mut context).await;
            if result.is_success() {
                println!("SUCCESS");
                Ok(())
            } else {
                anyhow::bail!(result
                    .message
                    .unwrap_or_else(|| "workflow failed".to_string()))
            }
        }
        Command::Analyze { config, workflow } => {
            let config = load_config(&config)?;
            let engine = Engine::builder(config, Registry::new())
                .fail_fast_on_construction(false)
                .build()?;
            let report = engine.analyze_workflow(&workflow)?;
            print!("{report}");
            Ok(())
        }
    }
}

fn load_config(path: &PathBuf) -> anyhow::Result<Config> {
    let yaml = std::fs::read_to_string(path)
        .map_err(|source| anyhow::anyhow!("reading {}: {source}", path.display()))?;
    Ok(Config::from_str(&yaml)?)
}
