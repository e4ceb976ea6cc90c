//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod exec;
mod pipeline;

use pipeline::{CreateArgs, PermitArgs, RunArgs};

use anyhow::Result;
use azpipe_actions::{ActionRegistry, CancelToken};
use clap::Subcommand;
use colored::*;
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use tracing::warn;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Create a YAML pipeline for an Azure Repos repository
    Create(CreateArgs),
    /// Authorize or unauthorize a pipeline for a protected resource
    Permit(PermitArgs),
    /// Run a pipeline and wait for it to finish
    Run(RunArgs),
    /// Execute any registered action with a JSON input file
    Exec {
        /// Action id (e.g. azure:pipeline:run)
        id: String,

        /// Path to a JSON file holding the action input
        #[arg(short, long)]
        input: PathBuf,
    },
    /// List the registered actions
    Actions,
}

/// Handle a CLI command
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let registry = config.registry();

    match command {
        Commands::Create(args) => {
            run_action(&registry, "azure:pipeline:create", args.into_input()).await
        }
        Commands::Permit(args) => {
            run_action(&registry, "azure:pipeline:permit", args.into_input()).await
        }
        Commands::Run(args) => {
            run_action(&registry, "azure:pipeline:run", args.into_input()?).await
        }
        Commands::Exec { id, input } => {
            let input = exec::read_input(&input)?;
            run_action(&registry, &id, input).await
        }
        Commands::Actions => {
            exec::list_actions(&registry);
            Ok(())
        }
    }
}

/// Exit status of a process stopped by SIGINT
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Executes an action, cancelling it on Ctrl-C, and prints its outputs
///
/// A second Ctrl-C exits immediately.
async fn run_action(registry: &ActionRegistry, id: &str, input: JsonValue) -> Result<()> {
    let cancel = CancelToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling action (press Ctrl-C again to exit)");
                cancel.cancel();
            }
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted again, exiting");
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        })
    };

    let result = registry.execute(id, input, cancel).await;
    interrupt.abort();
    let outputs = result?;

    if outputs.is_empty() {
        println!("{}", format!("Action {} finished without outputs.", id).yellow());
        return Ok(());
    }

    println!("{}", format!("✓ Action {} finished", id).green().bold());
    for (name, value) in &outputs {
        println!("  {:<12} {}", format!("{}:", name), colorize(name, value));
    }

    Ok(())
}

fn colorize(name: &str, value: &str) -> ColoredString {
    match (name, value) {
        ("runResult", "succeeded" | "submitted") => value.green(),
        ("runResult", _) => value.red(),
        (n, _) if n.ends_with("Url") => value.dimmed(),
        _ => value.cyan(),
    }
}
