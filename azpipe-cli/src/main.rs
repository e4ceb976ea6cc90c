//! azpipe CLI
//!
//! Command-line front end for the Azure DevOps pipeline actions: create a
//! pipeline, change its resource permissions and run it.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "azpipe")]
#[command(about = "Azure DevOps pipeline actions", long_about = None)]
struct Cli {
    /// TOML file listing Azure DevOps hosts and their credentials
    #[arg(long, global = true, env = "AZPIPE_INTEGRATIONS")]
    integrations: Option<PathBuf>,

    /// Personal access token for the default host
    #[arg(long, global = true, env = "AZURE_DEVOPS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "azpipe=info,azpipe_actions=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.integrations, cli.token)?;

    handle_command(cli.command, &config).await
}
