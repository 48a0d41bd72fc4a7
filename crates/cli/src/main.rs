//! Tradvisor CLI, the main entry point.
//!
//! Commands:
//! - `ask`: Run one research task and print the result
//! - `chat`: Interactive research session with running history
//! - `serve`: Start the HTTP/SSE gateway
//! - `onboard`: Write a starter config file
//! - `status`: Show the effective configuration
//! - `doctor`: Diagnose setup problems
//! - `completions`: Print shell completions

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod render;

#[derive(Parser)]
#[command(
    name = "tradvisor",
    about = "Tradvisor: an LLM research agent for stock analysis",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of ~/.tradvisor/config.toml
    #[arg(short, long, global = true, env = "TRADVISOR_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single research task
    Ask {
        /// What to research, e.g. "What is NVDA's fair value?"
        #[arg(required = true, num_args = 1..)]
        task: Vec<String>,

        /// Print raw events as JSON lines instead of rendered output
        #[arg(long)]
        json: bool,

        /// Override the iteration limit for this task
        #[arg(long)]
        max_iterations: Option<u32>,
    },

    /// Start an interactive research session
    Chat,

    /// Start the HTTP/SSE gateway
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the bind host
        #[arg(long)]
        host: Option<String>,
    },

    /// Write a starter configuration file
    Onboard,

    /// Show the effective configuration
    Status,

    /// Diagnose configuration problems
    Doctor,

    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_tracing(verbose: bool, json: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    // stdout carries rendered output only
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_json);

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Ask {
            task,
            json,
            max_iterations,
        } => commands::ask::run(config_path, &task.join(" "), json, max_iterations).await?,
        Commands::Chat => commands::chat::run(config_path).await?,
        Commands::Serve { port, host } => commands::serve::run(config_path, host, port).await?,
        Commands::Onboard => commands::onboard::run(config_path).await?,
        Commands::Status => commands::status::run(config_path).await?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "tradvisor", &mut std::io::stdout());
        }
    }

    Ok(())
}
