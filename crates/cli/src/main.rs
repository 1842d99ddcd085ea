//! persona-relay CLI, the main entry point.
//!
//! Commands:
//! - `serve`: start the HTTP gateway
//! - `invoke`: run one tool invocation and print the result
//! - `tools`: list registered tools
//! - `config`: print the effective configuration (secrets redacted)

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "persona-relay",
    about = "Persona-conditioned, retrieval-grounded answers over a tool API",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.persona-relay/config.toml)
    #[arg(short, long, global = true, env = "PERSONA_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Invoke a tool once with a JSON payload
    Invoke {
        /// Tool name (e.g. personaAnalysis)
        tool: String,

        /// Payload as JSON text
        #[arg(short, long)]
        payload: String,

        /// Extra context entries as key=text, stored before the invocation
        #[arg(short, long = "seed", value_parser = commands::invoke::parse_seed)]
        seeds: Vec<(String, String)>,
    },

    /// List registered tools
    Tools,

    /// Show the effective configuration
    Config {
        /// Print only the default config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Invoke {
            tool,
            payload,
            seeds,
        } => commands::invoke::run(config_path, &tool, &payload, seeds).await?,
        Commands::Tools => commands::tools::run(config_path).await?,
        Commands::Config { path } => commands::config_cmd::run(config_path, path)?,
    }

    Ok(())
}
