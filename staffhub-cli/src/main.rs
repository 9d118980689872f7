//! Main entry point for the `StaffHub` CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use shared::config::ClientConfig;
use std::path::PathBuf;

mod commands;
mod logging;
mod terminal;

/// `StaffHub` CLI
#[derive(Parser)]
#[command(name = "staffhub")]
#[command(about = "Command-line interface for the StaffHub staff and project manager", long_about = None)]
struct Cli {
    /// Path to the configuration file (optional)
    #[arg(
        long,
        short,
        global = true,
        help = "Path to the configuration file (e.g., staffhub.yaml, staffhub.json or staffhub.toml). If not provided, defaults and STAFFHUB_* variables are used."
    )]
    config: Option<PathBuf>,

    /// Print API payloads as JSON instead of tables
    #[arg(long, global = true, help = "Print API payloads as JSON instead of tables")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the `StaffHub` CLI
#[derive(Subcommand)]
enum Commands {
    /// Sign in, inspect, or end the stored session
    #[command(subcommand)]
    Session(commands::session::SessionCommand),

    /// Browse and manage collaborators
    #[command(subcommand)]
    Users(commands::users::UsersCommand),

    /// Browse organizational areas
    #[command(subcommand)]
    Areas(commands::areas::AreasCommand),

    /// Browse and manage projects
    #[command(subcommand)]
    Projects(commands::projects::ProjectsCommand),

    /// Check that the API is reachable
    Health,

    /// Generate shell completion scripts for the CLI
    Completion {
        /// The shell type for which to generate the completion script (e.g., bash, zsh, fish, powershell)
        #[arg(
            long,
            short,
            help = "The shell type for which to generate the completion script (e.g., bash, zsh, fish, powershell)"
        )]
        shell: clap_complete::Shell,
    },

    /// Generate a configuration file
    Config {
        /// Format of the configuration file to generate (yaml, json or toml). Defaults to yaml.
        #[arg(
            long,
            short,
            help = "Format of the configuration file to generate (yaml, json or toml). Defaults to yaml."
        )]
        format: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Completion { shell } => {
            commands::completion::write_completion(shell, &mut std::io::stdout());
            return Ok(());
        }
        Commands::Config { format } => {
            let format = format.unwrap_or_else(|| "yaml".to_string());
            return commands::config::generate_config(&format);
        }
        _ => {}
    }

    let config = ClientConfig::load_config(cli.config.as_deref())?;
    logging::initialize_tracing(&config);
    let output = commands::Output { json: cli.json };

    match cli.command {
        Commands::Session(command) => commands::session::run(command, &config, output).await,
        Commands::Users(command) => commands::users::run(command, &config, output).await,
        Commands::Areas(command) => commands::areas::run(command, &config, output).await,
        Commands::Projects(command) => commands::projects::run(command, &config, output).await,
        Commands::Health => commands::health::run(&config).await,
        Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
    }
}
