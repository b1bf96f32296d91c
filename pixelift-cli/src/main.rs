//! Pixelift CLI - Command-line interface
//!
//! This binary provides a command-line interface to the Pixelift library.

use clap::{Parser, Subcommand};

mod commands;
mod error;
mod runner;

use commands::config::ConfigCommands;
use commands::history::HistoryCommands;
use commands::upscale::UpscaleArgs;

#[derive(Parser)]
#[command(name = "pixelift")]
#[command(about = "Upscale images through the Pixelift service", long_about = None)]
struct Cli {
    /// Use the built-in offline client instead of the remote service
    #[arg(long, global = true)]
    offline: bool,

    /// Echo log output to the terminal
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upscale an image file
    Upscale(UpscaleArgs),
    /// Inspect and prune completed upscales
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Inspect and create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Show plan consumption for the current period
    Usage,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Upscale(args) => commands::upscale::run(args, cli.offline, cli.verbose).await,
        Commands::History { command } => {
            commands::history::run(command, cli.offline, cli.verbose).await
        }
        Commands::Config { command } => commands::config::run(command, cli.verbose),
        Commands::Usage => commands::usage::run(cli.offline, cli.verbose).await,
    };

    if let Err(e) = result {
        e.exit();
    }
}
