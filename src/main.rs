mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use invite_core::InviteConfig;
use tracing_subscriber::EnvFilter;

use commands::{new::NewArgs, render::RenderArgs};

/// Environment variable holding the log filter
const LOG_ENV: &str = "INVITE_LOG";

#[derive(Parser)]
#[command(name = "invite")]
#[command(about = "Build single-event calendar invitations (.ics)", version)]
struct Cli {
    /// Config file to use instead of ~/.config/invite/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an invitation from command-line flags
    New(NewArgs),
    /// Create an invitation from a JSON property file
    Render(RenderArgs),
    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Write a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the config file location
    Path,
}

fn main() -> Result<()> {
    setup_logging();

    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => InviteConfig::config_path()?,
    };

    match cli.command {
        Commands::New(args) => commands::new::run(args, &InviteConfig::load_from(&config_path)?),
        Commands::Render(args) => {
            commands::render::run(args, &InviteConfig::load_from(&config_path)?)
        }
        Commands::Config { command } => match command {
            ConfigCommand::Init { force } => commands::config::init(&config_path, force),
            ConfigCommand::Path => {
                println!("{}", config_path.display());
                Ok(())
            }
        },
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("invite=info,invite_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
