//! Dockergen CLI
//!
//! Serves the Dockerfile generator web app, or runs a generation from the
//! command line and saves the result as a `Dockerfile`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dockergen_core::Config;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Dockergen - Dockerfiles for GitHub repositories
#[derive(Parser)]
#[command(name = "dockergen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model to use (overrides config)
    #[arg(short, long, global = true, env = "DOCKERGEN_MODEL")]
    model: Option<String>,

    /// Server port (overrides config)
    #[arg(long, global = true, env = "DOCKERGEN_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "DOCKERGEN_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve,

    /// Generate a Dockerfile for a GitHub repository
    Generate {
        /// Repository URL, e.g. https://github.com/octocat/Hello-World
        url: String,

        /// Directory to write the Dockerfile into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,

        /// Generate in-process instead of calling a running server
        #[arg(long)]
        local: bool,

        /// Server URL (defaults to the configured server)
        #[arg(long, conflicts_with = "local")]
        server: Option<String>,

        /// Print the Dockerfile instead of writing it
        #[arg(long)]
        print: bool,
    },

    /// Check server status
    Status,

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Initialize default configuration
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = if let Some(path) = &cli.config {
        Config::load_from_file(path)?
    } else {
        let (config, error) = Config::load_lenient();
        if let Some(e) = error {
            eprintln!("⚠️  Ignoring config file: {}", e);
        }
        config
    };

    // Apply CLI overrides
    if let Some(model) = &cli.model {
        config.openrouter.model = model.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    init_logging(&config.logging.level);
    config.validate()?;

    match cli.command {
        Commands::Serve => commands::serve::run(config).await,
        Commands::Generate {
            url,
            out,
            local,
            server,
            print,
        } => {
            let target = if local {
                commands::generate::Target::Local
            } else {
                commands::generate::Target::Server(server.unwrap_or_else(|| config.server_url()))
            };
            commands::generate::run(config, &url, target, &out, print).await
        }
        Commands::Status => commands::status::run(config).await,
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show => commands::config::show(config, cli.config.as_deref()),
            ConfigCommands::Init { force } => commands::config::init(cli.config.as_deref(), force),
        },
    }
}
