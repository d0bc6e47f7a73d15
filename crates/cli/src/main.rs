mod commands;
mod render;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kanban_core::{load_config, validate_config, HttpTicketRepository, StaticUserDirectory};

use commands::{App, Command};

/// Kanban board client for the ticket tracker
#[derive(Debug, Parser)]
#[command(name = "kanban", version, about)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, env = "KANBAN_CONFIG", default_value = "kanban.toml")]
    config: PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stderr, so command output stays clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    debug!("Loading configuration from {:?}", cli.config);
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;
    debug!(backend = %config.backend.url, users = config.users.len(), "Configuration loaded");

    let repository = HttpTicketRepository::new(config.backend.clone())
        .context("Failed to create backend client")?;

    let app = App {
        repository: Arc::new(repository),
        users: StaticUserDirectory::from_config(&config.users),
        backend_url: config.backend.url.clone(),
        fixed_game_name: config.board.fixed_game_name.clone(),
        json: cli.json,
    };

    let output = app.run(cli.command).await?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("Failed to write output")?;
    if !output.ends_with('\n') {
        writeln!(stdout).context("Failed to write output")?;
    }
    Ok(())
}
