//! `dockergen serve` command - Start the web server

use anyhow::Result;
use dockergen_core::{server, Config};
use std::sync::Arc;
use tracing::{info, warn};

pub async fn run(config: Config) -> Result<()> {
    info!("Starting Dockergen server...");

    if config.openrouter.credential().is_none() {
        warn!("OPENROUTER_API_KEY is not set; generation requests will fail until it is");
        eprintln!("⚠️  Warning: no OpenRouter API key configured.");
        eprintln!("   Set OPENROUTER_API_KEY or add api_key under [openrouter] in the config file.");
    }

    let url = config.server_url();
    let state = Arc::new(server::AppState::from_config(config)?);

    println!("🚀 Dockergen server starting on {}", url);
    println!("   Web app:             {}/", url);
    println!(
        "   Generation endpoint: {}{}",
        url,
        server::GENERATE_PATH
    );
    println!("   Press Ctrl+C to stop");

    server::start_server(state).await?;

    Ok(())
}
