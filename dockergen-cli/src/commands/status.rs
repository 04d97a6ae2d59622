//! `dockergen status` command - Check server status

use anyhow::Result;
use dockergen_core::{Config, HealthResponse};
use std::time::Duration;

pub async fn run(config: Config) -> Result<()> {
    let url = format!("{}/health", config.server_url());

    println!("Checking Dockergen server status...");
    println!("URL: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => {
            let health: HealthResponse = response.json().await?;

            println!("\n✅ Dockergen server is running");
            println!("   Status:          {}", health.status);
            println!("   Version:         {}", health.version);
            println!("   Model:           {}", health.model);
            println!(
                "   API key:         {}",
                if health.credential_configured {
                    "configured ✓"
                } else {
                    "missing ⚠"
                }
            );
        }
        Ok(response) => {
            println!(
                "\n⚠️  Dockergen server responded with status: {}",
                response.status()
            );
        }
        Err(_) => {
            println!("\n❌ Dockergen server is not running");
            println!("   Start it with: dockergen serve");
        }
    }

    Ok(())
}
