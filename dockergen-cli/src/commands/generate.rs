//! `dockergen generate` command - Run the generation chain for one repository

use anyhow::{bail, Result};
use dockergen_core::client::{GenerateEndpoint, HttpGenerateEndpoint, LocalGenerateEndpoint};
use dockergen_core::{
    Config, DockerfileGenerator, GenerationChain, GenerationSettings, GitHubClient,
    OpenRouterClient,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Where generation happens
pub enum Target {
    /// POST to a running Dockergen server
    Server(String),
    /// In this process, with the locally configured credential
    Local,
}

fn build_endpoint(config: &Config, target: Target) -> Result<Arc<dyn GenerateEndpoint>> {
    Ok(match target {
        Target::Server(url) => {
            info!("Using Dockergen server at {}", url);
            // The server waits on OpenRouter, so allow a little longer than its timeout.
            let timeout = config.openrouter.timeout() + config.github.timeout();
            Arc::new(HttpGenerateEndpoint::new(&url, timeout)?)
        }
        Target::Local => {
            let backend = Arc::new(OpenRouterClient::new(&config.openrouter)?);
            let generator = DockerfileGenerator::new(
                backend,
                config.openrouter.credential().map(str::to_string),
                GenerationSettings::from(&config.openrouter),
            );
            Arc::new(LocalGenerateEndpoint::new(generator))
        }
    })
}

pub async fn run(config: Config, url: &str, target: Target, out: &Path, print: bool) -> Result<()> {
    let metadata = Arc::new(GitHubClient::new(&config.github)?);
    let endpoint = build_endpoint(&config, target)?;
    let chain = GenerationChain::new(metadata, endpoint);

    println!("🔄 Generating Dockerfile for {}", url);

    let outcome = match chain.run(url).await {
        Ok(outcome) => outcome,
        Err(e) => bail!("{}", e),
    };

    println!(
        "📦 {} · {}{}",
        outcome.repo.name,
        outcome.repo.language,
        if outcome.repo.description.is_empty() {
            String::new()
        } else {
            format!(" · {}", outcome.repo.description)
        }
    );

    if print {
        println!("\n{}", "─".repeat(60));
        println!("{}", outcome.dockerfile);
        println!("{}", "─".repeat(60));
    } else {
        let path = outcome.save(out).await?;
        println!("✅ Dockerfile saved to: {}", path.display());
    }

    println!(
        "   Generated at {}",
        outcome.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    Ok(())
}
