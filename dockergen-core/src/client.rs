//! Client-side generation chain.
//!
//! Runs validate → fetch metadata → request generation for one repository URL,
//! tracking a small state machine and a busy flag that rejects re-entry while a
//! chain is in flight. There is no queue and no cancellation.

use crate::generate::DockerfileGenerator;
use crate::github::{GitHubError, RepoMetadataSource};
use crate::model::{ErrorBody, GenerationRequest, GenerationResponse, RepoMetadata};
use crate::server::GENERATE_PATH;
use crate::url::parse_repo_url;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Name of the file written by [`GenerationOutcome::save`]
pub const DOCKERFILE_NAME: &str = "Dockerfile";

/// Errors surfaced to the user, one per stage of the chain
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Invalid GitHub repository URL")]
    InvalidUrl,

    #[error("Repository not found or is private")]
    RepositoryNotFound(#[source] GitHubError),

    #[error("Failed to generate Dockerfile: {0}")]
    GenerationFailed(String),

    #[error("A generation is already in progress")]
    Busy,
}

/// Where the chain currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainState {
    Idle,
    Validating,
    FetchingMetadata,
    Generating,
    Succeeded,
    Failed,
}

impl ChainState {
    /// Whether a new chain may start from this state
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            ChainState::Idle | ChainState::Succeeded | ChainState::Failed
        )
    }
}

impl fmt::Display for ChainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChainState::Idle => "idle",
            ChainState::Validating => "validating",
            ChainState::FetchingMetadata => "fetching metadata",
            ChainState::Generating => "generating",
            ChainState::Succeeded => "succeeded",
            ChainState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Result of a successful chain
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub repo: RepoMetadata,
    /// Completion text with surrounding whitespace trimmed
    pub dockerfile: String,
    pub generated_at: DateTime<Utc>,
}

impl GenerationOutcome {
    pub fn new(repo: RepoMetadata, raw: &str) -> Self {
        Self {
            repo,
            dockerfile: raw.trim().to_string(),
            generated_at: Utc::now(),
        }
    }

    /// Write the Dockerfile into `dir`, returning the file path
    pub async fn save(&self, dir: &Path) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(DOCKERFILE_NAME);
        tokio::fs::write(&path, self.dockerfile.as_bytes()).await?;
        Ok(path)
    }
}

/// Something that turns repository metadata into Dockerfile text
#[async_trait]
pub trait GenerateEndpoint: Send + Sync {
    /// Returns the raw Dockerfile text, or a user-facing failure message
    async fn generate(&self, repo: &RepoMetadata) -> Result<String, String>;
}

/// Calls a running Dockergen server over HTTP
pub struct HttpGenerateEndpoint {
    client: reqwest::Client,
    url: String,
}

impl HttpGenerateEndpoint {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: format!("{}{}", server_url.trim_end_matches('/'), GENERATE_PATH),
        })
    }
}

#[async_trait]
impl GenerateEndpoint for HttpGenerateEndpoint {
    async fn generate(&self, repo: &RepoMetadata) -> Result<String, String> {
        let response = self
            .client
            .post(&self.url)
            .json(&GenerationRequest::new(repo.clone()))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string())?;

        if status.is_success() {
            serde_json::from_str::<GenerationResponse>(&body)
                .map(|r| r.dockerfile)
                .map_err(|e| format!("invalid response from server: {e}"))
        } else {
            Err(serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("server responded with {status}")))
        }
    }
}

/// Runs generation in-process without a server
pub struct LocalGenerateEndpoint {
    generator: DockerfileGenerator,
}

impl LocalGenerateEndpoint {
    pub fn new(generator: DockerfileGenerator) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl GenerateEndpoint for LocalGenerateEndpoint {
    async fn generate(&self, repo: &RepoMetadata) -> Result<String, String> {
        self.generator
            .generate(Some(repo.clone()))
            .await
            .map_err(|e| e.to_string())
    }
}

/// Clears the busy flag when the chain ends, however it ends
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct GenerationChain {
    metadata: Arc<dyn RepoMetadataSource>,
    endpoint: Arc<dyn GenerateEndpoint>,
    busy: AtomicBool,
    state: RwLock<ChainState>,
}

impl GenerationChain {
    pub fn new(metadata: Arc<dyn RepoMetadataSource>, endpoint: Arc<dyn GenerateEndpoint>) -> Self {
        Self {
            metadata,
            endpoint,
            busy: AtomicBool::new(false),
            state: RwLock::new(ChainState::Idle),
        }
    }

    pub async fn state(&self) -> ChainState {
        *self.state.read().await
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    async fn transition(&self, next: ChainState) {
        let mut state = self.state.write().await;
        debug!("chain: {} -> {}", *state, next);
        *state = next;
    }

    /// Run the whole chain for `url`
    #[instrument(skip(self))]
    pub async fn run(&self, url: &str) -> Result<GenerationOutcome, ChainError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ChainError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let result = self.run_stages(url).await;
        match &result {
            Ok(outcome) => {
                info!(repo = %outcome.repo.name, "Dockerfile ready");
                self.transition(ChainState::Succeeded).await;
            }
            Err(e) => {
                warn!("Generation chain failed: {}", e);
                self.transition(ChainState::Failed).await;
            }
        }
        result
    }

    async fn run_stages(&self, url: &str) -> Result<GenerationOutcome, ChainError> {
        self.transition(ChainState::Validating).await;
        let reference = parse_repo_url(url).ok_or(ChainError::InvalidUrl)?;

        self.transition(ChainState::FetchingMetadata).await;
        let repo = self
            .metadata
            .fetch(&reference)
            .await
            .map_err(ChainError::RepositoryNotFound)?;

        self.transition(ChainState::Generating).await;
        let raw = self
            .endpoint
            .generate(&repo)
            .await
            .map_err(ChainError::GenerationFailed)?;

        Ok(GenerationOutcome::new(repo, &raw))
    }
}
