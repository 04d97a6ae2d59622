//! Dockerfile generation.
//!
//! [`DockerfileGenerator`] holds everything a generation needs: the completion
//! backend, the server-side credential and the fixed request settings. All of
//! it is injected at construction so tests can swap any piece.

use crate::config::OpenRouterConfig;
use crate::model::{ChatCompletionRequest, ChatMessage, RepoMetadata};
use crate::openrouter::{CompletionBackend, CompletionError, GENERIC_FAILURE};
use crate::prompt::{build_prompt, PromptError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Errors a generation can end with
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Repository information is required")]
    MissingRepoInfo,

    #[error("OpenRouter API key not configured")]
    MissingCredential,

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("{0}")]
    Upstream(String),
}

impl From<CompletionError> for GenerateError {
    fn from(e: CompletionError) -> Self {
        match e {
            CompletionError::Upstream { message, .. } => GenerateError::Upstream(message),
            CompletionError::Timeout(_) => GenerateError::Upstream(e.to_string()),
            CompletionError::EmptyResponse => GenerateError::Upstream(GENERIC_FAILURE.to_string()),
            CompletionError::Network(_) | CompletionError::Decode(_) => {
                GenerateError::Upstream(format!("{GENERIC_FAILURE}: {e}"))
            }
        }
    }
}

/// Fixed parameters of every completion request
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&OpenRouterConfig> for GenerationSettings {
    fn from(config: &OpenRouterConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        (&OpenRouterConfig::default()).into()
    }
}

pub struct DockerfileGenerator {
    backend: Arc<dyn CompletionBackend>,
    api_key: Option<String>,
    settings: GenerationSettings,
}

impl DockerfileGenerator {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        api_key: Option<String>,
        settings: GenerationSettings,
    ) -> Self {
        let api_key = api_key.filter(|k| !k.trim().is_empty());
        Self {
            backend,
            api_key,
            settings,
        }
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Build the single-message completion request for a repository
    pub fn completion_request(
        &self,
        repo: &RepoMetadata,
    ) -> Result<ChatCompletionRequest, GenerateError> {
        Ok(ChatCompletionRequest {
            model: self.settings.model.clone(),
            messages: vec![ChatMessage::user(build_prompt(repo)?)],
            temperature: Some(self.settings.temperature),
            max_tokens: Some(self.settings.max_tokens),
        })
    }

    /// Generate a Dockerfile for `repo`, returning the first completion's raw text
    #[instrument(
        skip(self, repo),
        fields(generation_id = %Uuid::new_v4(), repo_name = repo.as_ref().map(|r| r.name.as_str()).unwrap_or(""))
    )]
    pub async fn generate(&self, repo: Option<RepoMetadata>) -> Result<String, GenerateError> {
        let repo = repo
            .filter(|r| !r.name.trim().is_empty())
            .ok_or(GenerateError::MissingRepoInfo)?;

        let Some(api_key) = self.api_key.as_deref() else {
            warn!("Generation requested but no OpenRouter API key is configured");
            return Err(GenerateError::MissingCredential);
        };

        let request = self.completion_request(&repo)?;
        let response = self.backend.complete(api_key, &request).await?;

        let text = response
            .first_content()
            .ok_or_else(|| GenerateError::Upstream(GENERIC_FAILURE.to_string()))?
            .to_string();

        info!(chars = text.len(), "Dockerfile generated");
        Ok(text)
    }
}
