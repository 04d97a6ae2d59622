//! OpenRouter chat-completion client.
//!
//! One request, one response. No streaming and no retries; the reqwest
//! client carries a bounded timeout.

use crate::config::OpenRouterConfig;
use crate::model::{ChatCompletionRequest, ChatCompletionResponse};
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, instrument};

/// Message used when the upstream error carries none of its own
pub const GENERIC_FAILURE: &str = "Failed to generate Dockerfile";

/// Errors that can occur during a completion call
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Invalid response from completion API: {0}")]
    Decode(String),

    #[error("Completion API returned no choices")]
    EmptyResponse,
}

/// Something that can answer a chat completion request
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, CompletionError>;
}

/// `{"error": {"message": ...}}` as sent by OpenRouter on failure
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    error: Option<UpstreamErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorDetail {
    message: Option<String>,
}

/// Client for the OpenRouter chat completions endpoint
pub struct OpenRouterClient {
    client: reqwest::Client,
    base_url: String,
    site_url: String,
    app_title: String,
    timeout_secs: u64,
}

impl OpenRouterClient {
    pub fn new(config: &OpenRouterConfig) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(CompletionError::Network)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            site_url: config.site_url.clone(),
            app_title: config.app_title.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> CompletionError {
        if e.is_timeout() {
            CompletionError::Timeout(self.timeout_secs)
        } else {
            CompletionError::Network(e)
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenRouterClient {
    #[instrument(skip(self, api_key, request), fields(model = %request.model))]
    async fn complete(
        &self,
        api_key: &str,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, CompletionError> {
        debug!("Calling OpenRouter at {}", self.completions_url());

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", &self.app_title)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            error!("OpenRouter responded with {}", status);
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                message: upstream_error_message(&body),
            });
        }

        let completion: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| CompletionError::Decode(e.to_string()))?;

        if completion.choices.is_empty() {
            return Err(CompletionError::EmptyResponse);
        }

        Ok(completion)
    }
}

/// Pull `error.message` out of an upstream error body, falling back to a generic message
pub fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<UpstreamErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|d| d.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}
