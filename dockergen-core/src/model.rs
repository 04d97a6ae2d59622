//! Shared data models for Dockergen.
//!
//! This module contains the wire types of the generation endpoint and
//! the OpenAI-compatible chat completion shapes spoken to OpenRouter.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Placeholder used when GitHub reports no primary language
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Repository metadata as shown to the user and embedded in the prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RepoMetadata {
    /// Full "owner/repo" name
    pub name: String,
    #[serde(default = "unknown_language")]
    pub language: String,
    #[serde(default)]
    pub description: String,
}

fn unknown_language() -> String {
    UNKNOWN_LANGUAGE.to_string()
}

impl RepoMetadata {
    pub fn new(
        name: impl Into<String>,
        language: Option<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            language: language.unwrap_or_else(unknown_language),
            description: description.unwrap_or_default(),
        }
    }
}

/// Body of `POST /api/generate-dockerfile`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerationRequest {
    #[serde(rename = "repoInfo", default)]
    pub repo_info: Option<RepoMetadata>,
}

impl GenerationRequest {
    pub fn new(repo_info: RepoMetadata) -> Self {
        Self {
            repo_info: Some(repo_info),
        }
    }
}

/// Successful response of the generation endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerationResponse {
    /// Raw completion text, untrimmed
    pub dockerfile: String,
}

/// Error body returned by every non-200 response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// OpenAI-compatible chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// OpenAI-compatible chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// OpenAI-compatible chat completion response.
///
/// Only the fields Dockergen reads are modelled; OpenRouter sends more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if any
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// Choice in a chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub credential_configured: bool,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_metadata_placeholders() {
        let meta = RepoMetadata::new("octocat/Hello-World", None, None);
        assert_eq!(meta.language, "Unknown");
        assert_eq!(meta.description, "");
    }

    #[test]
    fn test_generation_request_wire_name() {
        let req = GenerationRequest::new(RepoMetadata::new(
            "octocat/Hello-World",
            Some("Ruby".to_string()),
            Some("My first repository".to_string()),
        ));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["repoInfo"]["name"], "octocat/Hello-World");
        assert_eq!(json["repoInfo"]["language"], "Ruby");
    }

    #[test]
    fn test_generation_request_without_repo_info() {
        let req: GenerationRequest = serde_json::from_str("{}").unwrap();
        assert!(req.repo_info.is_none());
    }

    #[test]
    fn test_completion_response_tolerates_extra_fields() {
        let body = r#"{
            "id": "gen-123",
            "provider": "Meta",
            "model": "meta-llama/llama-3.1-8b-instruct:free",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "FROM ruby:3.3"}, "finish_reason": "stop"}
            ]
        }"#;
        let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.first_content(), Some("FROM ruby:3.3"));
    }

    #[test]
    fn test_error_body_shape() {
        let json = serde_json::to_string(&ErrorBody::new("Method not allowed")).unwrap();
        assert_eq!(json, r#"{"error":"Method not allowed"}"#);
    }
}
