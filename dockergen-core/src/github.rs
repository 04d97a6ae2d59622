//! GitHub repository metadata lookup.
//!
//! A single unauthenticated read of `GET /repos/{owner}/{repo}`. No retries,
//! no pagination and no rate-limit handling.

use crate::config::GitHubConfig;
use crate::model::RepoMetadata;
use crate::url::RepoReference;
use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors that can occur when looking up repository metadata
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("Repository {reference} not found or is private (HTTP {status})")]
    NotFound {
        reference: RepoReference,
        status: u16,
    },

    #[error("Network error talking to GitHub: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected response from GitHub: {0}")]
    Decode(String),
}

/// Source of repository metadata
#[async_trait]
pub trait RepoMetadataSource: Send + Sync {
    async fn fetch(&self, reference: &RepoReference) -> Result<RepoMetadata, GitHubError>;
}

/// The subset of GitHub's repository object Dockergen reads
#[derive(Debug, Deserialize)]
struct GitHubRepoResponse {
    full_name: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl From<GitHubRepoResponse> for RepoMetadata {
    fn from(repo: GitHubRepoResponse) -> Self {
        RepoMetadata::new(repo.full_name, repo.language, repo.description)
    }
}

/// Client for the GitHub REST API
pub struct GitHubClient {
    client: reqwest::Client,
    api_base: String,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn repo_url(&self, reference: &RepoReference) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_base, reference.owner, reference.repo
        )
    }
}

#[async_trait]
impl RepoMetadataSource for GitHubClient {
    #[instrument(skip(self), fields(repo = %reference))]
    async fn fetch(&self, reference: &RepoReference) -> Result<RepoMetadata, GitHubError> {
        let url = self.repo_url(reference);
        debug!("Fetching repository metadata from {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("GitHub responded with {}", status);
            return Err(GitHubError::NotFound {
                reference: reference.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_repo_response(&body)
    }
}

fn parse_repo_response(body: &str) -> Result<RepoMetadata, GitHubError> {
    let repo: GitHubRepoResponse =
        serde_json::from_str(body).map_err(|e| GitHubError::Decode(e.to_string()))?;

    if repo.full_name.trim().is_empty() {
        return Err(GitHubError::Decode(
            "repository full_name is empty".to_string(),
        ));
    }

    Ok(repo.into())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::server::tests::serve;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    async fn fake_repo(
        axum::extract::Path((owner, repo)): axum::extract::Path<(String, String)>,
        headers: HeaderMap,
    ) -> Response {
        if !headers.contains_key(header::USER_AGENT) {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({"message": "Request forbidden by administrative rules"})),
            )
                .into_response();
        }
        match (owner.as_str(), repo.as_str()) {
            ("octocat", "Hello-World") => Json(json!({
                "full_name": "octocat/Hello-World",
                "language": "Ruby",
                "description": "My first repository"
            }))
            .into_response(),
            ("octocat", "empty") => Json(json!({
                "full_name": "octocat/empty",
                "language": null,
                "description": null
            }))
            .into_response(),
            _ => (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))).into_response(),
        }
    }

    /// Local stand-in for `api.github.com`, returning its base URL
    pub(crate) async fn fake_github() -> String {
        serve(Router::new().route("/repos/:owner/:repo", get(fake_repo))).await
    }

    pub(crate) fn github_client(api_base: &str) -> GitHubClient {
        GitHubClient::new(&GitHubConfig {
            api_base: api_base.to_string(),
            ..GitHubConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_parse_full_response() {
        let body = r#"{
            "id": 1296269,
            "name": "Hello-World",
            "full_name": "octocat/Hello-World",
            "language": "Ruby",
            "description": "My first repository",
            "private": false
        }"#;
        let meta = parse_repo_response(body).unwrap();
        assert_eq!(
            meta,
            RepoMetadata {
                name: "octocat/Hello-World".to_string(),
                language: "Ruby".to_string(),
                description: "My first repository".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_null_language_and_description() {
        let body = r#"{"full_name": "octocat/empty", "language": null, "description": null}"#;
        let meta = parse_repo_response(body).unwrap();
        assert_eq!(meta.language, "Unknown");
        assert_eq!(meta.description, "");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_repo_response("<html>rate limited</html>"),
            Err(GitHubError::Decode(_))
        ));
        assert!(matches!(
            parse_repo_response(r#"{"full_name": ""}"#),
            Err(GitHubError::Decode(_))
        ));
    }

    #[test]
    fn test_repo_url_trims_trailing_slash() {
        let config = GitHubConfig {
            api_base: "https://ghe.example.com/api/v3/".to_string(),
            ..GitHubConfig::default()
        };
        let client = GitHubClient::new(&config).unwrap();
        assert_eq!(
            client.repo_url(&RepoReference::new("octocat", "Hello-World")),
            "https://ghe.example.com/api/v3/repos/octocat/Hello-World"
        );
    }

    #[tokio::test]
    async fn test_fetch_over_http() {
        let client = github_client(&fake_github().await);

        let meta = client
            .fetch(&RepoReference::new("octocat", "Hello-World"))
            .await
            .unwrap();
        assert_eq!(meta.name, "octocat/Hello-World");
        assert_eq!(meta.language, "Ruby");
        assert_eq!(meta.description, "My first repository");

        let meta = client
            .fetch(&RepoReference::new("octocat", "empty"))
            .await
            .unwrap();
        assert_eq!(meta.language, "Unknown");
        assert_eq!(meta.description, "");
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_not_found() {
        let client = github_client(&fake_github().await);

        let err = client
            .fetch(&RepoReference::new("octocat", "missing"))
            .await
            .unwrap_err();
        match err {
            GitHubError::NotFound { reference, status } => {
                assert_eq!(reference, RepoReference::new("octocat", "missing"));
                assert_eq!(status, 404);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_not_found_message() {
        let err = GitHubError::NotFound {
            reference: RepoReference::new("octocat", "missing"),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Repository octocat/missing not found or is private (HTTP 404)"
        );
    }
}
