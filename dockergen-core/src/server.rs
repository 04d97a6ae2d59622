//! HTTP server for Dockergen.
//!
//! Serves the browser form at `/` and the stateless generation endpoint at
//! `POST /api/generate-dockerfile`. The OpenRouter credential lives only in
//! [`AppState`]; clients never send or receive it.

use crate::config::Config;
use crate::generate::{DockerfileGenerator, GenerateError, GenerationSettings};
use crate::model::{ErrorBody, GenerationRequest, GenerationResponse, HealthResponse};
use crate::openrouter::{CompletionError, OpenRouterClient};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument, warn};
use utoipa::OpenApi;

/// Path of the generation endpoint
pub const GENERATE_PATH: &str = "/api/generate-dockerfile";

/// OpenAPI documentation for the Dockergen API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dockergen API",
        version = "0.1.0",
        description = "Generates a Dockerfile for a GitHub repository from its metadata \
                       using an OpenRouter-hosted language model.",
        license(name = "MIT")
    ),
    paths(generate_dockerfile, health_check),
    components(schemas(
        crate::model::RepoMetadata,
        crate::model::GenerationRequest,
        crate::model::GenerationResponse,
        crate::model::ErrorBody,
        crate::model::HealthResponse,
    )),
    tags(
        (name = "Generation", description = "Dockerfile generation"),
        (name = "Health", description = "Server health and status")
    )
)]
pub struct ApiDoc;

/// Shared application state
pub struct AppState {
    pub generator: DockerfileGenerator,
    pub config: Config,
}

impl AppState {
    pub fn new(generator: DockerfileGenerator, config: Config) -> Self {
        Self { generator, config }
    }

    /// Build state backed by the real OpenRouter client.
    ///
    /// A missing API key is not an error here; it is reported per request.
    pub fn from_config(config: Config) -> Result<Self, CompletionError> {
        let backend = Arc::new(OpenRouterClient::new(&config.openrouter)?);
        let generator = DockerfileGenerator::new(
            backend,
            config.openrouter.credential().map(str::to_string),
            GenerationSettings::from(&config.openrouter),
        );
        Ok(Self::new(generator, config))
    }
}

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route(
            GENERATE_PATH,
            post(generate_dockerfile).fallback(method_not_allowed),
        )
        .route("/health", get(health_check))
        .route("/openapi.json", get(openapi_json))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Browser form
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server health status", body = HealthResponse)
    )
)]
async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let credential_configured = state.generator.has_credential();
    Json(HealthResponse {
        status: if credential_configured { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        credential_configured,
        model: state.generator.settings().model.clone(),
    })
}

/// Generate a Dockerfile for the given repository metadata
#[utoipa::path(
    post,
    path = "/api/generate-dockerfile",
    tag = "Generation",
    request_body = GenerationRequest,
    responses(
        (status = 200, description = "Generated Dockerfile", body = GenerationResponse),
        (status = 400, description = "Missing repository information", body = ErrorBody),
        (status = 405, description = "Method not allowed", body = ErrorBody),
        (status = 500, description = "Missing credential or upstream failure", body = ErrorBody)
    )
)]
#[instrument(skip(state, payload))]
async fn generate_dockerfile(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResponse>, AppError> {
    let repo_info = match payload {
        Ok(Json(request)) => request.repo_info,
        Err(rejection) => {
            debug!("Rejected generation payload: {}", rejection.body_text());
            None
        }
    };

    let dockerfile = state.generator.generate(repo_info).await?;

    info!("Generation request served");
    Ok(Json(GenerationResponse { dockerfile }))
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(ErrorBody::new("Method not allowed")),
    )
        .into_response()
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    InvalidRequest(String),
    ConfigurationError(String),
    UpstreamError(String),
    InternalError(String),
}

impl From<GenerateError> for AppError {
    fn from(e: GenerateError) -> Self {
        match e {
            GenerateError::MissingRepoInfo => AppError::InvalidRequest(e.to_string()),
            GenerateError::MissingCredential => AppError::ConfigurationError(e.to_string()),
            GenerateError::Upstream(message) => AppError::UpstreamError(message),
            GenerateError::Prompt(_) => AppError::InternalError(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ConfigurationError(msg) => {
                error!("Server misconfigured: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::UpstreamError(msg) => {
                warn!("Upstream generation failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::InternalError(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(ErrorBody::new(message))).into_response()
    }
}

/// Start the HTTP server, stopping on Ctrl+C
pub async fn start_server(state: Arc<AppState>) -> Result<(), std::io::Error> {
    let addr = state.config.server_addr();
    let router = create_router(state);

    info!("Starting Dockergen server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Browser form: validate, fetch metadata from GitHub, post to the endpoint, show and download
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Dockerfile Generator</title>
    <style>
        :root {
            --bg-primary: #0d1117;
            --bg-secondary: #161b22;
            --border-color: #30363d;
            --text-primary: #e6edf3;
            --text-secondary: #8b949e;
            --accent-cyan: #58a6ff;
            --accent-green: #3fb950;
            --accent-red: #f85149;
        }
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-primary);
            color: var(--text-primary);
            min-height: 100vh;
        }
        .container { max-width: 880px; margin: 0 auto; padding: 40px 20px; }
        h1 { font-size: 1.75rem; margin-bottom: 8px; }
        .subtitle { color: var(--text-secondary); margin-bottom: 24px; }
        .card {
            background: var(--bg-secondary);
            border: 1px solid var(--border-color);
            border-radius: 8px;
            padding: 20px;
            margin-bottom: 20px;
        }
        form { display: flex; gap: 12px; }
        input {
            flex: 1;
            padding: 10px 12px;
            border-radius: 6px;
            border: 1px solid var(--border-color);
            background: var(--bg-primary);
            color: var(--text-primary);
            font-size: 0.95rem;
        }
        button {
            padding: 10px 18px;
            border-radius: 6px;
            border: none;
            background: var(--accent-cyan);
            color: var(--bg-primary);
            font-weight: 600;
            cursor: pointer;
        }
        button:disabled { opacity: 0.5; cursor: wait; }
        .meta { color: var(--text-secondary); margin-bottom: 12px; font-size: 0.9rem; }
        .meta strong { color: var(--text-primary); }
        pre {
            background: var(--bg-primary);
            border: 1px solid var(--border-color);
            border-radius: 6px;
            padding: 16px;
            overflow-x: auto;
            font-size: 0.85rem;
            white-space: pre;
        }
        .actions { display: flex; justify-content: flex-end; margin-top: 12px; }
        .hidden { display: none; }
        #toast {
            position: fixed;
            bottom: 24px;
            right: 24px;
            padding: 12px 18px;
            border-radius: 6px;
            background: var(--bg-secondary);
            border: 1px solid var(--border-color);
            opacity: 0;
            transition: opacity 0.2s;
        }
        #toast.show { opacity: 1; }
        #toast.error { border-color: var(--accent-red); color: var(--accent-red); }
        #toast.success { border-color: var(--accent-green); color: var(--accent-green); }
    </style>
</head>
<body>
    <div class="container">
        <h1>Dockerfile Generator</h1>
        <p class="subtitle">Paste a GitHub repository URL to generate a production-ready Dockerfile.</p>

        <div class="card">
            <form id="generate-form">
                <input id="repo-url" type="text" placeholder="https://github.com/owner/repo" autocomplete="off">
                <button id="generate-btn" type="submit">Generate</button>
            </form>
        </div>

        <div id="result" class="card hidden">
            <div class="meta">
                <strong id="repo-name"></strong> · <span id="repo-language"></span>
                <div id="repo-description"></div>
            </div>
            <pre id="dockerfile"></pre>
            <div class="actions">
                <button id="download-btn" type="button">Download Dockerfile</button>
            </div>
        </div>
    </div>
    <div id="toast"></div>

    <script>
        const REPO_URL = /^https:\/\/github\.com\/([A-Za-z0-9_-]+)\/([A-Za-z0-9_-]+)(?:\.git)?\/?$/;
        let busy = false;
        let dockerfile = '';

        function toast(message, kind) {
            const el = document.getElementById('toast');
            el.textContent = message;
            el.className = 'show ' + kind;
            clearTimeout(el._timer);
            el._timer = setTimeout(() => { el.className = ''; }, 4000);
        }

        function setBusy(value) {
            busy = value;
            const btn = document.getElementById('generate-btn');
            btn.disabled = value;
            btn.textContent = value ? 'Generating…' : 'Generate';
        }

        async function generate(url) {
            const match = REPO_URL.exec(url);
            if (!match) {
                toast('Invalid GitHub repository URL', 'error');
                return;
            }
            const [, owner, repo] = match;

            const ghResponse = await fetch(`https://api.github.com/repos/${owner}/${repo}`);
            if (!ghResponse.ok) {
                toast('Repository not found or is private', 'error');
                return;
            }
            const gh = await ghResponse.json();
            const repoInfo = {
                name: gh.full_name,
                language: gh.language || 'Unknown',
                description: gh.description || ''
            };

            const response = await fetch('/api/generate-dockerfile', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ repoInfo })
            });
            const body = await response.json().catch(() => ({}));
            if (!response.ok) {
                toast('Failed to generate Dockerfile: ' + (body.error || response.statusText), 'error');
                return;
            }

            dockerfile = (body.dockerfile || '').trim();
            document.getElementById('repo-name').textContent = repoInfo.name;
            document.getElementById('repo-language').textContent = repoInfo.language;
            document.getElementById('repo-description').textContent = repoInfo.description;
            document.getElementById('dockerfile').textContent = dockerfile;
            document.getElementById('result').classList.remove('hidden');
            toast('Dockerfile generated', 'success');
        }

        document.getElementById('generate-form').addEventListener('submit', async (event) => {
            event.preventDefault();
            if (busy) return;
            setBusy(true);
            try {
                await generate(document.getElementById('repo-url').value);
            } catch (err) {
                toast('Failed to generate Dockerfile: ' + err.message, 'error');
            } finally {
                setBusy(false);
            }
        });

        document.getElementById('download-btn').addEventListener('click', () => {
            const blob = new Blob([dockerfile], { type: 'text/plain' });
            const href = URL.createObjectURL(blob);
            const link = document.createElement('a');
            link.href = href;
            link.download = 'Dockerfile';
            document.body.appendChild(link);
            link.click();
            link.remove();
            URL.revokeObjectURL(href);
        });
    </script>
</body>
</html>
"#;

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::generate::tests::{hello_world, MockBackend};
    use crate::model::GenerationRequest;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    pub(crate) fn state_with(backend: Arc<MockBackend>, key: Option<&str>) -> Arc<AppState> {
        let generator = DockerfileGenerator::new(
            backend,
            key.map(str::to_string),
            GenerationSettings::default(),
        );
        Arc::new(AppState::new(generator, Config::default()))
    }

    /// Serve `router` on an ephemeral local port, returning its base URL
    pub(crate) async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}", addr)
    }

    fn post_json(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(GENERATE_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn send(state: Arc<AppState>, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = create_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn hello_world_body() -> String {
        serde_json::to_string(&GenerationRequest::new(hello_world())).unwrap()
    }

    #[tokio::test]
    async fn test_generate_success() {
        let backend = Arc::new(MockBackend::replying("\nFROM ruby:3.3-slim\n"));
        let state = state_with(backend.clone(), Some("sk-or-test"));

        let (status, body) = send(state, post_json(hello_world_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dockerfile"], "\nFROM ruby:3.3-slim\n");
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_wrong_method_is_rejected_without_model_call() {
        let backend = Arc::new(MockBackend::replying("FROM scratch"));
        let state = state_with(backend.clone(), Some("sk-or-test"));

        for method in ["GET", "PUT", "DELETE", "PATCH"] {
            let request = Request::builder()
                .method(method)
                .uri(GENERATE_PATH)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(hello_world_body()))
                .unwrap();
            let (status, body) = send(state.clone(), request).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "method {method}");
            assert_eq!(body["error"], "Method not allowed");
        }
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_payload_is_bad_request() {
        let backend = Arc::new(MockBackend::replying("FROM scratch"));
        let state = state_with(backend.clone(), Some("sk-or-test"));

        for body in ["", "{}", "not json", r#"{"repoInfo": null}"#] {
            let (status, json) = send(state.clone(), post_json(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
            assert_eq!(json["error"], "Repository information is required");
        }
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_credential_is_server_error() {
        let backend = Arc::new(MockBackend::replying("FROM scratch"));
        let state = state_with(backend.clone(), None);

        let (status, body) = send(state, post_json(hello_world_body())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "OpenRouter API key not configured");
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_forwards_message() {
        let backend = Arc::new(MockBackend::failing(401, "No auth credentials found"));
        let state = state_with(backend, Some("sk-or-revoked"));

        let (status, body) = send(state, post_json(hello_world_body())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "No auth credentials found");
    }

    #[tokio::test]
    async fn test_health_reports_credential() {
        let backend = Arc::new(MockBackend::replying("FROM scratch"));

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(state_with(backend.clone(), None), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["credential_configured"], false);

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (_, body) = send(state_with(backend, Some("sk-or-test")), request).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], "meta-llama/llama-3.1-8b-instruct:free");
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let backend = Arc::new(MockBackend::replying("FROM scratch"));
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = create_router(state_with(backend, None))
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains(GENERATE_PATH));
        assert!(html.contains("link.download = 'Dockerfile'"));
        assert!(!html.contains("OPENROUTER_API_KEY"));
    }

    #[tokio::test]
    async fn test_openapi_lists_endpoint() {
        let backend = Arc::new(MockBackend::replying("FROM scratch"));
        let request = Request::builder()
            .uri("/openapi.json")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(state_with(backend, None), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"][GENERATE_PATH]["post"].is_object());
    }
}
