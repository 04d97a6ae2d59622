//! Configuration management for Dockergen.
//!
//! Configuration is loaded in order of precedence:
//! 1. Defaults
//! 2. Config file (~/.dockergen/config.toml)
//! 3. Environment variables
//! 4. CLI flags (handled at CLI layer)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// OpenRouter completion API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Server-held API key. Never sent to or accepted from clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every completion request
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_openrouter_timeout")]
    pub timeout_secs: u64,

    /// Public site URL, sent as the HTTP-Referer header
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Application name, sent as the X-Title header
    #[serde(default = "default_app_title")]
    pub app_title: String,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "meta-llama/llama-3.1-8b-instruct:free".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_openrouter_timeout() -> u64 {
    60
}

fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_app_title() -> String {
    "Dockerfile Generator".to_string()
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_openrouter_timeout(),
            site_url: default_site_url(),
            app_title: default_app_title(),
        }
    }
}

impl OpenRouterConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The API key, if one is configured and non-blank
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// GitHub REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_github_api")]
    pub api_base: String,

    /// GitHub rejects requests without a User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_github_timeout")]
    pub timeout_secs: u64,
}

fn default_github_api() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    format!("dockergen/{}", env!("CARGO_PKG_VERSION"))
}

fn default_github_timeout() -> u64 {
    15
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_github_api(),
            user_agent: default_user_agent(),
            timeout_secs: default_github_timeout(),
        }
    }
}

impl GitHubConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Returns the default Dockergen configuration directory (~/.dockergen)
    pub fn dockergen_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".dockergen"))
    }

    /// Returns the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        Self::dockergen_dir().map(|d| d.join("config.toml"))
    }

    /// Load configuration from a specific file, then apply environment overrides
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from the default path with environment overrides.
    ///
    /// A config file that cannot be read or parsed is skipped instead of
    /// failing. Environment overrides apply either way; the file error is
    /// returned alongside so the caller can report it.
    pub fn load_lenient() -> (Self, Option<ConfigError>) {
        Self::load_lenient_with(
            Self::default_config_path().as_deref(),
            |key| std::env::var(key).ok(),
        )
    }

    fn load_lenient_with<F>(path: Option<&Path>, lookup: F) -> (Self, Option<ConfigError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let (mut config, error) = match path.filter(|p| p.exists()) {
            Some(path) => match Self::read_file(path) {
                Ok(config) => (config, None),
                Err(e) => (Config::default(), Some(e)),
            },
            None => (Config::default(), None),
        };

        config.apply_overrides(lookup);

        (config, error)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENROUTER_API_KEY") {
            self.openrouter.api_key = Some(key);
        }

        if let Some(site_url) = lookup("SITE_URL") {
            self.openrouter.site_url = site_url;
        }

        if let Some(model) = lookup("DOCKERGEN_MODEL") {
            self.openrouter.model = model;
        }

        if let Some(port) = lookup("DOCKERGEN_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }

        if let Some(host) = lookup("DOCKERGEN_HOST") {
            self.server.host = host;
        }

        if let Some(level) = lookup("DOCKERGEN_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(api) = lookup("DOCKERGEN_GITHUB_API") {
            self.github.api_base = api;
        }
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.openrouter.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "openrouter.temperature must be between 0.0 and 2.0, got {}",
                self.openrouter.temperature
            )));
        }
        if self.openrouter.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "openrouter.max_tokens must be greater than 0".to_string(),
            ));
        }
        if self.openrouter.timeout_secs == 0 || self.github.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeouts must be greater than 0 seconds".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to a specific file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the server address as a string
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Get the server URL
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server.host, self.server.port)
    }
}
