//! # Dockergen Core
//!
//! Core library for Dockergen - generate a Dockerfile for a GitHub repository.
//!
//! This crate provides:
//! - Configuration management
//! - GitHub URL parsing and repository metadata lookup
//! - OpenRouter chat-completion client
//! - Prompt rendering and the generation handler
//! - HTTP server with the generation endpoint and browser form
//! - Client-side generation chain
//! - Shared data models

pub mod client;
pub mod config;
pub mod generate;
pub mod github;
pub mod model;
pub mod openrouter;
pub mod prompt;
pub mod server;
pub mod url;

pub use client::{ChainError, ChainState, GenerationChain, GenerationOutcome};
pub use config::{Config, ConfigError};
pub use generate::{DockerfileGenerator, GenerateError, GenerationSettings};
pub use github::{GitHubClient, GitHubError, RepoMetadataSource};
pub use model::*;
pub use openrouter::{CompletionBackend, CompletionError, OpenRouterClient};
pub use url::{is_valid_repo_url, parse_repo_url, RepoReference};
