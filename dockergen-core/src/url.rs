//! GitHub repository URL validation and parsing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Owner and name of a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoReference {
    pub owner: String,
    pub repo: String,
}

impl RepoReference {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: strip_git_suffix(&repo.into()).to_string(),
        }
    }

    /// Canonical `https://github.com/<owner>/<repo>` URL
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for RepoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

fn repo_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^https://github\.com/([A-Za-z0-9_-]+)/([A-Za-z0-9_-]+)(?:\.git)?/?$")
            .expect("repository URL pattern is valid")
    })
}

/// Whether `url` has the shape `https://github.com/<owner>/<repo>[.git][/]`
pub fn is_valid_repo_url(url: &str) -> bool {
    repo_url_regex().is_match(url)
}

/// Extract owner and repository name from a GitHub URL.
///
/// Returns `None` for anything that does not match [`is_valid_repo_url`].
pub fn parse_repo_url(url: &str) -> Option<RepoReference> {
    let caps = repo_url_regex().captures(url)?;
    let owner = caps.get(1)?.as_str();
    let repo = caps.get(2)?.as_str();
    Some(RepoReference::new(owner, repo))
}

/// Remove one trailing `.git` from a repository segment
pub fn strip_git_suffix(repo: &str) -> &str {
    repo.strip_suffix(".git").unwrap_or(repo)
}
