//! Dockerfile prompt rendering.

use crate::model::RepoMetadata;
use tera::{Context, Tera};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt rendering error: {0}")]
    RenderError(#[from] tera::Error),
}

const PROMPT_NAME: &str = "dockerfile";

const DOCKERFILE_PROMPT: &str = r#"Generate a production-ready Dockerfile for a {{ language }} project named "{{ name }}".
{% if description %}
Project description: {{ description }}
{% endif %}
Requirements:
1. Use multi-stage builds where appropriate to keep the final image small
2. Follow security best practices
3. Add a HEALTHCHECK instruction
4. Include helpful comments explaining each step
5. Use an appropriate, minimal official base image for {{ language }}
6. Run the application as a non-root user
7. Set environment variables properly

Return only the Dockerfile content, without markdown code fences or explanations."#;

/// Render the generation prompt for a repository
pub fn build_prompt(repo: &RepoMetadata) -> Result<String, PromptError> {
    let mut tera = Tera::default();
    tera.add_raw_template(PROMPT_NAME, DOCKERFILE_PROMPT)?;

    let mut context = Context::new();
    context.insert("name", &repo.name);
    context.insert("language", &repo.language);
    context.insert("description", repo.description.trim());

    Ok(tera.render(PROMPT_NAME, &context)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello_world() -> RepoMetadata {
        RepoMetadata {
            name: "octocat/Hello-World".to_string(),
            language: "Ruby".to_string(),
            description: "My first repository".to_string(),
        }
    }

    #[test]
    fn test_prompt_embeds_metadata() {
        let prompt = build_prompt(&hello_world()).unwrap();
        assert!(prompt.contains(r#"a Ruby project named "octocat/Hello-World""#));
        assert!(prompt.contains("Project description: My first repository"));
    }

    #[test]
    fn test_prompt_checklist() {
        let prompt = build_prompt(&hello_world()).unwrap().to_lowercase();
        for item in [
            "multi-stage",
            "security",
            "healthcheck",
            "comments",
            "base image",
            "non-root",
            "environment variables",
        ] {
            assert!(prompt.contains(item), "missing {item}");
        }
    }

    #[test]
    fn test_prompt_without_description() {
        let repo = RepoMetadata::new("octocat/empty", None, None);
        let prompt = build_prompt(&repo).unwrap();
        assert!(prompt.contains("Unknown project"));
        assert!(!prompt.contains("Project description"));
    }

    #[test]
    fn test_prompt_does_not_escape_markup() {
        let repo = RepoMetadata::new(
            "acme/web",
            Some("C++".to_string()),
            Some("Serves <html> & \"quotes\"".to_string()),
        );
        let prompt = build_prompt(&repo).unwrap();
        assert!(prompt.contains("Serves <html> & \"quotes\""));
        assert!(prompt.contains("C++ project"));
    }
}
