//! `dockergen config` commands - View and manage configuration

use anyhow::Result;
use dockergen_core::Config;
use std::path::{Path, PathBuf};

/// Show current configuration
pub fn show(config: Config, path: Option<&Path>) -> Result<()> {
    println!("╭─────────────────────────────────────────╮");
    println!("│         Dockergen Configuration         │");
    println!("├─────────────────────────────────────────┤");
    println!("│ OpenRouter                              │");
    println!("│   Model:        {:<23} │", truncate(&config.openrouter.model, 23));
    println!("│   Temperature:  {:<23} │", config.openrouter.temperature);
    println!("│   Max tokens:   {:<23} │", config.openrouter.max_tokens);
    println!("│   Timeout:      {:<23} │", format!("{}s", config.openrouter.timeout_secs));
    println!("│   Site URL:     {:<23} │", truncate(&config.openrouter.site_url, 23));
    println!(
        "│   API key:      {:<23} │",
        mask_key(config.openrouter.credential())
    );
    println!("├─────────────────────────────────────────┤");
    println!("│ GitHub                                  │");
    println!("│   API:          {:<23} │", truncate(&config.github.api_base, 23));
    println!("│   Timeout:      {:<23} │", format!("{}s", config.github.timeout_secs));
    println!("├─────────────────────────────────────────┤");
    println!("│ Server                                  │");
    println!("│   Host:         {:<23} │", config.server.host);
    println!("│   Port:         {:<23} │", config.server.port);
    println!("│   URL:          {:<23} │", truncate(&config.server_url(), 23));
    println!("├─────────────────────────────────────────┤");
    println!("│ Logging                                 │");
    println!("│   Level:        {:<23} │", config.logging.level);
    println!("╰─────────────────────────────────────────╯");

    if let Some(path) = config_path(path) {
        let exists = path.exists();
        println!(
            "\n📁 Config: {} {}",
            path.display(),
            if exists { "✓" } else { "(not created)" }
        );
    }

    Ok(())
}

/// Initialize default configuration at `path`, or the default location
pub fn init(path: Option<&Path>, force: bool) -> Result<()> {
    let path = config_path(path).ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

    if path.exists() && !force {
        println!(
            "⚠️  Configuration file already exists at: {}",
            path.display()
        );
        println!("   Use --force to overwrite.");
        return Ok(());
    }

    let config = Config::default();
    config.save_to_file(&path)?;

    println!("✅ Created configuration file at: {}", path.display());
    println!("\n📝 Default configuration:");
    println!("{}", toml::to_string_pretty(&config)?);
    println!("💡 Set OPENROUTER_API_KEY in the environment rather than storing it here.");

    Ok(())
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(Config::default_config_path)
}

fn mask_key(key: Option<&str>) -> String {
    match key {
        None => "(not set)".to_string(),
        Some(k) if k.chars().count() <= 8 => "********".to_string(),
        Some(k) => {
            let tail: String = k.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
            format!("********{}", tail)
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 1).collect();
        format!("{}…", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key(None), "(not set)");
        assert_eq!(mask_key(Some("short")), "********");
        assert_eq!(mask_key(Some("sk-or-v1-abcdef123456")), "********3456");
    }

    #[test]
    fn test_init_writes_to_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom").join("dockergen.toml");

        init(Some(&path), false).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[openrouter]"));

        std::fs::write(&path, "# mine\n").unwrap();
        init(Some(&path), false).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        init(Some(&path), true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[server]"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 23), "short");
        assert_eq!(
            truncate("meta-llama/llama-3.1-8b-instruct:free", 10),
            "meta-llam…"
        );
    }
}
