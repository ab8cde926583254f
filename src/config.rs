use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::report::feedback::DEFAULT_TITLE;

/// File looked up in the current directory by `Config::load`.
pub const CONFIG_FILE: &str = ".pr-review.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .pr-review.toml.
/// Every field is optional; the tool runs with no config file at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Heading used in the summary report
    pub title: Option<String>,
}

impl Config {
    /// Load configuration from .pr-review.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Config file value takes precedence, falls back to GITHUB_TOKEN env var.
    pub fn github_token(&self) -> Option<String> {
        self.github
            .token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
    }

    pub fn report_title(&self) -> &str {
        self.report.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert!(config.report.title.is_none());
        assert_eq!(config.report_title(), "AI Code Review");
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[github]
token = "ghp_example"

[report]
title = "Nightly Review"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.github_token().as_deref(), Some("ghp_example"));
        assert_eq!(config.report_title(), "Nightly Review");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml::from_str("[report]\n").unwrap();
        assert!(config.github.token.is_none());
        assert_eq!(config.report_title(), DEFAULT_TITLE);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("pr_review_test_config.toml");
        std::fs::write(&path, "[report]\ntitle = \"From File\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.report_title(), "From File");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let path = std::env::temp_dir().join("pr_review_test_bad_config.toml");
        std::fs::write(&path, "[report\ntitle = ").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = std::env::temp_dir().join("pr_review_no_such_config.toml");
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead(_)));
    }
}
