use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Credentials and defaults from `~/.asanagh/config.toml`. Command-line
/// flags take precedence over anything set here.
#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub asana: Option<AsanaConfig>,
    pub github: Option<GitHubConfig>,
}

#[derive(Debug, Deserialize)]
pub struct AsanaConfig {
    pub api_key: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct GitHubConfig {
    pub username: Option<String>,
    pub token: Option<String>,
    pub repo: Option<String>,
}

/// Which side effects a run performs. Built once at startup and passed by
/// reference; nothing reads flags from global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrateOptions {
    pub interactive: bool,
    pub copy_completed: bool,
    pub apply_tag: bool,
    pub apply_label: bool,
    pub apply_project_label: bool,
    pub update_story: bool,
    pub copy_stories: bool,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            interactive: false,
            copy_completed: false,
            apply_tag: true,
            apply_label: true,
            apply_project_label: true,
            update_story: true,
            copy_stories: true,
        }
    }
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".asanagh")
        .join("config.toml")
}

pub fn load_config() -> Result<AppConfig> {
    let path = config_path();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    Ok(toml::from_str(contents)?)
}
