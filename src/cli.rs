use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Parser;

use crate::cache::DEFAULT_CACHE_PATH;
use crate::config::{AppConfig, MigrateOptions};

/// Extra arguments, one per line, appended after the real command line.
pub const RC_FILE: &str = ".asanaghrc";

#[derive(Parser, Debug)]
#[command(
    name = "asana-to-github",
    version,
    about = "Copy Asana tasks to GitHub issues",
    args_override_self = true
)]
pub struct Cli {
    /// GitHub username
    #[arg(short, long)]
    pub username: Option<String>,
    /// GitHub password or personal access token
    #[arg(short, long)]
    pub password: Option<String>,
    /// Asana personal access token
    #[arg(short, long)]
    pub asana_api_key: Option<String>,
    /// Asana project whose tasks are copied; omit to list workspaces and projects
    #[arg(short = 'P', long = "projectid")]
    pub project_id: Option<String>,
    /// GitHub repository (owner/name) to create issues in; omit to list repositories
    #[arg(short, long)]
    pub repo: Option<String>,
    /// Ask before copying each task
    #[arg(short, long)]
    pub interactive: bool,
    /// Also copy tasks already completed in Asana
    #[arg(long = "copy-completed-tasks")]
    pub copy_completed: bool,
    /// Don't tag copied tasks "copied to github" in Asana
    #[arg(long)]
    pub dont_apply_tag: bool,
    /// Don't label issues "copied-from-asana"
    #[arg(long)]
    pub dont_apply_label: bool,
    /// Don't label issues with the task's project names
    #[arg(long)]
    pub dont_apply_project_label: bool,
    /// Don't add the issue link to the task's stories
    #[arg(long)]
    pub dont_update_story: bool,
    /// Don't copy task comments and attachments to the issue
    #[arg(long)]
    pub dont_copy_stories: bool,
    /// Remember copied tasks so later runs skip them
    #[arg(long)]
    pub use_cache: bool,
    /// Where the cache is kept when --use-cache is given
    #[arg(long, default_value = DEFAULT_CACHE_PATH)]
    pub cache_path: PathBuf,
    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

pub struct Credentials {
    pub asana_api_key: String,
    pub username: String,
    pub token: String,
}

impl Cli {
    pub fn options(&self) -> MigrateOptions {
        MigrateOptions {
            interactive: self.interactive,
            copy_completed: self.copy_completed,
            apply_tag: !self.dont_apply_tag,
            apply_label: !self.dont_apply_label,
            apply_project_label: !self.dont_apply_project_label,
            update_story: !self.dont_update_story,
            copy_stories: !self.dont_copy_stories,
        }
    }

    /// Flags win over the config file.
    pub fn credentials(&self, config: &AppConfig) -> Result<Credentials> {
        let gh = config.github.as_ref();
        let Some(asana_api_key) = self
            .asana_api_key
            .clone()
            .or_else(|| config.asana.as_ref().map(|a| a.api_key.clone()))
        else {
            bail!("Asana API Key is required (--asana-api-key or [asana] api_key)");
        };
        let Some(username) = self
            .username
            .clone()
            .or_else(|| gh.and_then(|g| g.username.clone()))
        else {
            bail!("GitHub username is required (--username or [github] username)");
        };
        let Some(token) = self
            .password
            .clone()
            .or_else(|| gh.and_then(|g| g.token.clone()))
        else {
            bail!("GitHub password is required (--password or [github] token)");
        };
        Ok(Credentials {
            asana_api_key,
            username,
            token,
        })
    }

    pub fn repo(&self, config: &AppConfig) -> Option<String> {
        self.repo
            .clone()
            .or_else(|| config.github.as_ref().and_then(|g| g.repo.clone()))
    }
}

pub fn parse_args() -> Cli {
    let mut argv: Vec<String> = std::env::args().collect();
    argv.extend(read_rc(Path::new(RC_FILE)));
    Cli::parse_from(argv)
}

/// Non-empty, non-comment lines of the rc file; a missing file yields nothing.
pub fn read_rc(path: &Path) -> Vec<String> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return Vec::new();
    };
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}
