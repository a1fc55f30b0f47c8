mod cache;
mod cli;
mod config;
mod listing;
mod migrate;
mod model;
mod prompt;
mod providers;

use std::io;
use std::panic;
use std::process::ExitCode;

use anyhow::Result;
use crossterm::terminal::disable_raw_mode;
use tracing_subscriber::EnvFilter;

use cache::TaskCache;
use migrate::Migrator;
use prompt::TerminalPrompt;
use providers::asana::AsanaProvider;
use providers::github::GitHubProvider;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = cli::parse_args();
    init_tracing(cli.verbose);

    let config = config::load_config()?;
    let creds = cli.credentials(&config)?;
    let repo = cli.repo(&config);

    // Restore the terminal if we panic while the prompt has it in raw mode
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        original_hook(panic_info);
    }));

    let source = AsanaProvider::new(creds.asana_api_key);
    let (Some(project_id), Some(repo)) = (cli.project_id.clone(), repo) else {
        let mut stdout = io::stdout();
        if cli.project_id.is_none() {
            listing::write_projects(&source, &mut stdout).await?;
        }
        if cli.repo(&config).is_none() {
            let tracker = GitHubProvider::new(String::new(), creds.username, creds.token);
            listing::write_repositories(&tracker, &mut stdout).await?;
        }
        return Ok(());
    };

    let tracker = GitHubProvider::new(repo, creds.username, creds.token);
    let cache = TaskCache::new(cli.use_cache, &cli.cache_path);
    if cache.is_enabled() {
        tracing::debug!(path = %cache.path().display(), "using task cache");
    }
    let options = cli.options();

    let report = Migrator::new(&source, &tracker, &cache, &options)
        .run(&project_id, &mut TerminalPrompt)
        .await?;
    tracing::debug!(
        seen = report.outcomes.len(),
        copied = report.copied(),
        "migration finished"
    );
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "asana_to_github=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
