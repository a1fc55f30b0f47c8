use std::io::Write;

use anyhow::{Context, Result};

use crate::providers::{IssueTracker, TaskSource};

/// Prints every workspace with its projects, so the user can pick a `--projectid`.
pub async fn write_projects(source: &dyn TaskSource, out: &mut impl Write) -> Result<()> {
    let workspaces = source
        .list_workspaces()
        .await
        .context("listing Asana workspaces")?;
    writeln!(out, "Following Asana workspaces and projects are available:")?;
    for ws in workspaces {
        writeln!(out, "{}  {}", ws.id, ws.name)?;
        let projects = source
            .list_projects(&ws.id)
            .await
            .with_context(|| format!("listing projects of workspace {}", ws.id))?;
        for project in projects {
            writeln!(out, "  {}  {}", project.id, project.name)?;
        }
    }
    Ok(())
}

pub async fn write_repositories(tracker: &dyn IssueTracker, out: &mut impl Write) -> Result<()> {
    let repos = tracker
        .list_repositories()
        .await
        .context("listing GitHub repositories")?;
    writeln!(out, "Following GitHub repositories are available:")?;
    for repo in repos {
        writeln!(out, "{}", repo.name)?;
    }
    Ok(())
}
