use anyhow::{Context, Result};

use super::body;
use crate::config::MigrateOptions;
use crate::model::issue::Issue;
use crate::model::task::TaskDetail;
use crate::providers::{IssueTracker, TaskSource};

pub const COPIED_LABEL: &str = "copied-from-asana";
pub const COPIED_TAG: &str = "copied to github";

/// Creates the GitHub issue for `task` and writes the cross-reference back to
/// Asana. Any failing step aborts the copy with the step named in the error.
pub async fn copy_task(
    source: &dyn TaskSource,
    tracker: &dyn IssueTracker,
    task: &TaskDetail,
    options: &MigrateOptions,
) -> Result<Issue> {
    let mut labels = Vec::new();
    if options.apply_label {
        labels.push(
            tracker
                .get_or_create_label(COPIED_LABEL)
                .await
                .with_context(|| format!("task {}: label '{COPIED_LABEL}'", task.id))?,
        );
    }
    if options.apply_project_label {
        for project in &task.projects {
            tracing::debug!(task = %task.id, project = %project.id, "project label");
            labels.push(
                tracker
                    .get_or_create_label(&project.name)
                    .await
                    .with_context(|| format!("task {}: label '{}'", task.id, project.name))?,
            );
        }
    }

    let stories = source
        .list_stories(&task.id)
        .await
        .with_context(|| format!("task {}: listing stories", task.id))?;
    let digest = body::digest(&stories);

    println!("Creating issue: {}", task.name);
    let text = body::issue_body(task, digest.created_by.as_deref());
    let issue = tracker
        .create_issue(&task.name, &text, &labels)
        .await
        .with_context(|| format!("task {}: creating issue", task.id))?;
    tracing::info!(task = %task.id, issue = %issue.url, "issue created");

    if options.copy_stories {
        if let Some(comment) = body::stories_comment(&digest) {
            println!("Copying stories to GitHub");
            tracker
                .add_comment(&issue, &comment)
                .await
                .with_context(|| format!("task {}: copying stories", task.id))?;
        }
    }

    if options.apply_tag {
        println!("Applying tag to Asana task");
        let tag = source
            .get_or_create_tag(COPIED_TAG, &task.workspace_id)
            .await
            .with_context(|| format!("task {}: tag '{COPIED_TAG}'", task.id))?;
        source
            .apply_tag(&task.id, &tag)
            .await
            .with_context(|| format!("task {}: applying tag", task.id))?;
    }

    if options.update_story {
        println!("Updating story of Asana task");
        source
            .add_story(&task.id, &format!("This task can be seen at {}", issue.url))
            .await
            .with_context(|| format!("task {}: updating story", task.id))?;
    }

    Ok(issue)
}
