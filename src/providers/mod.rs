pub mod asana;
pub mod github;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::issue::{Issue, Label, Listed, Tag};
use crate::model::task::{Story, TaskDetail, TaskId, TaskSummary};

/// The tracker tasks are copied from.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn list_task_summaries(&self, project_id: &str) -> Result<Vec<TaskSummary>>;
    async fn fetch_task_detail(&self, id: &TaskId) -> Result<TaskDetail>;
    async fn list_stories(&self, id: &TaskId) -> Result<Vec<Story>>;
    /// Returns the tag with exactly this name in the workspace, creating it if needed.
    async fn get_or_create_tag(&self, name: &str, workspace_id: &str) -> Result<Tag>;
    async fn apply_tag(&self, id: &TaskId, tag: &Tag) -> Result<()>;
    async fn add_story(&self, id: &TaskId, text: &str) -> Result<()>;
    async fn list_workspaces(&self) -> Result<Vec<Listed>> {
        Ok(vec![])
    }
    async fn list_projects(&self, _workspace_id: &str) -> Result<Vec<Listed>> {
        Ok(vec![])
    }
}

/// The tracker issues are created in.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    fn repo(&self) -> &str;
    /// Returns the label with exactly this name, creating it if needed.
    async fn get_or_create_label(&self, name: &str) -> Result<Label>;
    async fn create_issue(&self, title: &str, body: &str, labels: &[Label]) -> Result<Issue>;
    async fn add_comment(&self, issue: &Issue, text: &str) -> Result<()>;
    async fn list_repositories(&self) -> Result<Vec<Listed>> {
        Ok(vec![])
    }
}

#[cfg(test)]
pub mod tests;
