use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::{IssueTracker, TaskSource};
use crate::model::issue::{Issue, Label, Tag};
use crate::model::task::{ProjectRef, Story, TaskDetail, TaskId, TaskSummary};

pub fn task(id: &str, name: &str, completed: bool) -> TaskDetail {
    TaskDetail {
        id: TaskId::new(id).unwrap(),
        name: name.to_string(),
        completed,
        notes: format!("notes for {name}"),
        due_on: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 0).unwrap(),
        workspace_id: "ws".into(),
        projects: vec![ProjectRef {
            id: "p1".into(),
            name: "Backend".into(),
        }],
    }
}

/// In-memory Asana. Every call is appended to `calls` as `"<op>:<id>"`.
pub struct MockSource {
    tasks: Vec<TaskDetail>,
    stories: HashMap<String, Vec<Story>>,
    pub calls: Arc<Mutex<Vec<String>>>,
    fail_story: bool,
}

impl MockSource {
    pub fn new(tasks: Vec<TaskDetail>) -> Self {
        Self {
            tasks,
            stories: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_story: false,
        }
    }

    pub fn with_stories(mut self, id: &str, stories: Vec<Story>) -> Self {
        self.stories.insert(id.to_string(), stories);
        self
    }

    pub fn with_story_failure(mut self) -> Self {
        self.fail_story = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.strip_prefix("detail:").map(String::from))
            .collect()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl TaskSource for MockSource {
    async fn list_task_summaries(&self, project_id: &str) -> Result<Vec<TaskSummary>> {
        self.record(format!("list:{project_id}"));
        Ok(self
            .tasks
            .iter()
            .map(|t| TaskSummary {
                id: t.id.clone(),
                name: t.name.clone(),
            })
            .collect())
    }

    async fn fetch_task_detail(&self, id: &TaskId) -> Result<TaskDetail> {
        self.record(format!("detail:{id}"));
        self.tasks
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no task {id}"))
    }

    async fn list_stories(&self, id: &TaskId) -> Result<Vec<Story>> {
        self.record(format!("stories:{id}"));
        Ok(self.stories.get(id.as_str()).cloned().unwrap_or_default())
    }

    async fn get_or_create_tag(&self, name: &str, workspace_id: &str) -> Result<Tag> {
        self.record(format!("tag:{workspace_id}"));
        Ok(Tag {
            gid: "t1".into(),
            name: name.into(),
        })
    }

    async fn apply_tag(&self, id: &TaskId, _tag: &Tag) -> Result<()> {
        self.record(format!("apply_tag:{id}"));
        Ok(())
    }

    async fn add_story(&self, id: &TaskId, text: &str) -> Result<()> {
        if self.fail_story {
            anyhow::bail!("Mock story failure");
        }
        self.record(format!("add_story:{id}:{text}"));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CreatedIssue {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// In-memory GitHub repository.
pub struct MockTracker {
    pub issues: Arc<Mutex<Vec<CreatedIssue>>>,
    pub comments: Arc<Mutex<Vec<(u64, String)>>>,
    pub labels: Arc<Mutex<Vec<String>>>,
    fail_on_title: Option<String>,
}

impl MockTracker {
    pub fn new() -> Self {
        Self {
            issues: Arc::new(Mutex::new(Vec::new())),
            comments: Arc::new(Mutex::new(Vec::new())),
            labels: Arc::new(Mutex::new(Vec::new())),
            fail_on_title: None,
        }
    }

    pub fn failing_on(mut self, title: &str) -> Self {
        self.fail_on_title = Some(title.to_string());
        self
    }

    pub fn issue_titles(&self) -> Vec<String> {
        self.issues
            .lock()
            .unwrap()
            .iter()
            .map(|i| i.title.clone())
            .collect()
    }
}

#[async_trait]
impl IssueTracker for MockTracker {
    fn repo(&self) -> &str {
        "owner/repo"
    }

    async fn get_or_create_label(&self, name: &str) -> Result<Label> {
        let mut labels = self.labels.lock().unwrap();
        if !labels.iter().any(|l| l == name) {
            labels.push(name.to_string());
        }
        Ok(Label { name: name.into() })
    }

    async fn create_issue(&self, title: &str, body: &str, labels: &[Label]) -> Result<Issue> {
        if self.fail_on_title.as_deref() == Some(title) {
            anyhow::bail!("Mock issue failure");
        }
        let mut issues = self.issues.lock().unwrap();
        issues.push(CreatedIssue {
            title: title.into(),
            body: body.into(),
            labels: labels.iter().map(|l| l.name.clone()).collect(),
        });
        let number = issues.len() as u64;
        Ok(Issue {
            number,
            url: format!("https://github.com/owner/repo/issues/{number}"),
        })
    }

    async fn add_comment(&self, issue: &Issue, text: &str) -> Result<()> {
        self.comments
            .lock()
            .unwrap()
            .push((issue.number, text.to_string()));
        Ok(())
    }
}
