use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::TaskSource;
use crate::model::issue::{Listed, Tag};
use crate::model::task::{
    id_string, ProjectRef, Story, StoryKind, TaskDetail, TaskId, TaskSummary,
};

const BASE_URL: &str = "https://app.asana.com/api/1.0";
const PAGE_LIMIT: &str = "100";

pub struct AsanaProvider {
    token: String,
    client: reqwest::Client,
}

impl AsanaProvider {
    pub fn new(token: String) -> Self {
        Self {
            token,
            client: reqwest::Client::new(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let env: Envelope<T> = self
            .client
            .get(format!("{BASE_URL}{path}"))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Asana GET {path} failed"))?
            .error_for_status()
            .with_context(|| format!("Asana GET {path} rejected"))?
            .json()
            .await
            .with_context(|| format!("Failed to parse Asana response for {path}"))?;
        Ok(env.data)
    }

    /// Follows `next_page.offset` until the listing is exhausted.
    async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut offset: Option<String> = None;
        loop {
            let mut req = self
                .client
                .get(format!("{BASE_URL}{path}"))
                .bearer_auth(&self.token)
                .query(query)
                .query(&[("limit", PAGE_LIMIT)]);
            if let Some(off) = &offset {
                req = req.query(&[("offset", off.as_str())]);
            }
            let page: Envelope<Vec<T>> = req
                .send()
                .await
                .with_context(|| format!("Asana GET {path} failed"))?
                .error_for_status()
                .with_context(|| format!("Asana GET {path} rejected"))?
                .json()
                .await
                .with_context(|| format!("Failed to parse Asana response for {path}"))?;
            items.extend(page.data);
            match page.next_page {
                Some(next) => offset = Some(next.offset),
                None => break,
            }
        }
        Ok(items)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, data: serde_json::Value) -> Result<T> {
        let env: Envelope<T> = self
            .client
            .post(format!("{BASE_URL}{path}"))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "data": data }))
            .send()
            .await
            .with_context(|| format!("Asana POST {path} failed"))?
            .error_for_status()
            .with_context(|| format!("Asana POST {path} rejected"))?
            .json()
            .await
            .with_context(|| format!("Failed to parse Asana response for {path}"))?;
        Ok(env.data)
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
    #[serde(default)]
    next_page: Option<NextPage>,
}

#[derive(Deserialize)]
struct NextPage {
    offset: String,
}

#[derive(Deserialize)]
struct Named {
    #[serde(rename = "gid", alias = "id", deserialize_with = "id_string")]
    id: String,
    name: String,
}

impl From<Named> for Listed {
    fn from(n: Named) -> Self {
        Listed {
            id: n.id,
            name: n.name,
        }
    }
}

#[derive(Deserialize)]
struct Ref {
    #[serde(rename = "gid", alias = "id", deserialize_with = "id_string")]
    id: String,
}

#[derive(Deserialize)]
struct RawTask {
    #[serde(rename = "gid", alias = "id")]
    id: TaskId,
    name: String,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    notes: Option<String>,
    due_on: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    workspace: Ref,
    #[serde(default)]
    projects: Vec<ProjectRef>,
}

impl From<RawTask> for TaskDetail {
    fn from(t: RawTask) -> Self {
        TaskDetail {
            id: t.id,
            name: t.name,
            completed: t.completed,
            notes: t.notes.unwrap_or_default(),
            due_on: t.due_on,
            created_at: t.created_at,
            workspace_id: t.workspace.id,
            projects: t.projects,
        }
    }
}

#[derive(Deserialize)]
struct RawStory {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
    created_by: Option<RawUser>,
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawUser {
    name: String,
}

impl From<RawStory> for Story {
    fn from(s: RawStory) -> Self {
        Story {
            kind: StoryKind::parse(&s.kind),
            text: s.text.unwrap_or_default(),
            author: s.created_by.map(|u| u.name),
            created_at: s.created_at,
        }
    }
}

#[async_trait]
impl TaskSource for AsanaProvider {
    async fn list_task_summaries(&self, project_id: &str) -> Result<Vec<TaskSummary>> {
        self.get_all(&format!("/projects/{project_id}/tasks"), &[("opt_fields", "name")])
            .await
    }

    async fn fetch_task_detail(&self, id: &TaskId) -> Result<TaskDetail> {
        let raw: RawTask = self
            .get(
                &format!("/tasks/{id}"),
                &[(
                    "opt_fields",
                    "name,completed,notes,due_on,created_at,workspace,projects.name",
                )],
            )
            .await?;
        Ok(raw.into())
    }

    async fn list_stories(&self, id: &TaskId) -> Result<Vec<Story>> {
        let raw: Vec<RawStory> = self
            .get_all(
                &format!("/tasks/{id}/stories"),
                &[("opt_fields", "type,text,created_by.name,created_at")],
            )
            .await?;
        Ok(raw.into_iter().map(Story::from).collect())
    }

    async fn get_or_create_tag(&self, name: &str, workspace_id: &str) -> Result<Tag> {
        let tags: Vec<Tag> = self
            .get_all(
                &format!("/workspaces/{workspace_id}/tags"),
                &[("opt_fields", "name")],
            )
            .await?;
        if let Some(tag) = tags.into_iter().find(|t| t.name == name) {
            return Ok(tag);
        }
        tracing::debug!(tag = name, workspace = workspace_id, "creating Asana tag");
        self.post(
            "/tags",
            serde_json::json!({ "name": name, "workspace": workspace_id }),
        )
        .await
    }

    async fn apply_tag(&self, id: &TaskId, tag: &Tag) -> Result<()> {
        let _: serde_json::Value = self
            .post(
                &format!("/tasks/{id}/addTag"),
                serde_json::json!({ "tag": tag.gid }),
            )
            .await?;
        Ok(())
    }

    async fn add_story(&self, id: &TaskId, text: &str) -> Result<()> {
        let _: serde_json::Value = self
            .post(
                &format!("/tasks/{id}/stories"),
                serde_json::json!({ "text": text }),
            )
            .await?;
        Ok(())
    }

    async fn list_workspaces(&self) -> Result<Vec<Listed>> {
        let raw: Vec<Named> = self.get_all("/workspaces", &[("opt_fields", "name")]).await?;
        Ok(raw.into_iter().map(Listed::from).collect())
    }

    async fn list_projects(&self, workspace_id: &str) -> Result<Vec<Listed>> {
        let raw: Vec<Named> = self
            .get_all(
                &format!("/workspaces/{workspace_id}/projects"),
                &[("opt_fields", "name")],
            )
            .await?;
        Ok(raw.into_iter().map(Listed::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_payload_maps_to_detail() {
        let json = r#"{
            "data": {
                "gid": "1201",
                "name": "Fix bug",
                "completed": false,
                "notes": "",
                "due_on": "2024-05-01",
                "created_at": "2024-04-02T09:15:00.000Z",
                "workspace": { "gid": "77" },
                "projects": [{ "gid": "5", "name": "Backend" }]
            }
        }"#;
        let env: Envelope<RawTask> = serde_json::from_str(json).unwrap();
        let detail = TaskDetail::from(env.data);
        assert_eq!(detail.id.as_str(), "1201");
        assert_eq!(detail.workspace_id, "77");
        assert_eq!(detail.due_on, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(detail.projects[0].name, "Backend");
        assert_eq!(detail.url(), "https://app.asana.com/0/77/1201");
    }

    #[test]
    fn null_notes_and_missing_due_date() {
        let json = r#"{
            "gid": "1", "name": "n", "notes": null, "due_on": null,
            "created_at": "2024-04-02T09:15:00Z", "workspace": { "id": 3 }
        }"#;
        let detail = TaskDetail::from(serde_json::from_str::<RawTask>(json).unwrap());
        assert_eq!(detail.notes, "");
        assert!(detail.due_on.is_none());
        assert!(!detail.completed);
        assert_eq!(detail.workspace_id, "3");
    }

    #[test]
    fn listing_page_carries_offset() {
        let json = r#"{
            "data": [{ "gid": "1", "name": "a" }, { "gid": "2", "name": "b:" }],
            "next_page": { "offset": "eyJ0", "path": "/x", "uri": "https://x" }
        }"#;
        let page: Envelope<Vec<TaskSummary>> = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.next_page.unwrap().offset, "eyJ0");

        let last: Envelope<Vec<TaskSummary>> =
            serde_json::from_str(r#"{ "data": [], "next_page": null }"#).unwrap();
        assert!(last.next_page.is_none());
    }

    #[test]
    fn story_without_author() {
        let json = r#"{ "type": "system", "text": "attached https://x/y", "created_by": null,
                        "created_at": "2024-04-02T09:15:00Z" }"#;
        let story = Story::from(serde_json::from_str::<RawStory>(json).unwrap());
        assert_eq!(story.kind, StoryKind::System);
        assert!(story.author.is_none());
    }
}
