use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Canonical task identifier. Asana has used both numeric `id` and string
/// `gid` fields; both collapse to the decimal string form here so the cache
/// only ever sees one representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(TaskId(id_string(deserializer)?))
    }
}

/// Any Asana id (task, project, workspace) as a non-empty string, whether
/// the payload carries it as a number or a string.
pub fn id_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    let id = match Raw::deserialize(deserializer)? {
        Raw::Num(n) => n.to_string(),
        Raw::Str(s) => s.trim().to_string(),
    };
    if id.is_empty() {
        return Err(de::Error::custom("empty id"));
    }
    Ok(id)
}

/// What the bulk project listing gives us; enough to run the eligibility filter.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSummary {
    #[serde(rename = "gid", alias = "id")]
    pub id: TaskId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProjectRef {
    #[serde(rename = "gid", alias = "id", deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct TaskDetail {
    pub id: TaskId,
    pub name: String,
    pub completed: bool,
    pub notes: String,
    pub due_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub workspace_id: String,
    pub projects: Vec<ProjectRef>,
}

impl TaskDetail {
    pub fn url(&self) -> String {
        format!("https://app.asana.com/0/{}/{}", self.workspace_id, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryKind {
    Comment,
    System,
    Other,
}

impl StoryKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "comment" => StoryKind::Comment,
            "system" => StoryKind::System,
            _ => StoryKind::Other,
        }
    }
}

/// One entry of a task's activity feed.
#[derive(Debug, Clone)]
pub struct Story {
    pub kind: StoryKind,
    pub text: String,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
}
