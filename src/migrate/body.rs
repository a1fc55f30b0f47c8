use crate::model::task::{Story, StoryKind, TaskDetail};

/// System stories with this prefix carry an attachment URL.
pub const ATTACHMENT_MARKER: &str = "attached ";
/// System story recording who added the task to a project.
pub const ADDED_MARKER: &str = "added ";

const TIME_FORMAT: &str = "%b-%d-%Y %H:%M UTC";
const DATE_FORMAT: &str = "%b-%d-%Y";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct StoryDigest {
    pub comments: Vec<String>,
    pub attachments: Vec<String>,
    pub created_by: Option<String>,
}

pub fn digest(stories: &[Story]) -> StoryDigest {
    let mut out = StoryDigest::default();
    for story in stories {
        match story.kind {
            StoryKind::Comment => out.comments.push(format!(
                "*{}*: **{}** wrote '{}'",
                story.created_at.format(TIME_FORMAT),
                story.author.as_deref().unwrap_or("unknown"),
                story.text.replace('\n', "")
            )),
            StoryKind::System => {
                if let Some(url) = story.text.strip_prefix(ATTACHMENT_MARKER) {
                    out.attachments.push(format!("1. [Link to attachment]({url})"));
                }
                // first match wins
                if out.created_by.is_none() && story.text.starts_with(ADDED_MARKER) {
                    out.created_by = story.author.clone();
                }
            }
            StoryKind::Other => {}
        }
    }
    out
}

pub fn issue_body(task: &TaskDetail, created_by: Option<&str>) -> String {
    let description = if task.notes.trim().is_empty() {
        "*No description.*"
    } else {
        task.notes.as_str()
    };
    let created = task.created_at.format(TIME_FORMAT);
    let mut meta = match created_by {
        Some(who) => format!(
            "#### Meta\n[Asana task]({}) was created by {who} at {created}.",
            task.url()
        ),
        None => format!("#### Meta\n[Asana task]({}) was created at {created}.", task.url()),
    };
    if let Some(due) = task.due_on {
        meta.push_str(&format!(" It is due on {}.", due.format(DATE_FORMAT)));
    }
    format!("{description}\n\n{meta}")
}

/// Attachments then comments; `None` when the task has neither.
pub fn stories_comment(digest: &StoryDigest) -> Option<String> {
    if digest.comments.is_empty() && digest.attachments.is_empty() {
        return None;
    }
    let mut out = String::new();
    if !digest.attachments.is_empty() {
        out.push_str("### Attachments\n");
        for line in &digest.attachments {
            out.push_str(line);
            out.push('\n');
        }
    }
    if !digest.comments.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str("### Comments\n");
        for line in &digest.comments {
            out.push_str(line);
            out.push('\n');
        }
    }
    Some(out)
}
