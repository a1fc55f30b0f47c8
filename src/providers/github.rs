use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;

use super::IssueTracker;
use crate::model::issue::{Issue, Label, Listed};

const BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_LABEL_COLOR: &str = "FFFFFF";

pub struct GitHubProvider {
    repo: String,
    auth_header: String,
    client: reqwest::Client,
}

impl GitHubProvider {
    /// `repo` is `owner/name`; `token` may be a personal access token or password.
    pub fn new(repo: String, username: String, token: String) -> Self {
        let creds = format!("{username}:{token}");
        let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
        Self {
            repo,
            auth_header: format!("Basic {encoded}"),
            client: reqwest::Client::new(),
        }
    }

    fn request(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("Authorization", &self.auth_header)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "asana-to-github")
    }
}

#[derive(Deserialize)]
struct GhRepo {
    id: u64,
    full_name: String,
}

#[async_trait]
impl IssueTracker for GitHubProvider {
    fn repo(&self) -> &str {
        &self.repo
    }

    async fn get_or_create_label(&self, name: &str) -> Result<Label> {
        let url = format!(
            "{BASE_URL}/repos/{}/labels/{}",
            self.repo,
            urlencoding::encode(name)
        );
        let resp = self
            .request(self.client.get(&url))
            .send()
            .await
            .with_context(|| format!("GitHub label lookup for '{name}' failed"))?;

        if resp.status() != StatusCode::NOT_FOUND {
            return resp
                .error_for_status()
                .with_context(|| format!("GitHub label lookup for '{name}' rejected"))?
                .json()
                .await
                .context("Failed to parse GitHub label");
        }

        tracing::debug!(label = name, repo = %self.repo, "creating GitHub label");
        self.request(self.client.post(format!("{BASE_URL}/repos/{}/labels", self.repo)))
            .json(&serde_json::json!({ "name": name, "color": DEFAULT_LABEL_COLOR }))
            .send()
            .await
            .with_context(|| format!("GitHub label create for '{name}' failed"))?
            .error_for_status()
            .with_context(|| format!("GitHub label create for '{name}' rejected"))?
            .json()
            .await
            .context("Failed to parse created GitHub label")
    }

    async fn create_issue(&self, title: &str, body: &str, labels: &[Label]) -> Result<Issue> {
        let names: Vec<&str> = labels.iter().map(|l| l.name.as_str()).collect();
        self.request(self.client.post(format!("{BASE_URL}/repos/{}/issues", self.repo)))
            .json(&serde_json::json!({ "title": title, "body": body, "labels": names }))
            .send()
            .await
            .context("GitHub issue create failed")?
            .error_for_status()
            .context("GitHub issue create rejected")?
            .json()
            .await
            .context("Failed to parse created GitHub issue")
    }

    async fn add_comment(&self, issue: &Issue, text: &str) -> Result<()> {
        self.request(self.client.post(format!(
            "{BASE_URL}/repos/{}/issues/{}/comments",
            self.repo, issue.number
        )))
        .json(&serde_json::json!({ "body": text }))
        .send()
        .await
        .with_context(|| format!("GitHub comment on #{} failed", issue.number))?
        .error_for_status()
        .with_context(|| format!("GitHub comment on #{} rejected", issue.number))?;
        Ok(())
    }

    async fn list_repositories(&self) -> Result<Vec<Listed>> {
        let mut repos = Vec::new();
        for page in 1.. {
            let batch: Vec<GhRepo> = self
                .request(self.client.get(format!("{BASE_URL}/user/repos")))
                .query(&[("per_page", "100"), ("page", &page.to_string())])
                .send()
                .await
                .context("GitHub repository listing failed")?
                .error_for_status()
                .context("GitHub repository listing rejected")?
                .json()
                .await
                .context("Failed to parse GitHub repositories")?;
            let done = batch.len() < 100;
            repos.extend(batch.into_iter().map(|r| Listed {
                id: r.id.to_string(),
                name: r.full_name,
            }));
            if done {
                break;
            }
        }
        Ok(repos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_auth_header_is_encoded() {
        let gh = GitHubProvider::new("o/r".into(), "me".into(), "tok".into());
        assert_eq!(gh.auth_header, "Basic bWU6dG9r");
        assert_eq!(gh.repo(), "o/r");
    }

    #[test]
    fn issue_payload_uses_html_url() {
        let json = r#"{ "number": 12, "url": "https://api.github.com/x", "html_url": "https://github.com/o/r/issues/12" }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.number, 12);
        assert_eq!(issue.url, "https://github.com/o/r/issues/12");
    }
}
