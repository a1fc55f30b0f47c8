//! Per-run task migration.
//!
//! Tasks are handled one at a time in listing order:
//! fetch detail, completion check, optional confirmation, copy, cache commit.
//! A task is recorded in the cache only after its copy succeeded, so tasks
//! skipped for being completed or declined by the user come up again on the
//! next run. Label get-or-create is not safe to race, which is one reason
//! tasks never overlap.

pub mod body;
pub mod copy;
pub mod filter;

use anyhow::{Context, Result};

use crate::cache::TaskCache;
use crate::config::MigrateOptions;
use crate::model::task::{TaskDetail, TaskId};
use crate::prompt::Confirm;
use crate::providers::{IssueTracker, TaskSource};
use self::filter::Eligibility;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Section header (name ends with `:`); never fetched.
    Filtered,
    /// Copied by an earlier run; never fetched.
    Cached,
    /// Completed in Asana and completed tasks weren't requested.
    Completed,
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    Copied { issue_url: String },
}

#[derive(Debug, Default)]
pub struct MigrationReport {
    pub outcomes: Vec<(TaskId, Outcome)>,
}

impl MigrationReport {
    pub fn copied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::Copied { .. }))
            .count()
    }

    #[cfg(test)]
    pub fn outcome(&self, id: &str) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|(t, _)| t.as_str() == id)
            .map(|(_, o)| o)
    }
}

pub struct Migrator<'a> {
    source: &'a dyn TaskSource,
    tracker: &'a dyn IssueTracker,
    cache: &'a TaskCache,
    options: &'a MigrateOptions,
}

impl<'a> Migrator<'a> {
    pub fn new(
        source: &'a dyn TaskSource,
        tracker: &'a dyn IssueTracker,
        cache: &'a TaskCache,
        options: &'a MigrateOptions,
    ) -> Self {
        Self {
            source,
            tracker,
            cache,
            options,
        }
    }

    /// Migrates every eligible task of `project_id`. The first remote or
    /// cache-write failure stops the run; tasks committed before it stay
    /// committed, so re-running resumes where this one stopped.
    pub async fn run(&self, project_id: &str, confirm: &mut dyn Confirm) -> Result<MigrationReport> {
        println!("Fetching tasks from Asana");
        let summaries = self
            .source
            .list_task_summaries(project_id)
            .await
            .with_context(|| format!("listing tasks of project {project_id}"))?;

        let mut report = MigrationReport::default();
        let mut candidates = Vec::new();
        for summary in summaries {
            match filter::eligibility(&summary, self.cache) {
                Eligibility::Eligible => candidates.push(summary),
                Eligibility::SectionHeader => {
                    tracing::debug!(task = %summary.id, name = %summary.name, "section header");
                    report
                        .outcomes
                        .push((summary.id, Outcome::Skipped(SkipReason::Filtered)));
                }
                Eligibility::AlreadyCached => {
                    tracing::debug!(task = %summary.id, "already copied");
                    report
                        .outcomes
                        .push((summary.id, Outcome::Skipped(SkipReason::Cached)));
                }
            }
        }

        if candidates.is_empty() {
            println!("Project {project_id} does not have any task to copy");
            return Ok(report);
        }

        for summary in candidates {
            let task = self
                .source
                .fetch_task_detail(&summary.id)
                .await
                .with_context(|| format!("task {}: fetching detail", summary.id))?;
            let outcome = self.migrate_task(&task, confirm).await?;
            report.outcomes.push((summary.id, outcome));
        }

        println!("Copied {} task(s) to {}", report.copied(), self.tracker.repo());
        Ok(report)
    }

    async fn migrate_task(&self, task: &TaskDetail, confirm: &mut dyn Confirm) -> Result<Outcome> {
        if task.completed && !self.options.copy_completed {
            println!("Skipping completed task: {}", task.name);
            return Ok(Outcome::Skipped(SkipReason::Completed));
        }

        if self.options.interactive
            && !confirm
                .confirm(task, self.tracker.repo())
                .with_context(|| format!("task {}: confirmation", task.id))?
        {
            println!("Task skipped.");
            return Ok(Outcome::Skipped(SkipReason::Declined));
        }

        let issue = copy::copy_task(self.source, self.tracker, task, self.options).await?;

        self.cache
            .upsert(
                &task.id,
                &task.name,
                task.completed,
                chrono::Local::now().naive_local(),
            )
            .with_context(|| format!("task {}: recording in cache", task.id))?;

        Ok(Outcome::Copied {
            issue_url: issue.url,
        })
    }
}
