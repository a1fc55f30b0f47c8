use crate::cache::TaskCache;
use crate::model::task::TaskSummary;

/// Why a listed task is or isn't a candidate for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    /// Name ends with `:`, the convention for section headers.
    SectionHeader,
    AlreadyCached,
}

pub fn eligibility(task: &TaskSummary, cache: &TaskCache) -> Eligibility {
    if task.name.ends_with(':') {
        Eligibility::SectionHeader
    } else if cache.contains(&task.id) {
        Eligibility::AlreadyCached
    } else {
        Eligibility::Eligible
    }
}

/// Cheap check on the listing summary, run before any detail fetch.
pub fn could_copy(task: &TaskSummary, cache: &TaskCache) -> bool {
    eligibility(task, cache) == Eligibility::Eligible
}
