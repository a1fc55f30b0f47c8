//! Record of tasks already copied to GitHub.
//!
//! The whole file is loaded, mutated and written back on every call. Reads are
//! best-effort (a missing or corrupt file is an empty cache); writes are strict
//! and return `CacheError` so a lost record never goes unnoticed.
//!
//! Two concurrent runs against the same file are last-writer-wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::task::TaskId;

pub const DEFAULT_CACHE_PATH: &str = ".asanagh.cache";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub name: String,
    pub copied_at: String,
    pub completed_state: bool,
}

/// Entries are kept as raw JSON so one hand-edited or foreign record can't
/// hide the others; only membership is ever checked.
pub type Cache = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to write cache {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode cache: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct TaskCache {
    enabled: bool,
    path: PathBuf,
}

impl TaskCache {
    pub fn new(enabled: bool, path: impl Into<PathBuf>) -> Self {
        Self {
            enabled,
            path: path.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Cache {
        if !self.enabled {
            return Cache::new();
        }
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.path.display(), error = %e, "cache unreadable, treating as empty");
                }
                return Cache::new();
            }
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "cache unparsable, treating as empty");
            Cache::new()
        })
    }

    pub fn save(&self, cache: &Cache) -> Result<(), CacheError> {
        if !self.enabled {
            return Ok(());
        }
        let json = serde_json::to_string_pretty(cache)?;
        let write_err = |source: std::io::Error| CacheError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        // Write next to the target and rename so a crash never leaves half a file.
        let tmp = tmp_path(&self.path);
        std::fs::write(&tmp, json).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            write_err(e)
        })?;
        Ok(())
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.load().contains_key(id.as_str())
    }

    pub fn upsert(
        &self,
        id: &TaskId,
        name: &str,
        completed_state: bool,
        now: NaiveDateTime,
    ) -> Result<(), CacheError> {
        if !self.enabled {
            return Ok(());
        }
        let mut cache = self.load();
        let record = CacheRecord {
            name: name.to_string(),
            copied_at: isoformat(now),
            completed_state,
        };
        cache.insert(id.as_str().to_string(), serde_json::to_value(record)?);
        self.save(&cache)?;
        tracing::debug!(task = %id, path = %self.path.display(), "cache record written");
        Ok(())
    }

    /// The typed record for `id`, if present and well-formed.
    #[cfg(test)]
    pub fn record(&self, id: &TaskId) -> Option<CacheRecord> {
        self.load()
            .remove(id.as_str())
            .and_then(|v| serde_json::from_value(v).ok())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// ISO-8601 without offset; fractional seconds only when non-zero.
pub fn isoformat(t: NaiveDateTime) -> String {
    if t.nanosecond() / 1_000 == 0 {
        t.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        t.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}
