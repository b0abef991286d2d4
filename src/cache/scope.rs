//! Build scope lifecycle
//!
//! A `BuildScope` owns every cache that lives for one build. It is created
//! when the build starts and consumed when it ends; nothing survives into
//! the next scope.

use crate::cache::memo::MemoCache;
use crate::version::VersionKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Caches scoped to a single build
pub struct BuildScope {
    id: Uuid,
    started_at: DateTime<Utc>,
    values: MemoCache<String, Option<String>>,
    versions: MemoCache<VersionKey, String>,
}

/// What a scope held when it ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeSummary {
    /// Scope identifier
    pub id: Uuid,
    /// When the scope began
    pub started_at: DateTime<Utc>,
    /// When the scope ended
    pub ended_at: DateTime<Utc>,
    /// Number of key/value entries stored
    pub values: usize,
    /// Number of distinct versions computed
    pub versions: usize,
}

impl ScopeSummary {
    /// Wall-clock duration of the scope
    pub fn duration(&self) -> chrono::Duration {
        self.ended_at - self.started_at
    }
}

impl BuildScope {
    /// Begin a new, empty scope
    pub fn begin() -> Self {
        let scope = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            values: MemoCache::new(),
            versions: MemoCache::new(),
        };
        debug!("Build scope {} started", scope.id);
        scope
    }

    /// Scope identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the scope began
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Key/value cache used by the cache-set and cache-get tasks.
    ///
    /// The value is optional so that a key stored without a value is still
    /// a hit.
    pub fn values(&self) -> &MemoCache<String, Option<String>> {
        &self.values
    }

    /// Version cache used by the version task
    pub fn versions(&self) -> &MemoCache<VersionKey, String> {
        &self.versions
    }

    /// End the scope, dropping every entry
    pub async fn end(self) -> ScopeSummary {
        let summary = ScopeSummary {
            id: self.id,
            started_at: self.started_at,
            ended_at: Utc::now(),
            values: self.values.len().await,
            versions: self.versions.len().await,
        };
        debug!(
            "Build scope {} ended ({} values, {} versions)",
            summary.id, summary.values, summary.versions
        );
        summary
    }
}

impl Default for BuildScope {
    fn default() -> Self {
        Self::begin()
    }
}
