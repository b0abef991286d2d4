//! Memoizing version task
//!
//! Looks the options up in the scope's version cache. On a hit the cached
//! version is reused and the tool is never started; on a miss the tool runs
//! once and its result is stored for the rest of the scope.

use crate::cache::BuildScope;
use crate::diagnostics::{MessageLog, Verbosity};
use crate::error::BuildMemoResult;
use crate::version::options::VersionOptions;
use crate::version::output::VersionParts;
use crate::version::tool::VersionSource;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of running the version task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionOutcome {
    /// The calculated or cached version
    pub version: String,
    /// Whether the version came from the scope cache
    pub cached: bool,
    /// Fingerprint of the cache key the version is stored under
    pub fingerprint: String,
    /// Semver components, when the version parses as semver
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts: Option<VersionParts>,
}

/// Version task bound to a scope, a version source and a message log
pub struct VersionTask<'a> {
    scope: &'a BuildScope,
    source: &'a dyn VersionSource,
    log: &'a dyn MessageLog,
}

impl<'a> VersionTask<'a> {
    pub fn new(
        scope: &'a BuildScope,
        source: &'a dyn VersionSource,
        log: &'a dyn MessageLog,
    ) -> Self {
        Self { scope, source, log }
    }

    /// Return the version for `options`, running the source at most once per scope
    pub async fn execute(&self, options: &VersionOptions) -> BuildMemoResult<VersionOutcome> {
        let key = options.cache_key();
        let fingerprint = key.fingerprint();
        let importance = Verbosity::importance_of(options.verbosity.as_deref());

        let lookup = self
            .scope
            .versions()
            .get_or_try_insert_with(key, || {
                debug!(
                    "No cached version for key {}, running {}",
                    fingerprint,
                    self.source.source_name()
                );
                self.source.calculate(options, self.log)
            })
            .await?;

        let cached = lookup.is_hit();
        let version = lookup.into_value();
        if cached {
            self.log.message(
                importance,
                &format!("Skipping tool execution and using cached version {}", version),
            );
        } else {
            debug!("Cached version {} under key {}", version, fingerprint);
        }

        Ok(VersionOutcome {
            parts: VersionParts::parse(&version),
            version,
            cached,
            fingerprint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Importance, MemoryLog};
    use crate::error::BuildMemoError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Returns a fixed version and counts how often it was asked
    struct CountingSource {
        version: String,
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(version: &str) -> Self {
            Self {
                version: version.to_string(),
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new("")
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VersionSource for CountingSource {
        async fn calculate(
            &self,
            _options: &VersionOptions,
            log: &dyn MessageLog,
        ) -> BuildMemoResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            log.message(Importance::Low, "MinVer: calculating");
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            if self.fail {
                return Err(BuildMemoError::ToolFailed {
                    command: "counting".to_string(),
                    code: 1,
                });
            }
            Ok(self.version.clone())
        }

        fn source_name(&self) -> String {
            "counting".to_string()
        }
    }

    fn options(tag_prefix: &str) -> VersionOptions {
        VersionOptions {
            auto_increment: Some("minor".to_string()),
            build_metadata: None,
            ignore_height: Some("true".to_string()),
            tag_prefix: Some(tag_prefix.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn second_identical_call_uses_cache() {
        let scope = BuildScope::begin();
        let source = CountingSource::new("1.2.0");
        let log = MemoryLog::new();
        let task = VersionTask::new(&scope, &source, &log);

        let first = task.execute(&options("v")).await.unwrap();
        assert!(!first.cached);
        assert_eq!(first.version, "1.2.0");
        assert!(!log.contains("using cached version"));

        let second = task.execute(&options("v")).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.version, first.version);
        assert_eq!(second.fingerprint, first.fingerprint);
        assert_eq!(second.parts, first.parts);

        assert_eq!(source.calls(), 1);
        assert!(log.contains("using cached version 1.2.0"));
    }

    #[tokio::test]
    async fn hit_skips_source_side_effects() {
        let scope = BuildScope::begin();
        let source = CountingSource::new("1.2.0");
        let log = MemoryLog::new();
        let task = VersionTask::new(&scope, &source, &log);

        task.execute(&options("v")).await.unwrap();
        let before = log.messages().len();
        task.execute(&options("v")).await.unwrap();

        let after = log.messages();
        assert_eq!(after.len(), before + 1);
        assert!(after[before].1.contains("1.2.0"));
    }

    #[tokio::test]
    async fn different_tag_prefix_is_an_independent_slot() {
        let scope = BuildScope::begin();
        let source = CountingSource::new("1.2.0");
        let log = MemoryLog::new();
        let task = VersionTask::new(&scope, &source, &log);

        task.execute(&options("v")).await.unwrap();
        let other = task.execute(&options("release-")).await.unwrap();

        assert!(!other.cached);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn new_scope_recomputes() {
        let source = CountingSource::new("1.2.0");
        let log = MemoryLog::new();

        let scope = BuildScope::begin();
        VersionTask::new(&scope, &source, &log)
            .execute(&options("v"))
            .await
            .unwrap();
        scope.end().await;

        let scope = BuildScope::begin();
        let outcome = VersionTask::new(&scope, &source, &log)
            .execute(&options("v"))
            .await
            .unwrap();

        assert!(!outcome.cached);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn failure_propagates_and_is_not_cached() {
        let scope = BuildScope::begin();
        let source = CountingSource::failing();
        let log = MemoryLog::new();
        let task = VersionTask::new(&scope, &source, &log);

        let err = task.execute(&options("v")).await.unwrap_err();
        assert!(matches!(err, BuildMemoError::ToolFailed { code: 1, .. }));
        assert!(scope.versions().is_empty().await);

        task.execute(&options("v")).await.unwrap_err();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn hit_message_uses_verbosity_importance() {
        let scope = BuildScope::begin();
        let source = CountingSource::new("1.2.0");
        let log = MemoryLog::new();
        let task = VersionTask::new(&scope, &source, &log);
        let detailed = VersionOptions {
            verbosity: Some("d".to_string()),
            ..options("v")
        };

        task.execute(&detailed).await.unwrap();
        task.execute(&detailed).await.unwrap();

        let (importance, text) = log.messages().pop().unwrap();
        assert_eq!(importance, Importance::High);
        assert!(text.contains("1.2.0"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_tasks_share_one_calculation() {
        let scope = Arc::new(BuildScope::begin());
        let source = Arc::new(CountingSource::new("1.2.0"));
        let log = Arc::new(MemoryLog::new());

        let mut handles = Vec::new();
        for _ in 0..6 {
            let scope = Arc::clone(&scope);
            let source = Arc::clone(&source);
            let log = Arc::clone(&log);
            handles.push(tokio::spawn(async move {
                VersionTask::new(&scope, source.as_ref(), log.as_ref())
                    .execute(&options("v"))
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().version, "1.2.0");
        }
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn parts_are_reported() {
        let scope = BuildScope::begin();
        let source = CountingSource::new("2.0.0-alpha.0.4");
        let log = MemoryLog::new();

        let outcome = VersionTask::new(&scope, &source, &log)
            .execute(&VersionOptions::default())
            .await
            .unwrap();

        let parts = outcome.parts.unwrap();
        assert_eq!(parts.major, 2);
        assert_eq!(parts.pre_release, "alpha.0.4");
    }
}
