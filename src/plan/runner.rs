//! Build plan execution
//!
//! One plan run is one build scope. Stages execute in order; the tasks of a
//! stage are spawned together and share the scope, so identical version
//! tasks in the same stage still calculate only once.

use crate::cache::{BuildScope, ScopeSummary};
use crate::diagnostics::MessageLog;
use crate::error::{BuildMemoError, BuildMemoResult};
use crate::plan::schema::{Plan, TaskSpec};
use crate::version::{VersionOptions, VersionOutcome, VersionSource, VersionTask};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// What a task produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TaskOutput {
    /// Value stored
    CacheSet { key: String },

    /// Lookup result. `found` is false when the key was never stored.
    CacheGet {
        key: String,
        found: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    /// Version calculated or reused
    Version(VersionOutcome),
}

/// Report line for one task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReport {
    /// Stage the task belongs to
    pub stage: String,
    /// Position of the task within its stage
    pub index: usize,
    /// Task output
    pub output: TaskOutput,
}

/// Result of running a whole plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanReport {
    /// Scope the plan ran in
    pub scope: ScopeSummary,
    /// Task reports in plan order
    pub tasks: Vec<TaskReport>,
}

impl PlanReport {
    /// Number of version tasks served from the cache
    pub fn cache_hits(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| matches!(&t.output, TaskOutput::Version(v) if v.cached))
            .count()
    }
}

/// Runs plans against a version source
pub struct PlanRunner {
    source: Arc<dyn VersionSource>,
    log: Arc<dyn MessageLog>,
    defaults: VersionOptions,
}

impl PlanRunner {
    /// Create a runner. `defaults` sit underneath the plan's own defaults.
    pub fn new(
        source: Arc<dyn VersionSource>,
        log: Arc<dyn MessageLog>,
        defaults: VersionOptions,
    ) -> Self {
        Self {
            source,
            log,
            defaults,
        }
    }

    /// Run every stage of `plan` inside a fresh scope
    ///
    /// The first failing task aborts the rest of its stage and the error is
    /// returned unchanged.
    pub async fn run(&self, plan: &Plan) -> BuildMemoResult<PlanReport> {
        let scope = Arc::new(BuildScope::begin());
        let defaults = plan.defaults.with_defaults(&self.defaults);
        info!(
            "Running {} task(s) in {} stage(s), scope {}",
            plan.task_count(),
            plan.stages.len(),
            scope.id()
        );

        let mut reports = Vec::with_capacity(plan.task_count());

        for stage in &plan.stages {
            debug!("Stage {}: {} task(s)", stage.name, stage.tasks.len());
            let mut set = JoinSet::new();

            for (index, task) in stage.tasks.iter().enumerate() {
                let task = match task {
                    TaskSpec::Version(options) => {
                        TaskSpec::Version(options.with_defaults(&defaults))
                    }
                    other => other.clone(),
                };
                let scope = Arc::clone(&scope);
                let source = Arc::clone(&self.source);
                let log = Arc::clone(&self.log);

                set.spawn(async move {
                    let output = run_task(&scope, source.as_ref(), log.as_ref(), &task).await;
                    (index, task, output)
                });
            }

            let mut stage_reports = Vec::with_capacity(stage.tasks.len());
            while let Some(joined) = set.join_next().await {
                let (index, task, output) = joined.map_err(|_| BuildMemoError::TaskAborted {
                    stage: stage.name.clone(),
                })?;
                let output = output?;
                debug!("{} finished: {:?}", task, output);
                stage_reports.push(TaskReport {
                    stage: stage.name.clone(),
                    index,
                    output,
                });
            }

            stage_reports.sort_by_key(|r| r.index);
            reports.extend(stage_reports);
        }

        let scope = Arc::try_unwrap(scope).map_err(|_| {
            BuildMemoError::Internal("build scope still shared after all stages".to_string())
        })?;
        let summary = scope.end().await;

        Ok(PlanReport {
            scope: summary,
            tasks: reports,
        })
    }
}

/// Execute a single task inside `scope`
pub async fn run_task(
    scope: &BuildScope,
    source: &dyn VersionSource,
    log: &dyn MessageLog,
    task: &TaskSpec,
) -> BuildMemoResult<TaskOutput> {
    match task {
        TaskSpec::CacheSet { key, value } => {
            scope.values().put(key.clone(), value.clone()).await;
            debug!("Stored {} for the rest of the build", key);
            Ok(TaskOutput::CacheSet { key: key.clone() })
        }
        TaskSpec::CacheGet { key } => {
            let entry = scope.values().get(key).await;
            Ok(TaskOutput::CacheGet {
                key: key.clone(),
                found: entry.is_some(),
                value: entry.flatten(),
            })
        }
        TaskSpec::Version(options) => {
            let outcome = VersionTask::new(scope, source, log).execute(options).await?;
            Ok(TaskOutput::Version(outcome))
        }
    }
}
