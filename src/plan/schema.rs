//! Build plan file format
//!
//! ```toml
//! [defaults]
//! tag_prefix = "v"
//!
//! [[stage]]
//! name = "version"
//!
//! [[stage.task]]
//! kind = "version"
//! auto_increment = "minor"
//!
//! [[stage.task]]
//! kind = "cache-set"
//! key = "channel"
//! value = "stable"
//! ```

use crate::error::{BuildMemoError, BuildMemoResult};
use crate::version::VersionOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tokio::fs;

/// A build plan: stages run in order, tasks within a stage run concurrently
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Plan {
    /// Version options applied to every version task in the plan
    pub defaults: VersionOptions,

    /// Ordered stages
    #[serde(rename = "stage")]
    pub stages: Vec<Stage>,
}

/// A group of tasks that run concurrently
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Stage {
    /// Stage name, used in reports
    pub name: String,

    /// Tasks in this stage
    #[serde(rename = "task")]
    pub tasks: Vec<TaskSpec>,
}

/// A single task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TaskSpec {
    /// Store a value for the rest of the build
    CacheSet {
        key: String,
        #[serde(default)]
        value: Option<String>,
    },

    /// Read a value stored earlier in the build
    CacheGet { key: String },

    /// Calculate (or reuse) a version
    Version(VersionOptions),
}

impl TaskSpec {
    /// Task kind as written in the plan
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CacheSet { .. } => "cache-set",
            Self::CacheGet { .. } => "cache-get",
            Self::Version(_) => "version",
        }
    }
}

impl fmt::Display for TaskSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CacheSet { key, .. } | Self::CacheGet { key } => {
                write!(f, "{} {}", self.kind(), key)
            }
            Self::Version(options) => write!(
                f,
                "version {}",
                options.cache_key().fingerprint()
            ),
        }
    }
}

impl Plan {
    /// Parse a plan from TOML text
    pub fn parse(content: &str, path: &Path) -> BuildMemoResult<Self> {
        let mut plan: Plan = toml::from_str(content).map_err(|e| BuildMemoError::PlanInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        for (index, stage) in plan.stages.iter_mut().enumerate() {
            if stage.name.is_empty() {
                stage.name = format!("stage-{}", index + 1);
            }
        }

        Ok(plan)
    }

    /// Load a plan file
    pub async fn load(path: &Path) -> BuildMemoResult<Self> {
        if !path.exists() {
            return Err(BuildMemoError::PlanNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            BuildMemoError::io(format!("reading plan from {}", path.display()), e)
        })?;

        Self::parse(&content, path)
    }

    /// Total number of tasks across all stages
    pub fn task_count(&self) -> usize {
        self.stages.iter().map(|s| s.tasks.len()).sum()
    }
}
