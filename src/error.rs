//! Error types for buildmemo
//!
//! All modules use `BuildMemoResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for buildmemo operations
pub type BuildMemoResult<T> = Result<T, BuildMemoError>;

/// All errors that can occur in buildmemo
#[derive(Error, Debug)]
pub enum BuildMemoError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Plan errors
    #[error("Build plan not found: {0}")]
    PlanNotFound(PathBuf),

    #[error("Invalid build plan at {path}: {reason}")]
    PlanInvalid { path: PathBuf, reason: String },

    #[error("A task in stage {stage} panicked or was cancelled")]
    TaskAborted { stage: String },

    // Tool errors
    #[error("Version tool not found: {program}")]
    ToolNotFound { program: String },

    #[error("Version tool failed: {command}, exit code: {code}")]
    ToolFailed { command: String, code: i32 },

    #[error("Version tool timed out after {secs}s: {command}")]
    ToolTimeout { command: String, secs: u64 },

    #[error("Version tool produced no version line: {command}")]
    VersionNotReported { command: String },

    #[error("Version tool produced {} candidate version lines: {}", .lines.len(), .lines.join(", "))]
    AmbiguousVersion { lines: Vec<String> },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process terminated by signal")]
    ProcessSignaled,

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BuildMemoError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error, mapping a missing executable to `ToolNotFound`
    pub fn command_failed(
        program: impl Into<String>,
        command: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::ToolNotFound {
                program: program.into(),
            };
        }
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Whether the failure came from the external tool rather than buildmemo itself
    pub fn is_tool_failure(&self) -> bool {
        matches!(
            self,
            Self::ToolNotFound { .. }
                | Self::ToolFailed { .. }
                | Self::ToolTimeout { .. }
                | Self::VersionNotReported { .. }
                | Self::AmbiguousVersion { .. }
                | Self::CommandFailed { .. }
                | Self::ProcessSignaled
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ToolNotFound { .. } => {
                Some("Set tool.program in the config file or pass --program")
            }
            Self::ToolTimeout { .. } => Some("Raise tool.timeout_secs or set it to 0 to disable"),
            Self::VersionNotReported { .. } | Self::AmbiguousVersion { .. } => {
                Some("Check tool.diagnostic_prefix matches the tool's log line prefix")
            }
            Self::PlanNotFound(_) => Some("Pass the path to a build plan TOML file"),
            _ => None,
        }
    }
}
