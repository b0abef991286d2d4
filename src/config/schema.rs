//! Configuration schema for buildmemo
//!
//! Configuration is stored at `~/.config/buildmemo/config.toml`

use crate::version::{VersionOptions, DEFAULT_DIAGNOSTIC_PREFIX};
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Version tool settings
    pub tool: ToolConfig,

    /// Version options applied when a task or the command line leaves them unset
    pub defaults: VersionOptions,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

impl GeneralConfig {
    /// Whether logs should be emitted as JSON
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

/// External version tool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Executable to run
    pub program: String,

    /// Arguments placed before the option flags (e.g. a path to a tool assembly)
    pub args: Vec<String>,

    /// Stdout lines starting with this prefix are tool diagnostics, not the version
    pub diagnostic_prefix: String,

    /// Kill the tool after this many seconds (0 = no timeout)
    pub timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: "minver".to_string(),
            args: vec![],
            diagnostic_prefix: DEFAULT_DIAGNOSTIC_PREFIX.to_string(),
            timeout_secs: 300,
        }
    }
}
