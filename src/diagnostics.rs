//! Task diagnostics
//!
//! Tasks report through a `MessageLog`. Messages carry an importance that
//! is derived from the verbosity option the task was given: `detailed` and
//! `diagnostic` promote them to high importance, anything else keeps them
//! low.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tracing::{debug, info};

/// Recognized verbosity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Quiet,
    Minimal,
    Normal,
    Detailed,
    Diagnostic,
}

impl Verbosity {
    /// Parse a verbosity name or its short alias. Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "quiet" | "q" => Some(Self::Quiet),
            "minimal" | "m" => Some(Self::Minimal),
            "normal" | "n" => Some(Self::Normal),
            "detailed" | "d" => Some(Self::Detailed),
            "diagnostic" | "diag" => Some(Self::Diagnostic),
            _ => None,
        }
    }

    /// Importance of task messages at this verbosity
    pub fn importance(self) -> Importance {
        match self {
            Self::Detailed | Self::Diagnostic => Importance::High,
            Self::Quiet | Self::Minimal | Self::Normal => Importance::Low,
        }
    }

    /// Importance for a raw, possibly unset or unrecognized, verbosity option
    pub fn importance_of(value: Option<&str>) -> Importance {
        value
            .and_then(Self::parse)
            .map(Self::importance)
            .unwrap_or(Importance::Low)
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Quiet => "quiet",
            Self::Minimal => "minimal",
            Self::Normal => "normal",
            Self::Detailed => "detailed",
            Self::Diagnostic => "diagnostic",
        };
        write!(f, "{}", name)
    }
}

/// Message importance used for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    High,
    Low,
}

/// Sink for human-readable task messages
pub trait MessageLog: Send + Sync {
    /// Record a message at the given importance
    fn message(&self, importance: Importance, text: &str);
}

/// Routes messages to `tracing`: high importance at info, low at debug
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl MessageLog for TracingLog {
    fn message(&self, importance: Importance, text: &str) {
        match importance {
            Importance::High => info!("{}", text),
            Importance::Low => debug!("{}", text),
        }
    }
}

/// Keeps messages in memory, in the order they were logged
#[derive(Debug, Default)]
pub struct MemoryLog {
    messages: Mutex<Vec<(Importance, String)>>,
}

impl MemoryLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every message logged so far
    pub fn messages(&self) -> Vec<(Importance, String)> {
        match self.messages.lock() {
            Ok(messages) => messages.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Whether any message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.messages()
            .iter()
            .any(|(_, text)| text.contains(needle))
    }
}

impl MessageLog for MemoryLog {
    fn message(&self, importance: Importance, text: &str) {
        let mut messages = match self.messages.lock() {
            Ok(messages) => messages,
            Err(poisoned) => poisoned.into_inner(),
        };
        messages.push((importance, text.to_string()));
    }
}
