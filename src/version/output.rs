//! Classification of version tool output
//!
//! The tool writes its own log lines to stdout with a fixed prefix. The one
//! stdout line without that prefix is the version.

use crate::error::{BuildMemoError, BuildMemoResult};
use serde::{Deserialize, Serialize};

/// Default prefix of the tool's log lines
pub const DEFAULT_DIAGNOSTIC_PREFIX: &str = "MinVer";

/// Kind of a single stdout line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Tool log line, forwarded unmodified
    Diagnostic,
    /// Candidate version line
    Version,
    /// Blank line, ignored
    Blank,
}

/// Collects tool stdout and picks out the version line
#[derive(Debug, Clone)]
pub struct VersionCollector {
    prefix: String,
    candidates: Vec<String>,
}

impl VersionCollector {
    /// Create a collector that treats lines starting with `prefix` as diagnostics
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            candidates: Vec::new(),
        }
    }

    /// Classify a line without recording it
    pub fn classify(&self, line: &str) -> LineKind {
        if line.trim().is_empty() {
            LineKind::Blank
        } else if line.starts_with(&self.prefix) {
            LineKind::Diagnostic
        } else {
            LineKind::Version
        }
    }

    /// Record one stdout line.
    ///
    /// Returns the line back when it is a diagnostic that should be forwarded.
    pub fn feed(&mut self, line: String) -> Option<String> {
        match self.classify(&line) {
            LineKind::Diagnostic => Some(line),
            LineKind::Version => {
                self.candidates.push(line.trim().to_string());
                None
            }
            LineKind::Blank => None,
        }
    }

    /// Finish collecting. Exactly one version line is required.
    pub fn finish(self, command: &str) -> BuildMemoResult<String> {
        let mut candidates = self.candidates;
        match candidates.len() {
            0 => Err(BuildMemoError::VersionNotReported {
                command: command.to_string(),
            }),
            1 => Ok(candidates.remove(0)),
            _ => Err(BuildMemoError::AmbiguousVersion { lines: candidates }),
        }
    }
}

/// Semantic version components of a reported version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionParts {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pre_release: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub build_metadata: String,
}

impl VersionParts {
    /// Split a version string into its components, if it is valid semver
    pub fn parse(version: &str) -> Option<Self> {
        let parsed = semver::Version::parse(version).ok()?;
        Some(Self {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            pre_release: parsed.pre.to_string(),
            build_metadata: parsed.build.to_string(),
        })
    }
}
