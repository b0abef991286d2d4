//! Version calculation via an external tool, memoized per build scope

pub mod options;
pub mod output;
pub mod task;
pub mod tool;

pub use options::{VersionKey, VersionOptions};
pub use output::{VersionCollector, VersionParts, DEFAULT_DIAGNOSTIC_PREFIX};
pub use task::{VersionOutcome, VersionTask};
pub use tool::{ExternalTool, VersionSource};
