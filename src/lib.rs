//! buildmemo - build-scoped memoization
//!
//! Caches the result of an external version tool for the lifetime of one
//! build, keyed by every option passed to the tool, and provides a
//! key/value cache with the same lifetime.

pub mod cache;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod plan;
pub mod version;

pub use error::{BuildMemoError, BuildMemoResult};
