//! Build-scoped memoization
//!
//! Results are cached in memory for the lifetime of one build scope and
//! keyed by the exact inputs that produced them.
//!
//! # Lookup outcomes
//!
//! | Outcome | Meaning |
//! |---------|---------|
//! | Absent | No entry for the key in this scope, compute it |
//! | Hit | Entry present, reuse it without recomputing |
//! | Miss | Computed by this caller and stored for later lookups |

pub mod memo;
pub mod scope;

pub use memo::{Lookup, MemoCache};
pub use scope::{BuildScope, ScopeSummary};
