//! State module for tracking run progress
//!
//! # Components
//!
//! - `RunState`: the shared owner of dedup keys and run counters
//! - `DedupKey`: identity of a frontier task within one run
//! - `TaskError` / `FailureKind`: per-task failure taxonomy

mod failure;
mod run_state;

// Re-export main types
pub use failure::{FailureKind, TaskError};
pub use run_state::{Admission, DedupKey, RunCounters, RunState};
