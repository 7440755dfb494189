//! Output module for accepted records and run reports
//!
//! This module handles:
//! - Batching accepted records in front of the record store
//! - Summarizing a finished run
//! - Reporting statistics over a stored dataset

mod sink;
pub mod stats;

pub use sink::ResultSink;
pub use stats::{
    compute_statistics, load_statistics, print_statistics, print_summary, DatasetStatistics,
    RunSummary,
};
