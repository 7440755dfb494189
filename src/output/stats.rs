//! Run and dataset statistics
//!
//! This module provides the end-of-run summary built from the run counters
//! and the `--stats` report computed from a record store.

use crate::extract::JobRecord;
use crate::state::RunCounters;
use crate::storage::{RecordStore, StorageResult};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// Number of entries shown in each ranking
const TOP_N: usize = 5;

/// Outcome of one crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Target record count
    pub target: usize,

    /// Records accepted by the result sink
    pub saved: usize,

    /// Records written to the store
    pub persisted: usize,

    /// List pages whose discovery step completed
    pub list_pages: usize,

    /// Detail tasks enqueued over the run
    pub details_enqueued: usize,

    /// Tasks rejected as duplicates
    pub duplicates: usize,

    /// Detail pages discarded for lack of a title
    pub discarded: usize,

    /// Tasks abandoned after failures
    pub failed: usize,

    /// True when the run was interrupted before its natural end
    pub cancelled: bool,

    pub elapsed: Duration,
}

impl RunSummary {
    pub fn from_counters(
        target: usize,
        counters: RunCounters,
        persisted: usize,
        cancelled: bool,
        elapsed: Duration,
    ) -> Self {
        Self {
            target,
            saved: counters.saved,
            persisted,
            list_pages: counters.list_pages,
            details_enqueued: counters.details_enqueued,
            duplicates: counters.duplicates,
            discarded: counters.discarded,
            failed: counters.failed,
            cancelled,
            elapsed,
        }
    }

    pub fn target_reached(&self) -> bool {
        self.saved >= self.target
    }
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Run Summary ===\n");
    println!("  Saved: {} / {}", summary.saved, summary.target);
    println!("  Persisted: {}", summary.persisted);
    println!("  List pages: {}", summary.list_pages);
    println!("  Detail pages enqueued: {}", summary.details_enqueued);
    println!("  Duplicates skipped: {}", summary.duplicates);
    println!("  Discarded (no title): {}", summary.discarded);
    println!("  Failed: {}", summary.failed);
    println!("  Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
    if summary.cancelled {
        println!("\nRun was interrupted before completion.");
    }
}

/// Dataset statistics summary
#[derive(Debug, Clone, Default)]
pub struct DatasetStatistics {
    pub total_records: usize,

    /// Records whose `job_id` could be derived
    pub with_job_id: usize,

    pub with_company: usize,
    pub with_salary: usize,
    pub with_description: usize,

    /// Most frequent companies, descending
    pub top_companies: Vec<(String, usize)>,

    /// Most frequent locations, descending
    pub top_locations: Vec<(String, usize)>,

    pub first_scraped_at: Option<DateTime<Utc>>,
    pub last_scraped_at: Option<DateTime<Utc>>,
}

/// Loads statistics from a record store
///
/// # Arguments
///
/// * `store` - The store to read back
///
/// # Returns
///
/// * `Ok(DatasetStatistics)` - Successfully computed statistics
/// * `Err(StorageError)` - Failed to read the store
pub fn load_statistics(store: &dyn RecordStore) -> StorageResult<DatasetStatistics> {
    Ok(compute_statistics(&store.load_all()?))
}

/// Computes statistics over a slice of records
pub fn compute_statistics(records: &[JobRecord]) -> DatasetStatistics {
    let mut companies: HashMap<&str, usize> = HashMap::new();
    let mut locations: HashMap<&str, usize> = HashMap::new();

    for record in records {
        if let Some(company) = record.company.as_deref() {
            *companies.entry(company).or_default() += 1;
        }
        if !record.location.is_empty() {
            *locations.entry(record.location.as_str()).or_default() += 1;
        }
    }

    DatasetStatistics {
        total_records: records.len(),
        with_job_id: records.iter().filter(|r| r.job_id.is_some()).count(),
        with_company: records.iter().filter(|r| r.company.is_some()).count(),
        with_salary: records.iter().filter(|r| r.salary.is_some()).count(),
        with_description: records
            .iter()
            .filter(|r| !r.description_text.is_empty())
            .count(),
        top_companies: top_entries(companies),
        top_locations: top_entries(locations),
        first_scraped_at: records.iter().map(|r| r.scraped_at).min(),
        last_scraped_at: records.iter().map(|r| r.scraped_at).max(),
    }
}

fn top_entries(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<_> = counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    // Ties break alphabetically so the report is stable
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(TOP_N);
    entries
}

fn percentage(part: usize, total: usize) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");

    println!("Overview:");
    println!("  Total records: {}", stats.total_records);
    for (label, count) in [
        ("With job id", stats.with_job_id),
        ("With company", stats.with_company),
        ("With salary", stats.with_salary),
        ("With description", stats.with_description),
    ] {
        println!(
            "  {}: {} ({:.1}%)",
            label,
            count,
            percentage(count, stats.total_records)
        );
    }
    println!();

    if !stats.top_companies.is_empty() {
        println!("Top Companies:");
        for (company, count) in &stats.top_companies {
            println!("  {}: {}", company, count);
        }
        println!();
    }

    if !stats.top_locations.is_empty() {
        println!("Top Locations:");
        for (location, count) in &stats.top_locations {
            println!("  {}: {}", location, count);
        }
        println!();
    }

    if let (Some(first), Some(last)) = (stats.first_scraped_at, stats.last_scraped_at) {
        println!("Scraped between {} and {}", first.to_rfc3339(), last.to_rfc3339());
    }
}
