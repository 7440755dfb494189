//! Storage traits and error types
//!
//! This module defines the trait interface for record store backends and
//! associated error types.

use crate::extract::JobRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt record at {location}: {message}")]
    CorruptRecord { location: String, message: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for record store implementations
///
/// The result sink is the only writer; it hands over records in batches and
/// holds the store behind a lock, so implementations need not synchronize
/// internally.
pub trait RecordStore: Send {
    /// Appends a batch of records
    ///
    /// # Arguments
    ///
    /// * `records` - Records in the order they were accepted
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Every record in the batch was written
    /// * `Err(StorageError)` - The batch could not be written; the caller keeps it
    fn persist_batch(&mut self, records: &[JobRecord]) -> StorageResult<()>;

    /// Reads back every record in the store, in insertion order
    fn load_all(&self) -> StorageResult<Vec<JobRecord>>;

    /// Human-readable location of the store, used in log lines
    fn describe(&self) -> String;
}
