//! Storage module for persisting job records
//!
//! This module handles every dataset backend the result sink can write to:
//! - JSON Lines files (the default dataset format)
//! - SQLite databases
//! - An in-memory buffer for embedding and tests
//!
//! All backends can read their records back for dataset statistics.

mod jsonl;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use jsonl::JsonLinesStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{RecordStore, StorageError, StorageResult};

use crate::config::{OutputConfig, OutputFormat};
use std::path::Path;

/// Opens the record store selected by the output configuration
///
/// # Arguments
///
/// * `config` - Output format and path
///
/// # Returns
///
/// * `Ok(Box<dyn RecordStore>)` - The opened store
/// * `Err(StorageError)` - The file or database could not be opened
pub fn open_store(config: &OutputConfig) -> StorageResult<Box<dyn RecordStore>> {
    let path = Path::new(&config.path);
    let store: Box<dyn RecordStore> = match config.format {
        OutputFormat::Jsonl => Box::new(JsonLinesStore::open(path)?),
        OutputFormat::Sqlite => Box::new(SqliteStore::open(path)?),
    };

    tracing::debug!("Opened record store {}", store.describe());
    Ok(store)
}
