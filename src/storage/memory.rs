//! In-memory record store

use crate::extract::JobRecord;
use crate::storage::traits::{RecordStore, StorageResult};
use std::sync::{Arc, Mutex, PoisonError};

/// Record store backed by a shared vector
///
/// Clones share the same buffer, so a caller can keep one handle and pass
/// another to the crawler, then inspect what was saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<JobRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the records persisted so far
    pub fn records(&self) -> Vec<JobRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RecordStore for MemoryStore {
    fn persist_batch(&mut self, records: &[JobRecord]) -> StorageResult<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(records);
        Ok(())
    }

    fn load_all(&self) -> StorageResult<Vec<JobRecord>> {
        Ok(self.records())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
