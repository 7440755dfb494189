//! Result sink
//!
//! Collects accepted records into batches and hands each full batch to the
//! record store. The sink is the only place `saved` is incremented, and it
//! stops accepting records once the target is met.

use crate::extract::JobRecord;
use crate::state::RunState;
use crate::storage::{RecordStore, StorageResult};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Saved-count interval between progress log lines
const PROGRESS_INTERVAL: usize = 10;

struct SinkInner {
    batch: Vec<JobRecord>,
    store: Box<dyn RecordStore>,
    persisted: usize,
}

/// Batched writer in front of a record store
pub struct ResultSink {
    state: Arc<RunState>,
    batch_size: usize,
    inner: Mutex<SinkInner>,
}

impl ResultSink {
    /// Creates a sink
    ///
    /// # Arguments
    ///
    /// * `store` - Backend that receives full batches
    /// * `state` - Shared run state owning the saved counter
    /// * `batch_size` - Records per batch; values below 1 are treated as 1
    pub fn new(store: Box<dyn RecordStore>, state: Arc<RunState>, batch_size: usize) -> Self {
        Self {
            state,
            batch_size: batch_size.max(1),
            inner: Mutex::new(SinkInner {
                batch: Vec::with_capacity(batch_size.max(1)),
                store,
                persisted: 0,
            }),
        }
    }

    /// Accepts a record
    ///
    /// The batch is flushed when it reaches the batch size or when this
    /// record meets the target. A failed flush keeps the batch for the next
    /// attempt and does not stop the run.
    ///
    /// # Returns
    ///
    /// * `true` - The record was accepted and counted
    /// * `false` - The target was already met; the record was dropped
    pub async fn record(&self, job: JobRecord) -> bool {
        let mut inner = self.inner.lock().await;

        let Some(saved) = self.state.record_saved() else {
            tracing::debug!("Target already met, dropping {}", job.url);
            return false;
        };

        tracing::debug!("Accepted {} ({})", job.title, job.url);
        inner.batch.push(job);

        let target = self.state.target();
        if saved % PROGRESS_INTERVAL == 0 || saved == target {
            tracing::info!("Saved {} jobs", saved);
        }

        if inner.batch.len() >= self.batch_size || saved >= target {
            if let Err(e) = Self::flush(&mut inner) {
                tracing::error!(
                    "Failed to persist batch of {} records: {}",
                    inner.batch.len(),
                    e
                );
            }
        }

        true
    }

    /// Flushes any partial batch
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Total records persisted by this sink over the run
    /// * `Err(StorageError)` - The final batch could not be written
    pub async fn finish(&self) -> StorageResult<usize> {
        let mut inner = self.inner.lock().await;
        Self::flush(&mut inner)?;
        Ok(inner.persisted)
    }

    /// Description of the underlying store
    pub async fn describe(&self) -> String {
        self.inner.lock().await.store.describe()
    }

    fn flush(inner: &mut SinkInner) -> StorageResult<()> {
        if inner.batch.is_empty() {
            return Ok(());
        }

        inner.store.persist_batch(&inner.batch)?;
        inner.persisted += inner.batch.len();
        tracing::debug!("Persisted batch of {} records", inner.batch.len());
        inner.batch.clear();
        Ok(())
    }
}
