//! JSON Lines record store
//!
//! One JSON object per line, appended in acceptance order. The file is
//! opened in append mode per batch, so an interrupted run leaves every
//! flushed batch intact.

use crate::extract::JobRecord;
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only JSON Lines file
pub struct JsonLinesStore {
    path: PathBuf,
}

impl JsonLinesStore {
    /// Creates a store writing to `path`
    ///
    /// Missing parent directories are created; an existing file is appended to.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }
}

impl RecordStore for JsonLinesStore {
    fn persist_batch(&mut self, records: &[JobRecord]) -> StorageResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        // Serialize the whole batch first so a bad record writes nothing
        let mut buffer = Vec::new();
        for record in records {
            serde_json::to_writer(&mut buffer, record)?;
            buffer.push(b'\n');
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&buffer)?;
        writer.flush()?;
        Ok(())
    }

    fn load_all(&self) -> StorageResult<Vec<JobRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(fs::File::open(&self.path)?);
        let mut records = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let record = serde_json::from_str(&line).map_err(|e| StorageError::CorruptRecord {
                location: format!("{}:{}", self.path.display(), index + 1),
                message: e.to_string(),
            })?;
            records.push(record);
        }

        Ok(records)
    }

    fn describe(&self) -> String {
        format!("jsonl:{}", self.path.display())
    }
}
