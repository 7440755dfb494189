//! SQLite record store
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::extract::JobRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// SQLite record store
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Opens or creates a SQLite record store
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn, path: None })
    }

    /// Number of rows in the store
    pub fn count(&self) -> StorageResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl RecordStore for SqliteStore {
    fn persist_batch(&mut self, records: &[JobRecord]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO jobs (source, job_id, url, title, company, location, salary,
                 contract_type, description_html, description_text, date_posted,
                 valid_through, scraped_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            )?;

            for record in records {
                stmt.execute(params![
                    record.source,
                    record.job_id,
                    record.url,
                    record.title,
                    record.company,
                    record.location,
                    record.salary,
                    record.contract_type,
                    record.description_html,
                    record.description_text,
                    record.date_posted,
                    record.valid_through,
                    record.scraped_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_all(&self) -> StorageResult<Vec<JobRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, source, job_id, url, title, company, location, salary, contract_type,
             description_html, description_text, date_posted, valid_through, scraped_at
             FROM jobs ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let scraped_at: String = row.get(13)?;
            Ok((
                id,
                scraped_at,
                JobRecord {
                    source: row.get(1)?,
                    job_id: row.get(2)?,
                    url: row.get(3)?,
                    title: row.get(4)?,
                    company: row.get(5)?,
                    location: row.get(6)?,
                    salary: row.get(7)?,
                    contract_type: row.get(8)?,
                    description_html: row.get(9)?,
                    description_text: row.get(10)?,
                    date_posted: row.get(11)?,
                    valid_through: row.get(12)?,
                    scraped_at: DateTime::<Utc>::MIN_UTC,
                },
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, raw_scraped_at, mut record) = row?;
            record.scraped_at = DateTime::parse_from_rfc3339(&raw_scraped_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| StorageError::CorruptRecord {
                    location: format!("jobs row {}", id),
                    message: e.to_string(),
                })?;
            records.push(record);
        }

        Ok(records)
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("sqlite:{}", path.display()),
            None => "sqlite::memory:".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn record(job_id: &str, title: &str) -> JobRecord {
        JobRecord {
            source: "rozee.pk".to_string(),
            job_id: Some(job_id.to_string()),
            url: format!("https://www.rozee.pk/acme-jobs-{}", job_id),
            title: title.to_string(),
            company: Some("Acme".to_string()),
            location: "Lahore, Punjab".to_string(),
            salary: None,
            contract_type: Some("FULL_TIME".to_string()),
            description_html: Some("<p>Build things</p>".to_string()),
            description_text: "Build things".to_string(),
            date_posted: Some("2024-02-01".to_string()),
            valid_through: None,
            scraped_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_create_in_memory() {
        let store = SqliteStore::open_in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn test_persist_and_load_preserve_order() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .persist_batch(&[record("2", "Second"), record("1", "First")])
            .unwrap();
        store.persist_batch(&[record("3", "Third")]).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(store.count().unwrap(), 3);
        assert_eq!(loaded[0].title, "Second");
        assert_eq!(loaded[2], record("3", "Third"));
    }

    #[test]
    fn test_reopen_file_keeps_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("jobs.db");

        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.persist_batch(&[record("7", "Analyst")]).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].job_id.as_deref(), Some("7"));
        assert!(store.describe().ends_with("jobs.db"));
    }
}
