//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::state::CrawlStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{HeadingCounts, InaccessibleLink, UrlRecord};
use crate::PagescopeError;
use chrono::{DateTime, Duration, SecondsFormat, Timelike, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// Column list shared by every record query, in `row_to_record` order
const RECORD_COLUMNS: &str = "id, url, status, html_version, page_title, heading_counts,
     internal_links, external_links, inaccessible_links, has_login_form, error_message,
     created_at, updated_at";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(PagescopeError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, PagescopeError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for tests and throwaway runs)
    pub fn open_in_memory() -> Result<Self, PagescopeError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage {
    // ===== Record Management =====

    fn insert_or_get_record(&mut self, url: &str) -> StorageResult<(UrlRecord, bool)> {
        if let Some(existing) = self.get_record_by_url(url)? {
            return Ok((existing, false));
        }

        let now = format_timestamp(now_micros());
        let headings = serde_json::to_string(&HeadingCounts::default())?;
        self.conn.execute(
            "INSERT INTO url_records (url, status, heading_counts, inaccessible_links, created_at, updated_at)
             VALUES (?1, ?2, ?3, '[]', ?4, ?4)",
            params![url, CrawlStatus::Queued.to_db_string(), headings, now],
        )?;

        let id = self.conn.last_insert_rowid();
        Ok((self.get_record(id)?, true))
    }

    fn get_record(&self, id: i64) -> StorageResult<UrlRecord> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM url_records WHERE id = ?1",
            RECORD_COLUMNS
        ))?;

        stmt.query_row(params![id], row_to_record)
            .optional()?
            .ok_or(StorageError::RecordNotFound(id))
    }

    fn get_record_by_url(&self, url: &str) -> StorageResult<Option<UrlRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM url_records WHERE url = ?1",
            RECORD_COLUMNS
        ))?;

        Ok(stmt.query_row(params![url], row_to_record).optional()?)
    }

    fn list_records(&self) -> StorageResult<Vec<UrlRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM url_records ORDER BY id ASC",
            RECORD_COLUMNS
        ))?;

        let records = stmt
            .query_map([], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn get_records_by_status(&self, status: CrawlStatus) -> StorageResult<Vec<UrlRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM url_records WHERE status = ?1 ORDER BY id ASC",
            RECORD_COLUMNS
        ))?;

        let records = stmt
            .query_map(params![status.to_db_string()], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn update_record(
        &mut self,
        id: i64,
        mutate: &mut dyn FnMut(&mut UrlRecord),
    ) -> StorageResult<UrlRecord> {
        let tx = self.conn.transaction()?;

        let current = tx
            .query_row(
                &format!("SELECT {} FROM url_records WHERE id = ?1", RECORD_COLUMNS),
                params![id],
                row_to_record,
            )
            .optional()?
            .ok_or(StorageError::RecordNotFound(id))?;

        let mut updated = current.clone();
        mutate(&mut updated);

        // Identity fields are immutable
        updated.id = current.id;
        updated.url = current.url.clone();
        updated.created_at = current.created_at;

        // Dropping `tx` without commit rolls back
        if !current.status.can_transition_to(updated.status) {
            return Err(StorageError::InvalidTransition {
                id,
                from: current.status,
                to: updated.status,
            });
        }

        updated.updated_at = next_timestamp(current.updated_at);

        tx.execute(
            "UPDATE url_records SET status = ?1, html_version = ?2, page_title = ?3,
             heading_counts = ?4, internal_links = ?5, external_links = ?6,
             inaccessible_links = ?7, has_login_form = ?8, error_message = ?9,
             updated_at = ?10 WHERE id = ?11",
            params![
                updated.status.to_db_string(),
                updated.html_version,
                updated.page_title,
                serde_json::to_string(&updated.heading_counts)?,
                updated.internal_links,
                updated.external_links,
                serde_json::to_string(&updated.inaccessible_links)?,
                updated.has_login_form,
                updated.error_message,
                format_timestamp(updated.updated_at),
                id
            ],
        )?;
        tx.commit()?;

        Ok(updated)
    }

    // ===== Statistics =====

    fn count_records_by_status(&self, status: CrawlStatus) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM url_records WHERE status = ?1",
            params![status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_total_records(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM url_records", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Maps a row selected with `RECORD_COLUMNS` to a record
fn row_to_record(row: &Row<'_>) -> rusqlite::Result<UrlRecord> {
    let status_str: String = row.get(2)?;
    let status = CrawlStatus::from_db_string(&status_str)
        .ok_or_else(|| conversion_error(2, format!("unknown crawl status '{}'", status_str)))?;

    let heading_counts: HeadingCounts =
        serde_json::from_str(&row.get::<_, String>(5)?).map_err(|e| conversion_error(5, e))?;
    let inaccessible_links: Vec<InaccessibleLink> =
        serde_json::from_str(&row.get::<_, String>(8)?).map_err(|e| conversion_error(8, e))?;

    Ok(UrlRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        status,
        html_version: row.get(3)?,
        page_title: row.get(4)?,
        heading_counts,
        internal_links: row.get(6)?,
        external_links: row.get(7)?,
        inaccessible_links,
        has_login_form: row.get(9)?,
        error_message: row.get(10)?,
        created_at: parse_timestamp(11, row.get(11)?)?,
        updated_at: parse_timestamp(12, row.get(12)?)?,
    })
}

fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn parse_timestamp(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time truncated to the microsecond precision stored on disk
fn now_micros() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now)
}

/// A timestamp strictly after `previous`, so every update visibly moves `updated_at`
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_micros();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
