//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::state::CrawlStatus;
use crate::storage::UrlRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("URL record not found: {0}")]
    RecordNotFound(i64),

    #[error("Invalid status transition for record {id}: {from} -> {to}")]
    InvalidTransition {
        id: i64,
        from: CrawlStatus,
        to: CrawlStatus,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Implementations are not required to be thread-safe themselves; callers
/// serialize access (the orchestrator keeps the backend behind a mutex),
/// which is also what makes `update_record` atomic per id.
pub trait Storage {
    // ===== Record Management =====

    /// Inserts a new record in `queued` status, or returns the existing one
    ///
    /// # Returns
    ///
    /// The record and `true` if it was created by this call, `false` if a
    /// record for `url` already existed
    fn insert_or_get_record(&mut self, url: &str) -> StorageResult<(UrlRecord, bool)>;

    /// Gets a record by ID
    fn get_record(&self, id: i64) -> StorageResult<UrlRecord>;

    /// Gets a record by its submitted URL
    fn get_record_by_url(&self, url: &str) -> StorageResult<Option<UrlRecord>>;

    /// Lists all records ordered by ID ascending
    fn list_records(&self) -> StorageResult<Vec<UrlRecord>>;

    /// Gets all records currently in a status
    fn get_records_by_status(&self, status: CrawlStatus) -> StorageResult<Vec<UrlRecord>>;

    /// Applies a read-modify-write update to one record
    ///
    /// The mutator sees the current record and may change status and result
    /// fields. Changes to `id`, `url` and `created_at` are discarded. If the
    /// status changes, the change must be allowed by
    /// [`CrawlStatus::can_transition_to`] or the whole update is rejected
    /// with `InvalidTransition` and nothing is written. `updated_at` is
    /// refreshed on every successful update.
    ///
    /// # Returns
    ///
    /// The record as written
    fn update_record(
        &mut self,
        id: i64,
        mutate: &mut dyn FnMut(&mut UrlRecord),
    ) -> StorageResult<UrlRecord>;

    // ===== Statistics =====

    /// Counts records in a status
    fn count_records_by_status(&self, status: CrawlStatus) -> StorageResult<u64>;

    /// Gets total record count
    fn count_total_records(&self) -> StorageResult<u64>;
}
