//! Storage module for persisting URL records
//!
//! This module is the job store behind the crawl orchestrator:
//! - SQLite database initialization and schema management
//! - Idempotent record creation keyed by the submitted URL
//! - Lookup, listing and atomic read-modify-write updates
//! - Status counts for statistics

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::CrawlStatus;
use crate::PagescopeError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
pub fn open_storage(path: &Path) -> Result<SqliteStorage, PagescopeError> {
    SqliteStorage::new(path)
}

/// Number of `<h1>`..`<h6>` elements found on a page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingCounts {
    pub h1: u32,
    pub h2: u32,
    pub h3: u32,
    pub h4: u32,
    pub h5: u32,
    pub h6: u32,
}

impl HeadingCounts {
    /// Records one heading of the given level; levels outside 1..=6 are ignored
    pub fn increment(&mut self, level: u8) {
        match level {
            1 => self.h1 += 1,
            2 => self.h2 += 1,
            3 => self.h3 += 1,
            4 => self.h4 += 1,
            5 => self.h5 += 1,
            6 => self.h6 += 1,
            _ => {}
        }
    }

    /// Count for a heading level; 0 for levels outside 1..=6
    pub fn get(&self, level: u8) -> u32 {
        match level {
            1 => self.h1,
            2 => self.h2,
            3 => self.h3,
            4 => self.h4,
            5 => self.h5,
            6 => self.h6,
            _ => 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.h1 + self.h2 + self.h3 + self.h4 + self.h5 + self.h6
    }
}

/// A link whose reachability probe failed or returned an error status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InaccessibleLink {
    pub url: String,

    /// HTTP status of the probe, or None if no response was received
    pub status_code: Option<u16>,
}

/// Persisted state for one submitted URL
///
/// `id`, `url` and `created_at` never change after creation. The analysis
/// fields keep their last successful values until the next successful crawl
/// overwrites them, including while a re-crawl is running or after it fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub id: i64,
    pub url: String,
    pub status: CrawlStatus,
    pub html_version: String,
    pub page_title: String,
    pub heading_counts: HeadingCounts,
    pub internal_links: u32,
    pub external_links: u32,
    pub inaccessible_links: Vec<InaccessibleLink>,
    pub has_login_form: bool,

    /// Why the last crawl failed; only present while status is `error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Total number of links counted by the last successful analysis
    pub fn total_links(&self) -> u32 {
        self.internal_links + self.external_links
    }
}
