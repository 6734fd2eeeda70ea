//! Statistics over the job store
//!
//! This module provides functionality for counting records by status and
//! displaying the counts, shared by the `--stats` CLI flag and the
//! `/api/stats` endpoint.

use crate::state::CrawlStatus;
use crate::storage::Storage;
use crate::PagescopeError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Record counts summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /// Total number of submitted URLs
    pub total: u64,

    /// Count of records per status, every status present even when zero
    pub by_status: BTreeMap<String, u64>,
}

impl Statistics {
    /// Count for one status
    pub fn count(&self, status: CrawlStatus) -> u64 {
        self.by_status
            .get(status.to_db_string())
            .copied()
            .unwrap_or(0)
    }
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(Statistics)` - Successfully loaded statistics
/// * `Err(PagescopeError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<Statistics, PagescopeError> {
    let total = storage.count_total_records()?;

    let mut by_status = BTreeMap::new();
    for status in CrawlStatus::all_statuses() {
        let count = storage.count_records_by_status(status)?;
        by_status.insert(status.to_db_string().to_string(), count);
    }

    Ok(Statistics { total, by_status })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &Statistics) {
    println!("=== Pagescope Statistics ===\n");

    println!("Total URLs: {}", stats.total);
    println!();

    println!("URLs by Status:");
    for status in CrawlStatus::all_statuses() {
        let count = stats.count(status);
        let percentage = if stats.total > 0 {
            (count as f64 / stats.total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    let finished = stats.count(CrawlStatus::Done) + stats.count(CrawlStatus::Error);
    let success_rate = if finished > 0 {
        (stats.count(CrawlStatus::Done) as f64 / finished as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} finished crawls done)",
        success_rate,
        stats.count(CrawlStatus::Done),
        finished
    );
}
