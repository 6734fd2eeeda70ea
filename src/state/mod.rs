//! State module for tracking crawl progress
//!
//! Every URL record carries a `CrawlStatus`. The status moves through a
//! small state machine:
//!
//! ```text
//! queued ──► running ──► done
//!              ▲   └───► error
//!              └──────── done / error (re-crawl)
//! ```
//!
//! A record that is already `running` can not be started again.

mod crawl_status;

pub use crawl_status::CrawlStatus;
