//! Crawler module for page fetching and analysis
//!
//! This module contains the crawl pipeline, including:
//! - HTTP fetching with timeout, redirect limits and error classification
//! - HTML analysis (version, title, headings, links, login forms)
//! - Bounded-concurrency link reachability probes
//! - The orchestrator that drives records through the crawl lifecycle

mod analyzer;
mod fetcher;
mod link_checker;
mod orchestrator;

pub use analyzer::{analyze, html_version_label, ExtractedLink, PageAnalysis, UNKNOWN_HTML_VERSION};
pub use fetcher::{
    build_http_client, build_probe_client, classify_error, fetch_page, FetchError, FetchedPage,
};
pub use link_checker::{inaccessible_links, LinkChecker, LinkProbe};
pub use orchestrator::{BulkCrawlOutcome, Orchestrator, Submission, INTERRUPTED_MESSAGE};
