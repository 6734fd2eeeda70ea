//! Pagescope: a crawl job engine for page analysis
//!
//! This crate accepts URLs, crawls each one on request, and records what it
//! found: HTML version, title, heading counts, internal/external link counts,
//! unreachable links and whether the page carries a login form. Results are
//! kept in SQLite and served over a small JSON HTTP API.

pub mod api;
pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Pagescope operations
#[derive(Debug, Error)]
pub enum PagescopeError {
    #[error("Invalid URL: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    StorageLock,

    #[error("URL record {0} not found")]
    NotFound(i64),

    #[error("Crawl already running for URL record {0}")]
    CrawlAlreadyRunning(i64),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("URL must not be empty")]
    Empty,

    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Pagescope operations
pub type Result<T> = std::result::Result<T, PagescopeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Orchestrator;
pub use state::CrawlStatus;
pub use storage::{HeadingCounts, InaccessibleLink, UrlRecord};
pub use crate::url::{classify_link, validate_submission, LinkKind};
