//! HTTP fetcher implementation
//!
//! This module handles page retrieval for the crawler, including:
//! - Building HTTP clients with proper user agent strings and timeouts
//! - GET requests to fetch page content
//! - Redirect handling with a fixed hop limit
//! - Error classification

use crate::config::{CrawlerConfig, LinkCheckConfig, UserAgentConfig};
use reqwest::{redirect::Policy, Client};
use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// Why a page could not be retrieved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection refused or host unreachable: {0}")]
    ConnectionRefused(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Too many redirects")]
    TooManyRedirects,

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// A successfully retrieved page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value, empty if absent
    pub content_type: String,
    /// Page body content
    pub body: String,
}

/// Builds the HTTP client used to load submitted pages
///
/// # Example
///
/// ```no_run
/// use pagescope::config::{CrawlerConfig, UserAgentConfig};
/// use pagescope::crawler::build_http_client;
///
/// let user_agent = UserAgentConfig {
///     crawler_name: "Pagescope".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&user_agent, &CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(crawler.page_timeout))
        .connect_timeout(Duration::from_secs(crawler.page_timeout.min(10)))
        .redirect(Policy::limited(crawler.max_redirects as usize))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the HTTP client used for link reachability probes
///
/// Probes get their own, shorter timeout so one slow link can not hold a
/// worker for as long as a page load may take.
pub fn build_probe_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
    link_check: &LinkCheckConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(link_check.probe_timeout))
        .connect_timeout(Duration::from_secs(link_check.probe_timeout))
        .redirect(Policy::limited(crawler.max_redirects as usize))
        .build()
}

/// Fetches a page body
///
/// # Outcome Table
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Ok(FetchedPage)` |
/// | any other final status | `HttpStatus(code)` |
/// | timeout | `Timeout` |
/// | redirect chain over the limit | `TooManyRedirects` |
/// | TLS/certificate failure | `Tls` |
/// | refused / DNS / unreachable | `ConnectionRefused` |
/// | timeout while reading the body | `Timeout` |
/// | other body read failure | `Body` |
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage, FetchError> {
    let response = client.get(url).send().await.map_err(classify_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus(status.as_u16()));
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = response
        .text()
        .await
        .map_err(classify_body_error)?;

    Ok(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        content_type,
        body,
    })
}

/// Maps a failure while reading the response body
fn classify_body_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Body(error.to_string())
    }
}

/// Maps a reqwest failure onto the fetch error taxonomy
pub fn classify_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        return FetchError::Timeout;
    }

    if error.is_redirect() {
        return FetchError::TooManyRedirects;
    }

    let chain = error_chain_text(&error);
    if chain.contains("certificate") || chain.contains("tls") || chain.contains("ssl") {
        return FetchError::Tls(chain);
    }

    if error.is_connect() {
        return FetchError::ConnectionRefused(chain);
    }

    FetchError::Network(chain)
}

/// Joins the sources of an error into one lowercase string
///
/// The top-level reqwest message embeds the request URL, which must not
/// influence classification, so it is only used when there are no sources.
fn error_chain_text(error: &(dyn StdError + 'static)) -> String {
    let mut parts = Vec::new();
    let mut source = error.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    if parts.is_empty() {
        parts.push(error.to_string());
    }
    parts.join(": ").to_lowercase()
}
