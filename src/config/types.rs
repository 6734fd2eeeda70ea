use serde::Deserialize;

/// Main configuration structure for Pagescope
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "link-check", default)]
    pub link_check: LinkCheckConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
}

/// HTTP API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the API listens on
    #[serde(rename = "bind-address", default = "default_bind_address")]
    pub bind_address: String,

    /// Origin allowed to call the API from a browser
    #[serde(rename = "allowed-origin", default = "default_allowed_origin")]
    pub allowed_origin: String,
}

/// Page fetch and job scheduling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Timeout for loading the submitted page (seconds)
    #[serde(rename = "page-timeout", default = "default_page_timeout")]
    pub page_timeout: u64,

    /// Maximum number of redirects followed for a page or a probe
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Maximum number of crawl jobs executing at once
    #[serde(rename = "max-concurrent-crawls", default = "default_max_concurrent_crawls")]
    pub max_concurrent_crawls: u32,
}

/// Link reachability probe configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LinkCheckConfig {
    /// Timeout for a single probe (seconds)
    #[serde(rename = "probe-timeout", default = "default_probe_timeout")]
    pub probe_timeout: u64,

    /// Size of the per-job probe worker pool
    #[serde(rename = "max-concurrent-probes", default = "default_max_concurrent_probes")]
    pub max_concurrent_probes: u32,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_allowed_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_page_timeout() -> u64 {
    30
}

fn default_max_redirects() -> u32 {
    10
}

fn default_max_concurrent_crawls() -> u32 {
    4
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_max_concurrent_probes() -> u32 {
    8
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_timeout: default_page_timeout(),
            max_redirects: default_max_redirects(),
            max_concurrent_crawls: default_max_concurrent_crawls(),
        }
    }
}

impl Default for LinkCheckConfig {
    fn default() -> Self {
        Self {
            probe_timeout: default_probe_timeout(),
            max_concurrent_probes: default_max_concurrent_probes(),
        }
    }
}
