//! Shared fixtures for integration tests

#![allow(dead_code)]

use pagescope::config::{
    Config, CrawlerConfig, LinkCheckConfig, ServerConfig, StorageConfig, UserAgentConfig,
};
use pagescope::crawler::Orchestrator;
use pagescope::storage::SqliteStorage;
use pagescope::{CrawlStatus, UrlRecord};
use std::time::Duration;

/// Creates a test configuration with short timeouts
pub fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            allowed_origin: "http://localhost:3000".to_string(),
        },
        crawler: CrawlerConfig {
            page_timeout: 5,
            max_redirects: 3,
            max_concurrent_crawls: 4,
        },
        link_check: LinkCheckConfig {
            probe_timeout: 2,
            max_concurrent_probes: 4,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        storage: StorageConfig {
            database_path: ":memory:".to_string(),
        },
    }
}

/// Orchestrator over a fresh in-memory store
pub fn create_orchestrator(config: &Config) -> Orchestrator {
    let storage = SqliteStorage::open_in_memory().expect("Failed to open in-memory storage");
    Orchestrator::with_storage(config, storage).expect("Failed to build orchestrator")
}

/// Polls until the record leaves `running`, or panics after `timeout`
pub async fn wait_for_finish(
    orchestrator: &Orchestrator,
    id: i64,
    timeout: Duration,
) -> UrlRecord {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let record = orchestrator.get_record(id).expect("Record disappeared");
        if record.status != CrawlStatus::Running {
            return record;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("Record {} still running after {:?}", id, timeout);
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}
