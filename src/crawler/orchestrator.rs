//! Crawl orchestrator - drives records through the crawl lifecycle
//!
//! The orchestrator owns the job store and the HTTP clients and is the only
//! component that mutates records. A crawl is:
//! 1. `start_crawl`: move the record to `running` (rejected if it already is)
//! 2. `execute_crawl`: fetch, analyze, check links
//! 3. Persist the outcome as `done`, or `error` if the page could not be fetched
//!
//! Handles are cheap to clone and share one store, so the HTTP layer can
//! hand a clone to each spawned job.

use crate::config::Config;
use crate::crawler::analyzer::{analyze, PageAnalysis};
use crate::crawler::fetcher::{build_http_client, build_probe_client, fetch_page};
use crate::crawler::link_checker::{inaccessible_links, LinkChecker};
use crate::output::{load_statistics, Statistics};
use crate::state::CrawlStatus;
use crate::storage::{open_storage, InaccessibleLink, SqliteStorage, Storage, StorageError, UrlRecord};
use crate::url::validate_submission;
use crate::PagescopeError;
use reqwest::Client;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Semaphore;
use url::Url;

/// Message stored on records found `running` at startup
pub const INTERRUPTED_MESSAGE: &str = "crawl interrupted by service restart";

/// Result of submitting a URL
#[derive(Debug, Clone)]
pub struct Submission {
    pub record: UrlRecord,
    /// False if the URL had already been submitted
    pub created: bool,
}

/// Result of a bulk crawl request
#[derive(Debug, Clone, Default)]
pub struct BulkCrawlOutcome {
    /// Ids whose crawl was started
    pub triggered: Vec<i64>,
    /// One message per id that could not be started
    pub errors: Vec<String>,
}

/// Everything a successful crawl writes back to the record
struct CrawlOutcome {
    analysis: PageAnalysis,
    inaccessible: Vec<InaccessibleLink>,
}

/// Main crawl orchestration handle
#[derive(Clone)]
pub struct Orchestrator {
    storage: Arc<Mutex<SqliteStorage>>,
    page_client: Client,
    link_checker: LinkChecker,
    crawl_slots: Arc<Semaphore>,
}

impl Orchestrator {
    /// Creates an orchestrator backed by the database named in the config
    pub fn new(config: &Config) -> Result<Self, PagescopeError> {
        let storage = open_storage(Path::new(&config.storage.database_path))?;
        Self::with_storage(config, storage)
    }

    /// Creates an orchestrator over an already opened store
    pub fn with_storage(config: &Config, storage: SqliteStorage) -> Result<Self, PagescopeError> {
        let page_client = build_http_client(&config.user_agent, &config.crawler)?;
        let probe_client = build_probe_client(&config.user_agent, &config.crawler, &config.link_check)?;

        Ok(Self {
            storage: Arc::new(Mutex::new(storage)),
            page_client,
            link_checker: LinkChecker::new(
                probe_client,
                config.link_check.max_concurrent_probes as usize,
            ),
            crawl_slots: Arc::new(Semaphore::new(
                config.crawler.max_concurrent_crawls.max(1) as usize,
            )),
        })
    }

    /// Runs `f` with exclusive access to the store
    ///
    /// The guard never outlives this call, so callers can not hold it across
    /// an await point.
    fn with_store<T>(
        &self,
        f: impl FnOnce(&mut SqliteStorage) -> Result<T, StorageError>,
    ) -> Result<T, PagescopeError> {
        let mut storage = self
            .storage
            .lock()
            .map_err(|_| PagescopeError::StorageLock)?;
        f(&mut storage).map_err(map_storage_error)
    }

    fn update(
        &self,
        id: i64,
        mut mutate: impl FnMut(&mut UrlRecord),
    ) -> Result<UrlRecord, PagescopeError> {
        self.with_store(|storage| storage.update_record(id, &mut mutate))
    }

    // ===== Queries =====

    /// Validates and stores a submitted URL
    ///
    /// Resubmitting an existing URL returns the existing record with
    /// `created == false` and changes nothing.
    pub fn submit_url(&self, raw: &str) -> Result<Submission, PagescopeError> {
        let url = validate_submission(raw)?;
        let (record, created) = self.with_store(|storage| storage.insert_or_get_record(&url))?;

        if created {
            tracing::info!("Accepted URL {} as record {}", record.url, record.id);
        } else {
            tracing::debug!("URL {} already stored as record {}", record.url, record.id);
        }

        Ok(Submission { record, created })
    }

    pub fn get_record(&self, id: i64) -> Result<UrlRecord, PagescopeError> {
        self.with_store(|storage| storage.get_record(id))
    }

    /// All records, id ascending
    pub fn list_records(&self) -> Result<Vec<UrlRecord>, PagescopeError> {
        self.with_store(|storage| storage.list_records())
    }

    pub fn statistics(&self) -> Result<Statistics, PagescopeError> {
        let storage = self
            .storage
            .lock()
            .map_err(|_| PagescopeError::StorageLock)?;
        load_statistics(&*storage)
    }

    // ===== Lifecycle =====

    /// Moves a record to `running`
    ///
    /// # Returns
    ///
    /// * `Ok(UrlRecord)` - The record, now `running`, with its previous results
    /// * `Err(NotFound)` - No record with this id
    /// * `Err(CrawlAlreadyRunning)` - A crawl is in flight; the record is untouched
    pub fn start_crawl(&self, id: i64) -> Result<UrlRecord, PagescopeError> {
        let record = self.update(id, |record| record.status = CrawlStatus::Running)?;
        tracing::info!("Crawl started for record {} ({})", id, record.url);
        Ok(record)
    }

    /// Starts a crawl and runs it in the background
    ///
    /// Returns once the record is `running`; the outcome is written to the
    /// store when the job finishes.
    pub fn request_crawl(&self, id: i64) -> Result<UrlRecord, PagescopeError> {
        let record = self.start_crawl(id)?;

        let orchestrator = self.clone();
        let url = record.url.clone();
        tokio::spawn(async move {
            if let Err(e) = orchestrator.run_job(id, url).await {
                tracing::error!("Crawl job for record {} failed: {}", id, e);
            }
        });

        Ok(record)
    }

    /// Starts a crawl and waits for its outcome
    pub async fn crawl(&self, id: i64) -> Result<UrlRecord, PagescopeError> {
        let record = self.start_crawl(id)?;
        self.run_job(id, record.url).await
    }

    /// Starts crawls for several records independently
    ///
    /// Every id is handled with the same rules as [`Self::request_crawl`];
    /// one failing id does not stop the others.
    pub fn request_bulk_crawl(&self, ids: &[i64]) -> BulkCrawlOutcome {
        let mut outcome = BulkCrawlOutcome::default();

        for &id in ids {
            match self.request_crawl(id) {
                Ok(_) => outcome.triggered.push(id),
                Err(e) => {
                    tracing::debug!("Bulk crawl skipped record {}: {}", id, e);
                    outcome.errors.push(e.to_string());
                }
            }
        }

        outcome
    }

    /// Runs the crawl of a record that is already `running`
    ///
    /// Waits for a global crawl slot first. A fetch failure ends the job in
    /// `error` and is not returned as an `Err`; `Err` means the outcome could
    /// not be persisted at all. A record that can not be read is also moved
    /// to `error` so it never stays `running`.
    pub async fn execute_crawl(&self, id: i64) -> Result<UrlRecord, PagescopeError> {
        match self.get_record(id) {
            Ok(record) => self.run_job(id, record.url).await,
            Err(e) => {
                tracing::error!("Failed to load record {} for crawling: {}", id, e);
                self.finish_with_error(id, format!("failed to load record: {}", e))
            }
        }
    }

    /// Crawls `url` for a record already `running` and persists the outcome
    async fn run_job(&self, id: i64, url: String) -> Result<UrlRecord, PagescopeError> {
        let _slot = self.crawl_slots.clone().acquire_owned().await.ok();

        let start_time = Instant::now();

        match self.run_pipeline(&url).await {
            Ok(outcome) => {
                let internal = outcome.analysis.internal_links();
                let external = outcome.analysis.external_links();
                let broken = outcome.inaccessible.len();

                match self.finish_done(id, outcome) {
                    Ok(record) => {
                        tracing::info!(
                            "Crawl done for record {} in {:?}: {} internal, {} external, {} inaccessible",
                            id,
                            start_time.elapsed(),
                            internal,
                            external,
                            broken
                        );
                        Ok(record)
                    }
                    Err(e) => {
                        tracing::error!("Failed to save crawl results for record {}: {}", id, e);
                        self.finish_with_error(id, format!("failed to save results: {}", e))
                    }
                }
            }
            Err(message) => {
                tracing::warn!("Crawl failed for record {} ({}): {}", id, url, message);
                self.finish_with_error(id, message)
            }
        }
    }

    /// Fetch, analyze, probe; the error is the message stored on the record
    async fn run_pipeline(&self, url: &str) -> Result<CrawlOutcome, String> {
        let base_url = Url::parse(url).map_err(|e| format!("invalid URL: {}", e))?;

        let page = fetch_page(&self.page_client, url)
            .await
            .map_err(|e| e.to_string())?;
        tracing::debug!(
            "Fetched {} ({} bytes, status {}, final URL {})",
            url,
            page.body.len(),
            page.status_code,
            page.final_url
        );

        let analysis = analyze(&page.body, &base_url);
        let targets = analysis.probe_targets();
        tracing::debug!("Checking {} distinct links from {}", targets.len(), url);

        let probes = self.link_checker.check(&targets).await;
        let inaccessible = inaccessible_links(&probes);

        Ok(CrawlOutcome {
            analysis,
            inaccessible,
        })
    }

    fn finish_done(&self, id: i64, outcome: CrawlOutcome) -> Result<UrlRecord, PagescopeError> {
        let CrawlOutcome {
            analysis,
            inaccessible,
        } = outcome;

        self.update(id, |record| {
            record.status = CrawlStatus::Done;
            record.html_version = analysis.html_version.clone();
            record.page_title = analysis.page_title.clone();
            record.heading_counts = analysis.heading_counts;
            record.internal_links = analysis.internal_links();
            record.external_links = analysis.external_links();
            record.inaccessible_links = inaccessible.clone();
            record.has_login_form = analysis.has_login_form;
            record.error_message = None;
        })
    }

    /// Marks the record `error`, keeping its last successful analysis
    fn finish_with_error(&self, id: i64, message: String) -> Result<UrlRecord, PagescopeError> {
        self.update(id, |record| {
            record.status = CrawlStatus::Error;
            record.error_message = Some(message.clone());
        })
    }

    /// Moves records left `running` by a previous process to `error`
    ///
    /// # Returns
    ///
    /// The number of records recovered
    pub fn recover_interrupted(&self) -> Result<usize, PagescopeError> {
        let stale = self.with_store(|storage| storage.get_records_by_status(CrawlStatus::Running))?;

        for record in &stale {
            tracing::warn!(
                "Record {} ({}) was running at shutdown; marking it as error",
                record.id,
                record.url
            );
            self.finish_with_error(record.id, INTERRUPTED_MESSAGE.to_string())?;
        }

        Ok(stale.len())
    }
}

/// Lifts store errors into the crate error, naming the lifecycle conflicts
fn map_storage_error(error: StorageError) -> PagescopeError {
    match error {
        StorageError::RecordNotFound(id) => PagescopeError::NotFound(id),
        StorageError::InvalidTransition {
            id,
            from: CrawlStatus::Running,
            to: CrawlStatus::Running,
        } => PagescopeError::CrawlAlreadyRunning(id),
        other => PagescopeError::Storage(other),
    }
}
