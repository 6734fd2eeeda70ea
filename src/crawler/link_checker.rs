//! Link reachability checks
//!
//! Every distinct link found on a page gets one lightweight probe. Probes run
//! concurrently, bounded per `check` call so each crawl gets its own pool,
//! and results come back in the order the links were given.

use crate::storage::InaccessibleLink;
use crate::url::probe_target;
use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Outcome of probing one link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkProbe {
    /// The probed URL, fragment stripped
    pub url: Url,
    /// Final HTTP status, or `None` if no response was received
    pub status_code: Option<u16>,
}

impl LinkProbe {
    /// A link is inaccessible if it failed at the transport level or
    /// answered with a 4xx/5xx status
    pub fn is_inaccessible(&self) -> bool {
        match self.status_code {
            Some(code) => code >= 400,
            None => true,
        }
    }
}

/// Probes links with bounded concurrency
#[derive(Clone)]
pub struct LinkChecker {
    client: Client,
    max_concurrent: usize,
}

impl LinkChecker {
    /// Creates a checker whose `check` calls each run at most
    /// `max_concurrent` requests at once
    pub fn new(client: Client, max_concurrent: usize) -> Self {
        Self {
            client,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Probes every distinct link once
    ///
    /// Links are deduplicated after stripping fragments. The returned vector
    /// has one entry per distinct link, in first-occurrence order. The
    /// concurrency bound applies to this call only; concurrent calls do not
    /// share permits.
    pub async fn check(&self, links: &[Url]) -> Vec<LinkProbe> {
        let mut seen = HashSet::new();
        let targets: Vec<Url> = links
            .iter()
            .map(probe_target)
            .filter(|target| seen.insert(target.as_str().to_string()))
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();
        for (index, target) in targets.iter().cloned().enumerate() {
            let client = self.client.clone();
            let semaphore = semaphore.clone();

            tasks.spawn(async move {
                // Never closed
                let _permit = semaphore.acquire_owned().await.ok();
                let status_code = probe(&client, &target).await;
                (index, status_code)
            });
        }

        let mut statuses: Vec<Option<u16>> = vec![None; targets.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, status_code)) => statuses[index] = status_code,
                Err(e) => tracing::warn!("Link probe task failed: {}", e),
            }
        }

        targets
            .into_iter()
            .zip(statuses)
            .map(|(url, status_code)| LinkProbe { url, status_code })
            .collect()
    }
}

/// Sends a HEAD request, falling back to GET when HEAD is not supported
async fn probe(client: &Client, url: &Url) -> Option<u16> {
    match client.head(url.clone()).send().await {
        Ok(response)
            if response.status() == StatusCode::METHOD_NOT_ALLOWED
                || response.status() == StatusCode::NOT_IMPLEMENTED =>
        {
            tracing::trace!("HEAD not supported by {}, retrying with GET", url);
            probe_with_get(client, url).await
        }
        Ok(response) => Some(response.status().as_u16()),
        Err(e) => {
            tracing::debug!("Probe of {} failed: {}", url, e);
            None
        }
    }
}

async fn probe_with_get(client: &Client, url: &Url) -> Option<u16> {
    match client.get(url.clone()).send().await {
        Ok(response) => Some(response.status().as_u16()),
        Err(e) => {
            tracing::debug!("GET probe of {} failed: {}", url, e);
            None
        }
    }
}

/// Keeps only the inaccessible probes, in probe order
pub fn inaccessible_links(probes: &[LinkProbe]) -> Vec<InaccessibleLink> {
    probes
        .iter()
        .filter(|probe| probe.is_inaccessible())
        .map(|probe| InaccessibleLink {
            url: probe.url.to_string(),
            status_code: probe.status_code,
        })
        .collect()
}
