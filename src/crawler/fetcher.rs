//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests made during a run:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests for index pages and advisory pages
//! - A global admission gate capping in-flight requests
//!
//! No retries happen here. Any connection failure, timeout or non-success
//! status is returned as `HarvestError::Transport` and ends the run.

use crate::config::FetcherConfig;
use crate::url::SiteEndpoints;
use crate::{HarvestError, Result};
use reqwest::Client;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetcherConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(30))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited client for the advisory site
///
/// Every request made through a `Fetcher` first takes a permit from a shared
/// semaphore, so at most `max_concurrent_requests` requests are outstanding
/// at any time no matter how many tasks share the fetcher.
pub struct Fetcher {
    client: Client,
    endpoints: SiteEndpoints,
    gate: Semaphore,
}

impl Fetcher {
    /// Creates a fetcher for the given site
    pub fn new(config: &FetcherConfig, endpoints: SiteEndpoints) -> Result<Self> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(
            client,
            endpoints,
            config.max_concurrent_requests as usize,
        ))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, endpoints: SiteEndpoints, max_in_flight: usize) -> Self {
        Self {
            client,
            endpoints,
            gate: Semaphore::new(max_in_flight.max(1)),
        }
    }

    /// Fetches index page `page` sorted by last update
    pub async fn fetch_index_page(&self, page: u32) -> Result<String> {
        let url = self.endpoints.index_page(page);
        tracing::info!("Scraping index page {}", page);
        self.get_text(url).await
    }

    /// Fetches the advisory at the site-relative `link`
    pub async fn fetch_advisory_page(&self, link: &str) -> Result<String> {
        let url = self.endpoints.advisory(link)?;
        tracing::info!("Scraping advisory {}", link);
        self.get_text(url).await
    }

    /// Sends a GET request and reads the body while holding a gate permit
    async fn get_text(&self, url: Url) -> Result<String> {
        let _permit = self.gate.acquire().await?;
        let url_str = url.to_string();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|source| HarvestError::Transport {
                url: url_str.clone(),
                source,
            })?;

        response
            .text()
            .await
            .map_err(|source| HarvestError::Transport {
                url: url_str,
                source,
            })
    }

    /// Number of requests that could start right now without waiting
    pub fn available_permits(&self) -> usize {
        self.gate.available_permits()
    }
}
