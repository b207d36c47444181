//! Crawler module for advisory harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind a global concurrency gate
//! - Index page and advisory page parsing
//! - Overall crawl coordination (discover, download, commit)

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{run_crawl, Coordinator, Discovery};
pub use fetcher::{build_http_client, Fetcher};
pub use parser::{extract_advisory_body, parse_advisories, parse_last_page, IndexPage};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Load the checkpoint from the output directory
/// 2. Scan index pages newest-first until the checkpoint or the page bound
/// 3. Download and convert every new advisory concurrently
/// 4. Update the archive index and the checkpoint
///
/// # Arguments
///
/// * `config` - The harvester configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed successfully
/// * `Err(HarvestError)` - Crawl failed; nothing was committed
pub async fn crawl(config: &Config) -> Result<CrawlReport> {
    run_crawl(config).await
}
