//! Crawler coordinator - main crawl orchestration logic
//!
//! A run has three phases:
//!
//! 1. **Discover**: scan index pages in order, newest first, collecting every
//!    record until the checkpoint link is seen or the page bound is reached.
//! 2. **Download**: fetch, store and convert every collected advisory
//!    concurrently. The fetcher's gate bounds how many requests are in flight;
//!    the first failure drops every download still running.
//! 3. **Commit**: only after all downloads succeed, merge the records into the
//!    archive index and move the checkpoint to the newest record.

use crate::config::Config;
use crate::crawler::parser::IndexPage;
use crate::crawler::Fetcher;
use crate::output::{advisory_to_markdown, CrawlReport};
use crate::state::PaginationState;
use crate::storage::{write_text, AdvisoryRecord, ArchiveIndex, ArchiveLayout, CheckpointStore};
use crate::url::{slug_from_link, SiteEndpoints};
use crate::Result;
use futures::future::try_join_all;
use std::time::Instant;

/// Records found by the discovery phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    /// New or updated records, newest first
    pub records: Vec<AdvisoryRecord>,

    /// Number of index pages fetched
    pub pages_scanned: u32,

    /// Whether the scan stopped at the checkpoint
    pub checkpoint_hit: bool,
}

/// What scanning one index page decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageScan {
    /// Every record on the page was collected
    Complete { records: usize },

    /// The checkpoint was found; records before it were collected
    CheckpointHit,

    /// The page listed no advisories; pagination ends here
    Empty,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    fetcher: Fetcher,
    layout: ArchiveLayout,
    max_pages: u32,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - The site URLs or HTTP client could not be set up
    pub fn new(config: &Config) -> Result<Self> {
        let endpoints = SiteEndpoints::from_config(&config.site)?;
        let fetcher = Fetcher::new(&config.fetcher, endpoints)?;
        Ok(Self::with_fetcher(
            fetcher,
            ArchiveLayout::new(&config.output.directory),
            config.crawl.max_pages,
        ))
    }

    /// Creates a coordinator around an existing fetcher
    pub fn with_fetcher(fetcher: Fetcher, layout: ArchiveLayout, max_pages: u32) -> Self {
        Self {
            fetcher,
            layout,
            max_pages,
        }
    }

    fn checkpoint_store(&self) -> CheckpointStore {
        self.layout.checkpoint_store()
    }

    /// Runs one complete crawl
    ///
    /// Nothing is committed unless every collected advisory was downloaded
    /// and written. On any error the checkpoint and index are left as they
    /// were before the run.
    pub async fn run(&self) -> Result<CrawlReport> {
        let start_time = Instant::now();
        self.layout.ensure_dirs().await?;

        let checkpoint = self.checkpoint_store().load().await?;
        match &checkpoint {
            Some(link) => tracing::info!("Resuming from checkpoint: {}", link),
            None => tracing::info!("Starting from the beginning"),
        }

        let index = ArchiveIndex::load(&self.layout.index_path()).await?;

        let discovery = self.discover(checkpoint.as_deref()).await?;
        tracing::info!("Found {} advisories to process", discovery.records.len());

        let downloaded = self.download_all(&discovery.records).await?;

        let index = self.commit(index, &discovery.records).await?;
        let checkpoint = discovery
            .records
            .first()
            .map(|newest| newest.link.clone())
            .or(checkpoint);

        let report = CrawlReport {
            pages_scanned: discovery.pages_scanned,
            checkpoint_hit: discovery.checkpoint_hit,
            collected: discovery.records.len(),
            downloaded,
            checkpoint,
            indexed: index.len(),
            elapsed: start_time.elapsed(),
        };

        tracing::info!(
            "Crawl completed: {} advisories archived in {:?}",
            report.downloaded,
            report.elapsed
        );

        Ok(report)
    }

    /// Scans index pages in site order and collects records newer than `checkpoint`
    ///
    /// Page `n + 1` is only requested after page `n` has been fully scanned.
    /// When the checkpoint link is found the current page becomes the last one,
    /// even if the site has more pages.
    pub async fn discover(&self, checkpoint: Option<&str>) -> Result<Discovery> {
        let mut pagination = PaginationState::new(self.max_pages);
        let mut discovery = Discovery::default();

        loop {
            let page_number = pagination.current_page();
            let index_html = self.fetcher.fetch_index_page(page_number).await?;
            discovery.pages_scanned += 1;

            let scan = scan_index_page(
                &index_html,
                &mut pagination,
                checkpoint,
                &mut discovery.records,
            )?;

            match scan {
                PageScan::CheckpointHit => {
                    tracing::info!("Reached checkpoint on index page {}", page_number);
                    discovery.checkpoint_hit = true;
                }
                PageScan::Empty => {
                    tracing::info!("Index page {} lists no advisories, stopping", page_number);
                    break;
                }
                PageScan::Complete { records } => {
                    tracing::debug!("Collected {} records from index page {}", records, page_number);
                }
            }

            if !pagination.advance() {
                break;
            }
        }

        Ok(discovery)
    }

    /// Downloads, stores and converts every record concurrently
    ///
    /// Returns the number of advisories processed. The first error cancels
    /// the downloads still in flight.
    pub async fn download_all(&self, records: &[AdvisoryRecord]) -> Result<usize> {
        let downloads = records.iter().map(|record| self.download(record));
        let done = try_join_all(downloads).await?;
        Ok(done.len())
    }

    /// Fetches one advisory and writes `html/<slug>.html` and `markdown/<slug>.md`
    async fn download(&self, record: &AdvisoryRecord) -> Result<()> {
        let slug = slug_from_link(&record.link)?;
        let advisory_html = self.fetcher.fetch_advisory_page(&record.link).await?;

        write_text(&self.layout.html_path(slug), &advisory_html).await?;

        let markdown = advisory_to_markdown(&advisory_html)?;
        write_text(&self.layout.markdown_path(slug), &markdown).await?;

        tracing::debug!("Archived {} as {}", record.link, slug);
        Ok(())
    }

    /// Merges `records` into the index loaded at run start and advances the checkpoint
    ///
    /// The index is written before the checkpoint. If `records` is empty both
    /// files are left untouched.
    async fn commit(&self, mut index: ArchiveIndex, records: &[AdvisoryRecord]) -> Result<ArchiveIndex> {
        let Some(newest) = records.first() else {
            return Ok(index);
        };

        index.extend(records.iter().cloned());
        index.save(&self.layout.index_path()).await?;

        self.checkpoint_store().save(&newest.link).await?;
        tracing::info!("Checkpoint advanced to {}", newest.link);

        Ok(index)
    }
}

/// Scans one index page, appending records until the checkpoint is found
///
/// Kept synchronous so the parsed document never lives across an await.
fn scan_index_page(
    index_html: &str,
    pagination: &mut PaginationState,
    checkpoint: Option<&str>,
    collected: &mut Vec<AdvisoryRecord>,
) -> Result<PageScan> {
    let page = IndexPage::parse(index_html)?;

    if pagination.needs_last_page() {
        match page.last_page() {
            Ok(last_page) => {
                tracing::info!("Index reports {} as its last page", last_page);
                pagination.adopt_last_page(last_page);
            }
            // A single empty page with no pager is an empty index
            Err(_) if !page.has_advisories() => return Ok(PageScan::Empty),
            Err(e) => return Err(e),
        }
    }

    let mut records = 0;
    for record in page.advisories() {
        let record = record?;
        if checkpoint == Some(record.link.as_str()) {
            pagination.hit_checkpoint();
            return Ok(PageScan::CheckpointHit);
        }
        collected.push(record);
        records += 1;
    }

    if records == 0 {
        Ok(PageScan::Empty)
    } else {
        Ok(PageScan::Complete { records })
    }
}

/// Runs the main crawl operation with the given configuration
///
/// # Example
///
/// ```no_run
/// use advisory_harvest::config::Config;
/// use advisory_harvest::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(&Config::default()).await?;
/// println!("{} new advisories", report.collected);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<CrawlReport> {
    let coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
