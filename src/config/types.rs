use serde::Deserialize;

/// Main configuration structure for Advisory-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub fetcher: FetcherConfig,
    pub crawl: CrawlConfig,
    pub output: OutputConfig,
}

/// Location of the advisory index on the remote site
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Scheme and host that advisory links are relative to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the paginated index listing
    #[serde(rename = "index-path")]
    pub index_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.cisa.gov".to_string(),
            index_path: "/news-events/cybersecurity-advisories".to_string(),
        }
    }
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Maximum number of requests in flight at once, across all tasks
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 5,
            request_timeout_secs: 120,
            user_agent: format!("advisory-harvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Pagination bounds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Last index page to scan; 0 means discover it from the first page
    #[serde(rename = "max-pages")]
    pub max_pages: u32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self { max_pages: 25 }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of the archive (checkpoint, index, html/ and markdown/)
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "advisories".to_string(),
        }
    }
}
