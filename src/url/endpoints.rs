use crate::config::SiteConfig;
use crate::Result;
use url::Url;

/// Sort key that orders the index newest-revision-first
const SORT_BY_LAST_UPDATED: &str = "field_last_updated";

/// Resolved base URLs of the advisory site
///
/// Index pages live at `<index>?sort_by=field_last_updated&url=&page=<n>`;
/// advisories live at `<base><link>`.
#[derive(Debug, Clone)]
pub struct SiteEndpoints {
    base: Url,
    index: Url,
}

impl SiteEndpoints {
    /// Resolves the site's base URL and index path
    ///
    /// # Example
    ///
    /// ```
    /// use advisory_harvest::url::SiteEndpoints;
    ///
    /// let endpoints = SiteEndpoints::new("https://www.cisa.gov", "/news-events/cybersecurity-advisories").unwrap();
    /// assert_eq!(
    ///     endpoints.index_page(2).as_str(),
    ///     "https://www.cisa.gov/news-events/cybersecurity-advisories?sort_by=field_last_updated&url=&page=2"
    /// );
    /// ```
    pub fn new(base_url: &str, index_path: &str) -> Result<Self> {
        let base = Url::parse(base_url)?;
        let index = base.join(index_path)?;
        Ok(Self { base, index })
    }

    /// Builds endpoints from the `[site]` configuration section
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        Self::new(&config.base_url, &config.index_path)
    }

    /// URL of index page `page` (zero-based)
    pub fn index_page(&self, page: u32) -> Url {
        let mut url = self.index.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("sort_by", SORT_BY_LAST_UPDATED)
            .append_pair("url", "")
            .append_pair("page", &page.to_string());
        url
    }

    /// Absolute URL of an advisory given its site-relative link
    pub fn advisory(&self, link: &str) -> Result<Url> {
        Ok(self.base.join(link)?)
    }
}
