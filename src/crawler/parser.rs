//! HTML parser for index pages and advisory pages
//!
//! This module handles the site-specific markup:
//! - The "last page" control of the index pager
//! - One advisory record per `<article>` teaser on an index page
//! - The main content region of an advisory page, minus its footer
//!
//! Every structural assumption that fails is reported as
//! `HarvestError::Parse` rather than skipped.

use crate::storage::AdvisoryRecord;
use crate::{HarvestError, Result};
use scraper::{ElementRef, Html, Selector};

const INDEX_CONTEXT: &str = "index page";
const ADVISORY_CONTEXT: &str = "advisory page";

/// Compiles a CSS selector, reporting failures as parse errors
fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| HarvestError::parse("selector", format!("invalid selector '{}': {:?}", css, e)))
}

/// Returns the trimmed text content of an element
fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// A parsed index page
///
/// Holds the parsed document together with the selectors used to walk it, so
/// that `advisories()` can hand out records lazily in document order.
pub struct IndexPage {
    document: Html,
    pager_last: Selector,
    article: Selector,
    time: Selector,
    meta: Selector,
    title: Selector,
    anchor: Selector,
}

impl IndexPage {
    /// Parses the markup of one index page
    pub fn parse(html: &str) -> Result<Self> {
        Ok(Self {
            document: Html::parse_document(html),
            pager_last: selector("a.c-pager__link--last")?,
            article: selector("article")?,
            time: selector("time")?,
            meta: selector("div.c-teaser__meta")?,
            title: selector("h3.c-teaser__title")?,
            anchor: selector("a[href]")?,
        })
    }

    /// Extracts the page number targeted by the pager's "last" link
    ///
    /// # Returns
    ///
    /// * `Ok(u32)` - The zero-based number of the last index page
    /// * `Err(HarvestError::Parse)` - The control is absent or its target is not a page number
    pub fn last_page(&self) -> Result<u32> {
        let href = self
            .document
            .select(&self.pager_last)
            .next()
            .and_then(|link| link.value().attr("href"))
            .ok_or_else(|| HarvestError::parse(INDEX_CONTEXT, "missing last-page pager link"))?;

        let page = href.rsplit("page=").next().unwrap_or_default();
        let page = page.split(['&', '#']).next().unwrap_or_default().trim();

        page.parse::<u32>().map_err(|e| {
            HarvestError::parse(
                INDEX_CONTEXT,
                format!("last-page link '{}' has no page number: {}", href, e),
            )
        })
    }

    /// Returns true if the page contains at least one advisory block
    pub fn has_advisories(&self) -> bool {
        self.document.select(&self.article).next().is_some()
    }

    /// Yields one record per `<article>` block, in document order
    ///
    /// The site lists advisories newest-update-first, so the first record is
    /// the most recently revised advisory on the page.
    pub fn advisories(&self) -> impl Iterator<Item = Result<AdvisoryRecord>> + '_ {
        self.document
            .select(&self.article)
            .map(move |article| self.record_from_article(article))
    }

    fn record_from_article(&self, article: ElementRef<'_>) -> Result<AdvisoryRecord> {
        let missing = |what: &str| HarvestError::parse(INDEX_CONTEXT, format!("advisory block without {}", what));

        let date = article
            .select(&self.time)
            .next()
            .map(text_of)
            .ok_or_else(|| missing("a <time> element"))?;

        let category = article
            .select(&self.meta)
            .next()
            .map(text_of)
            .ok_or_else(|| missing("a teaser meta block"))?;

        let heading = article
            .select(&self.title)
            .next()
            .ok_or_else(|| missing("a teaser title"))?;

        let link = heading
            .select(&self.anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| href.trim().to_string())
            .ok_or_else(|| missing("a title link"))?;

        Ok(AdvisoryRecord {
            date,
            category,
            title: text_of(heading),
            link,
        })
    }
}

/// Parses the last page number from an index page
pub fn parse_last_page(index_html: &str) -> Result<u32> {
    IndexPage::parse(index_html)?.last_page()
}

/// Parses every advisory record on an index page, in page order
pub fn parse_advisories(index_html: &str) -> Result<Vec<AdvisoryRecord>> {
    IndexPage::parse(index_html)?.advisories().collect()
}

/// Extracts the main content of an advisory page with its footer removed
///
/// # Returns
///
/// * `Ok(String)` - Serialized HTML of the `main.c-main` element
/// * `Err(HarvestError::Parse)` - The page has no main content region
pub fn extract_advisory_body(advisory_html: &str) -> Result<String> {
    let main_selector = selector("main.c-main")?;
    let footer_selector = selector("div.l-full__footer")?;
    let mut document = Html::parse_document(advisory_html);

    let (main_id, footer_ids) = {
        let main = document
            .select(&main_selector)
            .next()
            .ok_or_else(|| HarvestError::parse(ADVISORY_CONTEXT, "missing main content region"))?;
        let footers: Vec<_> = main.select(&footer_selector).map(|f| f.id()).collect();
        (main.id(), footers)
    };

    for id in footer_ids {
        if let Some(mut footer) = document.tree.get_mut(id) {
            footer.detach();
        }
    }

    document
        .tree
        .get(main_id)
        .and_then(ElementRef::wrap)
        .map(|main| main.html())
        .ok_or_else(|| HarvestError::parse(ADVISORY_CONTEXT, "main content region vanished"))
}
