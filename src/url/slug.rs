use crate::{HarvestError, Result};

/// Derives the on-disk filename stem of an advisory from its link
///
/// The slug is the final path segment of the link, ignoring any query string,
/// fragment or trailing slash.
///
/// # Example
///
/// ```
/// use advisory_harvest::url::slug_from_link;
///
/// assert_eq!(
///     slug_from_link("/news-events/cybersecurity-advisories/aa24-109a").unwrap(),
///     "aa24-109a"
/// );
/// ```
pub fn slug_from_link(link: &str) -> Result<&str> {
    let path = link.split(['?', '#']).next().unwrap_or_default();
    let slug = path.trim_end_matches('/').rsplit('/').next().unwrap_or_default();

    if slug.is_empty() || slug == "." || slug == ".." {
        return Err(HarvestError::parse(
            link,
            "advisory link has no usable final path segment",
        ));
    }

    Ok(slug)
}
