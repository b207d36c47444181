//! Markdown conversion of advisory pages
//!
//! This module turns the cleaned advisory body into Markdown with ATX
//! headings (`#`, `##`, ...) and can rebuild the whole `markdown/` directory
//! from the raw HTML kept in `html/`.

use crate::crawler::extract_advisory_body;
use crate::storage::{write_text, ArchiveLayout};
use crate::{HarvestError, Result};
use htmd::options::{HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use scraper::Html;
use std::path::Path;

/// Creates the converter used for every advisory
pub fn create_converter() -> HtmlToMarkdown {
    HtmlToMarkdown::builder()
        .options(Options {
            heading_style: HeadingStyle::Atx,
            ..Default::default()
        })
        .skip_tags(vec!["script", "style", "noscript"])
        .build()
}

/// Converts an HTML fragment to Markdown
///
/// Conversion is best-effort: if the converter rejects the fragment, its text
/// content is returned instead.
pub fn to_markdown(fragment: &str) -> String {
    match create_converter().convert(fragment) {
        Ok(markdown) => markdown,
        Err(e) => {
            tracing::warn!("Markdown conversion failed, falling back to plain text: {}", e);
            plain_text(fragment)
        }
    }
}

fn plain_text(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Extracts the main content of an advisory page and converts it to Markdown
pub fn advisory_to_markdown(advisory_html: &str) -> Result<String> {
    let body = extract_advisory_body(advisory_html)?;
    Ok(to_markdown(&body))
}

/// Rebuilds `markdown/<slug>.md` for every `html/<slug>.html` in the archive
///
/// No network access is needed. Returns the number of documents written.
pub async fn regenerate_markdown(layout: &ArchiveLayout) -> Result<usize> {
    layout.ensure_dirs().await?;

    let html_dir = layout.html_dir();
    let mut entries = tokio::fs::read_dir(&html_dir)
        .await
        .map_err(|e| HarvestError::persistence(&html_dir, e))?;

    let mut written = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| HarvestError::persistence(&html_dir, e))?
    {
        let path = entry.path();
        let Some(slug) = html_slug(&path) else {
            continue;
        };

        let html = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| HarvestError::persistence(&path, e))?;
        let markdown = advisory_to_markdown(&html)?;
        write_text(&layout.markdown_path(slug), &markdown).await?;

        tracing::debug!("Regenerated markdown for {}", slug);
        written += 1;
    }

    tracing::info!("Regenerated {} markdown documents", written);
    Ok(written)
}

/// Returns the slug of an `<slug>.html` path
fn html_slug(path: &Path) -> Option<&str> {
    if path.extension()? != "html" {
        return None;
    }
    path.file_stem()?.to_str()
}
