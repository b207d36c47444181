//! Keyword search over an advisory archive
//!
//! The archive index is loaded once when the archive is opened. Each search
//! matches the query as a case-insensitive substring of advisory titles and
//! returns the full Markdown of every match.

use crate::storage::{read_optional, AdvisoryRecord, ArchiveIndex, ArchiveLayout};
use crate::url::slug_from_link;
use crate::{HarvestError, Result};
use std::path::PathBuf;

/// Read-only view of an output directory
pub struct AdvisoryArchive {
    layout: ArchiveLayout,
    index: ArchiveIndex,
}

impl AdvisoryArchive {
    /// Opens the archive rooted at `root` and loads its index
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let layout = ArchiveLayout::new(root);
        let index = ArchiveIndex::load(&layout.index_path()).await?;

        if index.is_empty() {
            tracing::warn!("No advisories indexed under {}", layout.root().display());
        } else {
            tracing::info!("Loaded {} indexed advisories", index.len());
        }

        Ok(Self { layout, index })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Records whose title contains `query`, ignoring case, in index order
    pub fn matching(&self, query: &str) -> Vec<&AdvisoryRecord> {
        let needle = query.to_lowercase();
        self.index
            .records()
            .filter(|record| record.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Returns the Markdown document of every advisory matching `query`
    ///
    /// Fails with `HarvestError::NotFound` if any matching advisory is
    /// indexed but its Markdown file is missing.
    pub async fn search(&self, query: &str) -> Result<Vec<String>> {
        let mut documents = Vec::new();

        for record in self.matching(query) {
            let path = self.layout.markdown_path(slug_from_link(&record.link)?);
            let markdown = read_optional(&path)
                .await?
                .ok_or_else(|| HarvestError::NotFound {
                    link: record.link.clone(),
                    path: path.clone(),
                })?;
            documents.push(markdown);
        }

        tracing::debug!("Query {:?} matched {} advisories", query, documents.len());
        Ok(documents)
    }
}
