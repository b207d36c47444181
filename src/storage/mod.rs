//! Storage module for persisting the advisory archive
//!
//! This module handles all filesystem state kept between runs:
//! - The on-disk layout of an output root
//! - The checkpoint (resume marker) file
//! - The archive index mapping advisory links to their metadata
//!
//! Writes are plain overwrites; nothing here is transactional across files.

mod checkpoint;
mod index;
mod layout;

pub use checkpoint::CheckpointStore;
pub use index::ArchiveIndex;
pub use layout::ArchiveLayout;

use crate::{HarvestError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One advisory as listed on an index page
///
/// `link` is the site-relative path of the advisory and its unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryRecord {
    pub date: String,
    pub category: String,
    pub title: String,
    pub link: String,
}

/// Reads a text file, returning `None` if it does not exist
pub(crate) async fn read_optional(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(HarvestError::persistence(path, e)),
    }
}

/// Writes a text file, replacing any previous content
pub(crate) async fn write_text(path: &Path, content: &str) -> Result<()> {
    tokio::fs::write(path, content)
        .await
        .map_err(|e| HarvestError::persistence(path, e))
}
