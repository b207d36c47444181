use crate::storage::CheckpointStore;
use crate::{HarvestError, Result};
use std::path::{Path, PathBuf};

const CHECKPOINT_FILE: &str = "checkpoint.txt";
const INDEX_FILE: &str = "index.json";
const HTML_DIR: &str = "html";
const MARKDOWN_DIR: &str = "markdown";

/// File layout of one output root
///
/// ```text
/// <root>/checkpoint.txt
/// <root>/index.json
/// <root>/html/<slug>.html
/// <root>/markdown/<slug>.md
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveLayout {
    root: PathBuf,
}

impl ArchiveLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.root.join(CHECKPOINT_FILE)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn html_dir(&self) -> PathBuf {
        self.root.join(HTML_DIR)
    }

    pub fn markdown_dir(&self) -> PathBuf {
        self.root.join(MARKDOWN_DIR)
    }

    pub fn html_path(&self, slug: &str) -> PathBuf {
        self.html_dir().join(format!("{slug}.html"))
    }

    pub fn markdown_path(&self, slug: &str) -> PathBuf {
        self.markdown_dir().join(format!("{slug}.md"))
    }

    pub fn checkpoint_store(&self) -> CheckpointStore {
        CheckpointStore::new(self.checkpoint_path())
    }

    /// Creates the root, `html/` and `markdown/` directories if missing
    pub async fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.html_dir(), self.markdown_dir()] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| HarvestError::persistence(&dir, e))?;
        }
        Ok(())
    }
}
