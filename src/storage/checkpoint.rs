use crate::storage::{read_optional, write_text};
use crate::Result;
use std::path::{Path, PathBuf};

/// Persists the link of the most recently archived advisory
///
/// The file holds the link as a single line with no trailing newline. A
/// missing or blank file means no run has completed yet.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the checkpoint, `None` on a first run
    pub async fn load(&self) -> Result<Option<String>> {
        let content = read_optional(&self.path).await?;
        Ok(content
            .map(|c| c.trim().to_string())
            .filter(|link| !link.is_empty()))
    }

    /// Overwrites the checkpoint with `link`
    pub async fn save(&self, link: &str) -> Result<()> {
        write_text(&self.path, link).await
    }
}
