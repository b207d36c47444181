use crate::storage::{read_optional, write_text, AdvisoryRecord};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Mapping from advisory link to its index record
///
/// Serialized as a single JSON object keyed by link. Entries are only ever
/// added or overwritten, never removed. Keys are kept sorted so that saving an
/// unchanged index produces identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchiveIndex {
    entries: BTreeMap<String, AdvisoryRecord>,
}

impl ArchiveIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the index from `path`, or an empty index if the file is absent
    pub async fn load(path: &Path) -> Result<Self> {
        match read_optional(path).await? {
            Some(content) => Ok(serde_json::from_str(&content)?),
            None => Ok(Self::new()),
        }
    }

    /// Writes the whole index to `path`
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_text(path, &json).await
    }

    /// Inserts or overwrites the record keyed by its link
    ///
    /// Returns true if the link was not indexed before.
    pub fn insert(&mut self, record: AdvisoryRecord) -> bool {
        self.entries.insert(record.link.clone(), record).is_none()
    }

    pub fn get(&self, link: &str) -> Option<&AdvisoryRecord> {
        self.entries.get(link)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over records in key order
    pub fn records(&self) -> impl Iterator<Item = &AdvisoryRecord> {
        self.entries.values()
    }
}

impl Extend<AdvisoryRecord> for ArchiveIndex {
    fn extend<T: IntoIterator<Item = AdvisoryRecord>>(&mut self, iter: T) {
        for record in iter {
            self.insert(record);
        }
    }
}
