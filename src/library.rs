//! Post-ingestion library: final records, the open database, and user tags.

use anyhow::Result;
use rusqlite::Connection;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::engine::db_ops::{PersistSummary, load_records};
use crate::{MetadataRecord, Records, StoredRow};

/// Path → free-text tags, in the order they were added. Append-only per path.
///
/// Only touched after ingestion, from one thread, so it is not locked.
#[derive(Clone, Debug, Default)]
pub struct CustomTagIndex {
    tags: HashMap<PathBuf, Vec<String>>,
}

impl CustomTagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `tag` for `path`. Blank tags are ignored; returns whether a tag was added.
    pub fn add(&mut self, path: impl Into<PathBuf>, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return false;
        }
        self.tags.entry(path.into()).or_default().push(tag);
        true
    }

    pub fn get(&self, path: &Path) -> &[String] {
        self.tags.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Counts for one ingestion run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Worker threads started.
    pub workers: usize,
    /// Files queued by the initial scan.
    pub scanned: usize,
    /// Files queued by the watcher.
    pub watched: usize,
    /// Paths extracted (duplicates counted each time).
    pub processed: usize,
    pub persisted: PersistSummary,
}

/// Result of a completed run.
pub struct Library {
    records: Records,
    conn: Connection,
    tags: CustomTagIndex,
    summary: IngestSummary,
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("records", &self.records.len())
            .field("tags", &self.tags.len())
            .field("summary", &self.summary)
            .finish()
    }
}

impl Library {
    pub fn new(records: Records, conn: Connection, summary: IngestSummary) -> Self {
        Self {
            records,
            conn,
            tags: CustomTagIndex::new(),
            summary,
        }
    }

    /// In-memory records as of the end of the run.
    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn record(&self, path: &Path) -> Option<&MetadataRecord> {
        self.records.get(path)
    }

    /// Records sorted by path, for stable display.
    pub fn sorted_records(&self) -> Vec<(&PathBuf, &MetadataRecord)> {
        let mut v: Vec<_> = self.records.iter().collect();
        v.sort_by(|a, b| a.0.cmp(b.0));
        v
    }

    /// Every row currently in the database.
    pub fn stored_rows(&self) -> Result<Vec<StoredRow>> {
        load_records(&self.conn)
    }

    pub fn summary(&self) -> &IngestSummary {
        &self.summary
    }

    pub fn add_tag(&mut self, path: impl Into<PathBuf>, tag: impl Into<String>) -> bool {
        self.tags.add(path, tag)
    }

    pub fn tags(&self, path: &Path) -> &[String] {
        self.tags.get(path)
    }
}
