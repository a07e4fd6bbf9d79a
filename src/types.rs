//! Public and internal types for the medialib API and pipeline.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::utils::config::{DB_FILENAME, WatchConsts};

/// Field names a [`MetadataRecord`] may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Type,
    Artist,
    Album,
    Title,
    Year,
    Duration,
    Error,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Type => "Type",
            Field::Artist => "Artist",
            Field::Album => "Album",
            Field::Title => "Title",
            Field::Year => "Year",
            Field::Duration => "Duration",
            Field::Error => "Error",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field/value bag describing one file. Keys are unique; iteration follows the `Field` declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    fields: BTreeMap<Field, String>,
}

impl MetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record with only the `Type` field set.
    pub fn of_kind(kind: MediaKind) -> Self {
        let mut record = Self::new();
        record.set(Field::Type, kind.label());
        record
    }

    /// Set (or overwrite) a field.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Value of `field`, or `""` when missing (the durable-store mapping).
    pub fn get_or_empty(&self, field: Field) -> &str {
        self.get(field).unwrap_or("")
    }

    /// True when extraction failed for this file.
    pub fn is_error(&self) -> bool {
        self.get(Field::Error).is_some_and(|e| !e.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Media kinds a path is classified into before extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
    Plugin,
    Preset,
    Other,
}

impl MediaKind {
    /// Classify by (case-insensitive) file extension.
    pub fn classify(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "mp3" | "wav" | "flac" | "ogg" | "m4a" | "aiff" => MediaKind::Audio,
            "mp4" | "avi" | "mkv" | "mov" => MediaKind::Video,
            "vst" | "vst3" | "dll" => MediaKind::Plugin,
            "preset" | "fxp" => MediaKind::Preset,
            _ => MediaKind::Other,
        }
    }

    /// Value written into the `Type` field.
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Audio => "Audio",
            MediaKind::Video => "Video",
            MediaKind::Plugin => "VST Plugin",
            MediaKind::Preset => "Preset",
            MediaKind::Other => "Other",
        }
    }
}

/// Final in-memory store contents: path → record.
pub type Records = HashMap<PathBuf, MetadataRecord>;

/// One row of the `media_metadata` table. Missing record fields are stored as `""`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredRow {
    pub filepath: String,
    pub kind: String,
    pub artist: String,
    pub album: String,
    pub title: String,
    pub year: String,
    pub duration: String,
}

impl StoredRow {
    /// Map a record onto the table's columns.
    pub fn from_record(filepath: impl Into<String>, record: &MetadataRecord) -> Self {
        Self {
            filepath: filepath.into(),
            kind: record.get_or_empty(Field::Type).to_string(),
            artist: record.get_or_empty(Field::Artist).to_string(),
            album: record.get_or_empty(Field::Album).to_string(),
            title: record.get_or_empty(Field::Title).to_string(),
            year: record.get_or_empty(Field::Year).to_string(),
            duration: record.get_or_empty(Field::Duration).to_string(),
        }
    }
}

/// Full options (CLI, `.medialib.toml`, and lib callers).
#[derive(Clone, Debug)]
pub struct Opts {
    /// Library database path. Relative paths resolve against the working directory.
    pub db_path: PathBuf,
    /// Override worker count. When None, derived from available parallelism (minimum 2).
    pub num_workers: Option<usize>,
    /// How long the watcher waits for events (and workers wait on the queue) per cycle.
    pub poll_interval: Duration,
    /// Consecutive quiet polls (scan done, queue empty) after which the watcher stops.
    pub idle_polls: u32,
    /// Exclude patterns (glob syntax, matched against file name and full path).
    pub exclude: Vec<String>,
    /// Follow symbolic links during the initial scan.
    pub follow_links: bool,
    /// Use the parallel walker (jwalk) for the initial scan.
    pub parallel_scan: bool,
    /// Debug logging.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_FILENAME),
            num_workers: None,
            poll_interval: WatchConsts::POLL_INTERVAL,
            idle_polls: WatchConsts::IDLE_POLLS,
            exclude: Vec::new(),
            follow_links: false,
            parallel_scan: false,
            verbose: false,
        }
    }
}
