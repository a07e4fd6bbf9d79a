//! Database operations: schema, open/load, record upserts.

mod connection;
mod writer;

pub use connection::{load_records, open_db, open_db_in_memory, record_count};
pub use writer::{PersistSummary, persist_records, upsert_record};

/// WAL tuning pragmas (synchronous, autocheckpoint, size limit). Use after PRAGMA journal_mode = WAL.
pub(crate) const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA wal_autocheckpoint = 10000;
        PRAGMA journal_size_limit = 67108864;
        "#;

/// Upsert keyed by `filepath`; keeps the row id on replace.
pub(crate) const UPSERT_RECORD_SQL: &str = r#"
INSERT INTO media_metadata (filepath, type, artist, album, title, year, duration)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
ON CONFLICT(filepath) DO UPDATE SET
    type = excluded.type,
    artist = excluded.artist,
    album = excluded.album,
    title = excluded.title,
    year = excluded.year,
    duration = excluded.duration
"#;

/// Schema for the media_metadata table.
pub(crate) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS media_metadata (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filepath TEXT UNIQUE,
    type TEXT,
    artist TEXT,
    album TEXT,
    title TEXT,
    year TEXT,
    duration TEXT
);
"#;
