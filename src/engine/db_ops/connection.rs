//! Open and load the library database.

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::StoredRow;

use super::{SCHEMA, WAL_PRAGMAS};

/// Enable WAL and apply schema to an open connection (idempotent).
fn apply_wal_and_schema(conn: &Connection) -> Result<()> {
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
        .context("enable WAL")?;
    conn.execute_batch(WAL_PRAGMAS).context("set WAL pragmas")?;
    conn.execute_batch(SCHEMA).context("create schema")?;
    Ok(())
}

/// Open or create the library DB and ensure schema + WAL.
pub fn open_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path).context("open database")?;
    apply_wal_and_schema(&conn)?;
    Ok(conn)
}

/// Open an in-memory DB with the same schema (tests; no WAL pragmas needed).
pub fn open_db_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory database")?;
    conn.execute_batch(SCHEMA).context("create schema")?;
    Ok(conn)
}

/// Load every row of `media_metadata`, ordered by filepath. NULL columns read as `""`.
pub fn load_records(conn: &Connection) -> Result<Vec<StoredRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT filepath, type, artist, album, title, year, duration \
             FROM media_metadata ORDER BY filepath",
        )
        .context("prepare select")?;
    let rows = stmt.query_map([], |row| {
        let text = |i: usize| -> rusqlite::Result<String> {
            Ok(row.get::<_, Option<String>>(i)?.unwrap_or_default())
        };
        Ok(StoredRow {
            filepath: text(0)?,
            kind: text(1)?,
            artist: text(2)?,
            album: text(3)?,
            title: text(4)?,
            year: text(5)?,
            duration: text(6)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("read media_metadata row")?);
    }
    Ok(out)
}

/// Number of rows in `media_metadata`.
pub fn record_count(conn: &Connection) -> Result<usize> {
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM media_metadata", [], |r| r.get(0))
        .context("count records")?;
    Ok(n.max(0) as usize)
}
