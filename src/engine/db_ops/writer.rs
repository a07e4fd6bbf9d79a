//! Record writes: single upserts and the post-ingestion bulk flush.

use anyhow::{Context, Result};
use rusqlite::{Connection, Statement};
use std::path::Path;

use crate::engine::tools::path_to_db_string;
use crate::{Records, StoredRow};

use super::UPSERT_RECORD_SQL;

/// Outcome of [`persist_records`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub written: usize,
    pub failed: usize,
}

fn execute_upsert(stmt: &mut Statement<'_>, row: &StoredRow) -> rusqlite::Result<usize> {
    stmt.execute((
        row.filepath.as_str(),
        row.kind.as_str(),
        row.artist.as_str(),
        row.album.as_str(),
        row.title.as_str(),
        row.year.as_str(),
        row.duration.as_str(),
    ))
}

/// Insert or replace one row keyed by `filepath`.
pub fn upsert_record(conn: &Connection, row: &StoredRow) -> Result<()> {
    let mut stmt = conn
        .prepare_cached(UPSERT_RECORD_SQL)
        .context("prepare upsert")?;
    execute_upsert(&mut stmt, row).context("upsert record")?;
    Ok(())
}

/// Upsert every record in one transaction. A failing row is logged and skipped; only
/// opening or committing the transaction is an error.
pub fn persist_records(conn: &mut Connection, records: &Records) -> Result<PersistSummary> {
    let mut paths: Vec<&Path> = records.keys().map(|p| p.as_path()).collect();
    paths.sort();

    let tx = conn.transaction().context("begin transaction")?;
    let mut summary = PersistSummary::default();
    {
        let mut stmt = tx.prepare(UPSERT_RECORD_SQL).context("prepare upsert")?;
        for path in paths {
            let row = StoredRow::from_record(path_to_db_string(path), &records[path]);
            match execute_upsert(&mut stmt, &row) {
                Ok(_) => summary.written += 1,
                Err(e) => {
                    log::warn!("SQL error on insert for {}: {}", row.filepath, e);
                    summary.failed += 1;
                }
            }
        }
    }
    tx.commit().context("commit transaction")?;
    log::debug!(
        "Persisted {} records ({} failed)",
        summary.written,
        summary.failed
    );
    Ok(summary)
}
