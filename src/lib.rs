//! Medialib: concurrent media-library ingestion (scan + watch + extract) into SQLite.

pub mod engine;
pub mod error;
pub mod library;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use engine::extract::{Extractor, MediaExtractor};
pub use error::IngestError;
pub use library::{CustomTagIndex, IngestSummary, Library};
pub use pipeline::{Coordinator, StopSignal};

use log::debug;
use std::path::Path;

/// Single entry point: ingest `root` with `opts` using the default extractor.
///
/// Blocks until the scan, the watcher and every worker have finished and the records are
/// persisted. Use [`Coordinator`] directly to supply a custom [`Extractor`] or to stop the
/// watcher early.
pub fn ingest_dir(root: &Path, opts: &Opts) -> Result<Library, IngestError> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    Coordinator::new(opts.clone()).run(root)
}
