//! Fatal ingestion errors. Per-file extraction failures are data (the `Error` field), not errors.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed source for failures raised through `anyhow` helpers (database layer).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Setup and run failures that abort a whole ingestion run.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Root is missing or not a directory
    #[error("directory does not exist or is not a directory: {}", .0.display())]
    InvalidRoot(PathBuf),

    /// Library database could not be opened or initialised
    #[error("cannot open library database {}: {source}", .path.display())]
    StoreOpen {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// Filesystem watch could not be established
    #[error("cannot watch {}: {source}", .path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// Initial scan could not traverse the tree
    #[error("error scanning directory {}: {message}", .root.display())]
    Scan { root: PathBuf, message: String },

    /// A pipeline thread could not be started
    #[error("cannot spawn {name} thread: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Flush transaction could not be opened or committed
    #[error("cannot persist records: {0}")]
    Persist(#[source] BoxError),
}
