//! Shared state handed to the watcher and the workers for the duration of one run.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::engine::tools::Exclusions;
use crate::{MetadataRecord, Records};

use super::queue::WorkQueue;

/// Set once by the coordinator when the initial scan has finished. Never reset.
#[derive(Clone, Debug, Default)]
pub struct ScanDone(Arc<AtomicBool>);

impl ScanDone {
    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// External stop request for the watcher (Ctrl+C, or the coordinator at shutdown).
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Path → record map written by every worker. The lock is held for one upsert at a time.
#[derive(Clone, Debug, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<Records>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Records> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace the record for `path` (last write wins).
    pub fn upsert(&self, path: PathBuf, record: MetadataRecord) {
        self.lock().insert(path, record);
    }

    pub fn get(&self, path: &Path) -> Option<MetadataRecord> {
        self.lock().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Move the contents out. Called by the coordinator after every writer has joined.
    pub fn take(&self) -> Records {
        std::mem::take(&mut *self.lock())
    }
}

/// Everything the watcher and the workers share. Cloning clones handles, not data.
#[derive(Clone, Debug)]
pub struct PipelineContext {
    pub queue: WorkQueue,
    pub store: SharedStore,
    pub scan_done: ScanDone,
    /// Coordinator-side stop for the watcher; separate from the caller's [`StopSignal`].
    pub shutdown: StopSignal,
    pub exclusions: Arc<Exclusions>,
}

impl PipelineContext {
    pub fn new(exclusions: Exclusions) -> Self {
        Self {
            queue: WorkQueue::new(),
            store: SharedStore::new(),
            scan_done: ScanDone::default(),
            shutdown: StopSignal::new(),
            exclusions: Arc::new(exclusions),
        }
    }

    /// True once the scan has finished and nothing is queued.
    ///
    /// The flag is read first: after it is observed set, every scanner push is already
    /// visible, so an empty queue cannot be hiding scanned paths.
    pub fn scan_drained(&self) -> bool {
        self.scan_done.is_set() && self.queue.is_empty()
    }
}
