//! Ingestion coordinator: owns one run's queue, store and scan-done flag, and sequences
//! watcher, workers, scan, joins and the final flush.

use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::Opts;
use crate::engine::db_ops::{open_db, persist_records};
use crate::engine::extract::{Extractor, MediaExtractor};
use crate::engine::tools::{Exclusions, check_root_and_canonicalize};
use crate::error::IngestError;
use crate::library::{IngestSummary, Library};
use crate::utils::config::WorkerLimits;

use super::context::{PipelineContext, StopSignal};
use super::scan::run_initial_scan;
use super::watch::{DirectoryWatcher, WatchExit, WatchSummary};
use super::workers::{join_workers, run_worker, spawn_extraction_workers};

/// Runs ingestions with a fixed configuration and extractor.
pub struct Coordinator {
    opts: Opts,
    extractor: Arc<dyn Extractor>,
    stop: StopSignal,
}

impl Coordinator {
    pub fn new(opts: Opts) -> Self {
        Self {
            opts,
            extractor: Arc::new(MediaExtractor::new()),
            stop: StopSignal::new(),
        }
    }

    /// Replace the default lofty-backed extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Handle that stops the watcher early (e.g. from a Ctrl+C handler). Applies to every
    /// later run of this coordinator once triggered.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Ingest `root`: watch + scan + extract, then persist every record.
    ///
    /// Order: watcher and workers start, the scan runs here, the scan-done flag is set,
    /// workers are joined, this thread consumes whatever the watcher still reports until
    /// it goes quiet, the watcher is joined, leftovers are drained, and the records are
    /// flushed in one transaction.
    pub fn run(&self, root: &Path) -> Result<Library, IngestError> {
        let root = check_root_and_canonicalize(root)?;
        let db_path = &self.opts.db_path;
        let mut conn = open_db(db_path).map_err(|e| IngestError::StoreOpen {
            path: db_path.clone(),
            source: e.into(),
        })?;

        let ctx = PipelineContext::new(Exclusions::new(&root, db_path, &self.opts.exclude));
        let poll = self.opts.poll_interval;

        let watcher = DirectoryWatcher::new(
            &root,
            ctx.clone(),
            self.stop.clone(),
            poll,
            self.opts.idle_polls,
        )?;
        let watch_handle = watcher.spawn()?;

        let num_workers = WorkerLimits::current().pool_size(self.opts.num_workers);
        let mut worker_handles = Vec::with_capacity(num_workers);
        if let Err(e) = spawn_extraction_workers(
            num_workers,
            &ctx,
            &self.extractor,
            poll,
            &mut worker_handles,
        ) {
            abort_run(&ctx, worker_handles, watch_handle);
            return Err(e);
        }
        info!("Ingesting {} with {} workers", root.display(), num_workers);

        let scanned = match run_initial_scan(
            &root,
            self.opts.parallel_scan,
            self.opts.follow_links,
            &ctx.exclusions,
            &ctx.queue,
        ) {
            Ok(n) => n,
            Err(e) => {
                abort_run(&ctx, worker_handles, watch_handle);
                return Err(e);
            }
        };
        ctx.scan_done.set();
        debug!("Scan done: {} files queued", scanned);

        let mut processed = join_workers(worker_handles);
        debug!("Workers joined after {} extractions", processed);

        // Tail: the watcher may still report files; keep consuming until it stops.
        processed += run_worker(&ctx, self.extractor.as_ref(), poll, || {
            watch_handle.is_finished()
        });
        ctx.shutdown.stop();
        let watch = join_watcher(watch_handle);
        processed += run_worker(&ctx, self.extractor.as_ref(), Duration::ZERO, || true);

        let records = ctx.store.take();
        let persisted = persist_records(&mut conn, &records)
            .map_err(|e| IngestError::Persist(e.into()))?;
        if persisted.failed > 0 {
            warn!("{} records could not be written", persisted.failed);
        }
        info!(
            "Ingested {} files ({} from scan, {} from watch) into {}",
            records.len(),
            scanned,
            watch.queued,
            db_path.display()
        );

        let summary = IngestSummary {
            workers: num_workers,
            scanned,
            watched: watch.queued,
            processed,
            persisted,
        };
        Ok(Library::new(records, conn, summary))
    }
}

/// Wind down after a failure mid-setup: drop queued work, release workers and the watcher,
/// then join them.
fn abort_run(
    ctx: &PipelineContext,
    workers: Vec<JoinHandle<usize>>,
    watch_handle: JoinHandle<WatchSummary>,
) {
    let dropped = ctx.queue.clear();
    if dropped > 0 {
        debug!("Abandoning {} queued paths", dropped);
    }
    ctx.scan_done.set();
    ctx.shutdown.stop();
    join_workers(workers);
    join_watcher(watch_handle);
}

fn join_watcher(handle: JoinHandle<WatchSummary>) -> WatchSummary {
    handle.join().unwrap_or_else(|_| {
        log::error!("watcher thread panicked");
        WatchSummary {
            queued: 0,
            exit: WatchExit::Stopped,
        }
    })
}
