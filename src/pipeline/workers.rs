//! Extraction workers: pop paths, extract, upsert into the shared store.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::engine::extract::Extractor;
use crate::error::IngestError;
use crate::utils::config::PackagePaths;
use crate::{Field, MediaKind, MetadataRecord};

use super::context::PipelineContext;
use super::queue::Pop;

/// Run the extractor, turning a panic into an error record so one bad file cannot take a
/// worker down.
pub fn extract_guarded(extractor: &dyn Extractor, path: &Path) -> MetadataRecord {
    match catch_unwind(AssertUnwindSafe(|| extractor.extract(path))) {
        Ok(record) => record,
        Err(_) => {
            log::warn!("extractor panicked on {}", path.display());
            MetadataRecord::of_kind(MediaKind::classify(path))
                .with(Field::Error, "Metadata extraction failed: extractor panicked")
        }
    }
}

/// Consume the queue until it is empty and `exhausted()` reports no more producers.
/// `exhausted` is only consulted after a timed-out pop. Returns the number of paths processed.
pub fn run_worker<F>(
    ctx: &PipelineContext,
    extractor: &dyn Extractor,
    poll_interval: Duration,
    exhausted: F,
) -> usize
where
    F: Fn() -> bool,
{
    let mut processed = 0_usize;
    loop {
        match ctx.queue.try_pop(poll_interval) {
            Pop::Item(path) => {
                let record = extract_guarded(extractor, &path);
                if record.is_error() {
                    log::debug!(
                        "{}: {}",
                        path.display(),
                        record.get_or_empty(Field::Error)
                    );
                }
                ctx.store.upsert(path, record);
                processed += 1;
            }
            // Flag before queue: see `PipelineContext::scan_drained`.
            Pop::TimedOut => {
                if exhausted() && ctx.queue.is_empty() {
                    break;
                }
            }
        }
    }
    processed
}

/// Spawn `num_workers` named extraction threads that exit once the scan is drained.
/// Handles are pushed into `handles` as they start, so the caller can still join the
/// ones that did start if a later spawn fails.
pub fn spawn_extraction_workers(
    num_workers: usize,
    ctx: &PipelineContext,
    extractor: &Arc<dyn Extractor>,
    poll_interval: Duration,
    handles: &mut Vec<JoinHandle<usize>>,
) -> Result<(), IngestError> {
    for i in 0..num_workers {
        let ctx = ctx.clone();
        let extractor = Arc::clone(extractor);
        let name = PackagePaths::get().thread_name(&format!("worker-{i}"));
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let done = ctx.scan_done.clone();
                run_worker(&ctx, extractor.as_ref(), poll_interval, || done.is_set())
            })
            .map_err(|source| IngestError::Spawn { name, source })?;
        handles.push(handle);
    }
    Ok(())
}

/// Join workers, summing processed counts. A panicked worker is logged, not propagated.
pub fn join_workers(handles: Vec<JoinHandle<usize>>) -> usize {
    handles
        .into_iter()
        .map(|h| {
            h.join().unwrap_or_else(|_| {
                log::error!("extraction worker panicked");
                0
            })
        })
        .sum()
}
