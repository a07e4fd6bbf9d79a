//! Pipeline components: work queue, shared state, scanner, watcher, workers, coordinator.

pub mod context;
pub mod orchestrator;
pub mod queue;
pub mod scan;
pub mod watch;
pub mod workers;

pub use context::{PipelineContext, ScanDone, SharedStore, StopSignal};
pub use orchestrator::Coordinator;
pub use queue::{Pop, WorkQueue};
pub use scan::{WalkOutcome, run_initial_scan, run_scan_loop, to_outcome_jwalk, to_outcome_walkdir};
pub use watch::{
    CreatedEntry, CreationEvents, DirectoryWatcher, IdleTracker, WatchExit, WatchSummary,
    created_entries,
};
pub use workers::{extract_guarded, join_workers, run_worker, spawn_extraction_workers};
