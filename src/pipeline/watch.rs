//! Directory watcher: enqueue files created under the root while ingestion runs.
//!
//! Only the root itself is subscribed (non-recursive). Files dropped directly in the root
//! are always seen; creations inside subdirectories are left to the initial scan.
//!
//! Shutdown is inferred: once the scan is done and the queue has stayed empty for
//! `idle_polls` consecutive quiet polls, the watcher stops. A file created after that
//! window closes is not picked up by this run.

use crossbeam_channel::{Receiver, RecvTimeoutError, unbounded};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::engine::tools::should_include;
use crate::error::IngestError;
use crate::utils::config::PackagePaths;

use super::context::{PipelineContext, StopSignal};

/// One creation reported by the event source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedEntry {
    pub path: PathBuf,
    pub is_file: bool,
}

/// Creation entries carried by a single notify event (empty for non-create kinds).
pub fn created_entries(event: &Event) -> Vec<CreatedEntry> {
    if !matches!(event.kind, EventKind::Create(_)) {
        return Vec::new();
    }
    event
        .paths
        .iter()
        .map(|p| CreatedEntry {
            path: p.clone(),
            is_file: p.is_file(),
        })
        .collect()
}

/// Subscription to creation events for one directory.
pub struct CreationEvents {
    // Dropping the watcher releases the OS subscription.
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
}

impl CreationEvents {
    /// Subscribe to `root` (non-recursive).
    pub fn watch(root: &Path) -> Result<Self, IngestError> {
        let (tx, rx) = unbounded();
        let watch_err = |source| IngestError::Watch {
            path: root.to_path_buf(),
            source,
        };
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.send(res);
        })
        .map_err(watch_err)?;
        watcher
            .watch(root, RecursiveMode::NonRecursive)
            .map_err(watch_err)?;
        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Wait up to `timeout` for the first event, then take every event already buffered
    /// behind it. Event-source errors are logged and skipped; they never end the watch.
    pub fn poll(&self, timeout: Duration) -> Vec<CreatedEntry> {
        let first = match self.rx.recv_timeout(timeout) {
            Ok(res) => res,
            Err(RecvTimeoutError::Timeout) => return Vec::new(),
            Err(RecvTimeoutError::Disconnected) => {
                thread::sleep(timeout);
                return Vec::new();
            }
        };
        let mut out = Vec::new();
        for res in std::iter::once(first).chain(self.rx.try_iter()) {
            match res {
                Ok(event) => out.extend(created_entries(&event)),
                Err(e) => log::debug!("watch event error: {}", e),
            }
        }
        out
    }
}

/// Quiescence detector: counts consecutive polls with no events while the scan is done
/// and the queue is empty; any other poll resets the count.
#[derive(Clone, Debug)]
pub struct IdleTracker {
    quiet: u32,
    threshold: u32,
}

impl IdleTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            quiet: 0,
            threshold: threshold.max(1),
        }
    }

    /// Record one poll cycle. Returns true when the watcher should stop.
    pub fn observe(&mut self, saw_events: bool, scan_drained: bool) -> bool {
        if !saw_events && scan_drained {
            self.quiet += 1;
        } else {
            self.quiet = 0;
        }
        self.quiet >= self.threshold
    }

    pub fn quiet_polls(&self) -> u32 {
        self.quiet
    }
}

/// Why the watcher loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchExit {
    Stopped,
    Quiescent,
}

/// Totals reported by the watcher thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchSummary {
    pub queued: usize,
    pub exit: WatchExit,
}

/// Watcher bound to one run's shared context.
pub struct DirectoryWatcher {
    events: CreationEvents,
    ctx: PipelineContext,
    stop: StopSignal,
    poll_interval: Duration,
    idle_polls: u32,
}

impl DirectoryWatcher {
    /// Establish the subscription now so a failure is reported before any thread starts.
    pub fn new(
        root: &Path,
        ctx: PipelineContext,
        stop: StopSignal,
        poll_interval: Duration,
        idle_polls: u32,
    ) -> Result<Self, IngestError> {
        Ok(Self {
            events: CreationEvents::watch(root)?,
            ctx,
            stop,
            poll_interval,
            idle_polls,
        })
    }

    /// Run the watch loop on a named background thread.
    pub fn spawn(self) -> Result<JoinHandle<WatchSummary>, IngestError> {
        let name = PackagePaths::get().thread_name("watcher");
        thread::Builder::new()
            .name(name.clone())
            .spawn(move || self.run())
            .map_err(|source| IngestError::Spawn { name, source })
    }

    /// Poll until stopped or quiescent. Consumes the watcher, releasing the subscription.
    pub fn run(self) -> WatchSummary {
        let mut idle = IdleTracker::new(self.idle_polls);
        let mut queued = 0_usize;
        let exit = loop {
            if self.stop.is_stopped() || self.ctx.shutdown.is_stopped() {
                break WatchExit::Stopped;
            }
            let created = self.events.poll(self.poll_interval);
            let saw_events = !created.is_empty();
            for entry in created {
                if entry.is_file && should_include(&entry.path, &self.ctx.exclusions) {
                    log::debug!("watch: new file {}", entry.path.display());
                    self.ctx.queue.push(entry.path);
                    queued += 1;
                }
            }
            if idle.observe(saw_events, self.ctx.scan_drained()) {
                break WatchExit::Quiescent;
            }
        };
        log::debug!("Watcher exiting ({:?}), queued {} files", exit, queued);
        WatchSummary { queued, exit }
    }
}
