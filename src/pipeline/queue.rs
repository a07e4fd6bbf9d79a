//! Unbounded FIFO of discovered paths with a timed pop.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use std::path::PathBuf;
use std::time::Duration;

/// Result of [`WorkQueue::try_pop`].
#[derive(Debug, PartialEq, Eq)]
pub enum Pop {
    Item(PathBuf),
    TimedOut,
}

/// Thread-safe path queue. Clones share the same queue. Producers never block.
///
/// The queue holds both channel ends, so it can never disconnect while any clone is alive.
#[derive(Clone, Debug)]
pub struct WorkQueue {
    tx: Sender<PathBuf>,
    rx: Receiver<PathBuf>,
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Append a path and wake one waiting consumer.
    pub fn push(&self, path: PathBuf) {
        // Cannot fail: `self.rx` keeps the channel connected.
        let _ = self.tx.send(path);
    }

    /// Wait up to `timeout` for a path. Never blocks longer than `timeout`.
    pub fn try_pop(&self, timeout: Duration) -> Pop {
        match self.rx.recv_timeout(timeout) {
            Ok(path) => Pop::Item(path),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => Pop::TimedOut,
        }
    }

    /// Point-in-time snapshot; stale as soon as it returns. Pair with the scan-done flag.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Drop everything currently queued. Returns how many paths were discarded.
    pub fn clear(&self) -> usize {
        self.rx.try_iter().count()
    }
}
