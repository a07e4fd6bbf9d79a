//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Default library database filename (in the working directory).
pub const DB_FILENAME: &str = "library.db";

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
    thread_prefix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
                thread_prefix: pkg.to_string(),
            }
        })
    }

    /// Per-directory settings file (`.medialib.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Name for a pipeline thread, e.g. `medialib-worker-3`.
    pub fn thread_name(&self, role: &str) -> String {
        format!("{}-{}", self.thread_prefix, role)
    }

    /// Filenames excluded from scanning and watching by default. The database itself is
    /// excluded by canonical path (see `Exclusions`).
    pub fn default_exclude_patterns(&self) -> Vec<String> {
        vec![self.config_filename().to_string()]
    }
}

// ---- Worker threads ----

/// Thread limits for the extraction pool.
#[derive(Clone, Copy, Debug)]
pub struct WorkerLimits {
    /// Available threads (from rayon); set by [`WorkerLimits::current()`].
    pub all_threads: usize,
    /// Minimum pool size.
    pub floor: usize,
}

impl WorkerLimits {
    pub const FLOOR_THREADS: usize = 2;

    /// Build limits with `all_threads` set from `rayon::current_num_threads()`.
    pub fn current() -> Self {
        Self {
            all_threads: rayon::current_num_threads(),
            floor: Self::FLOOR_THREADS,
        }
    }

    /// Pool size: the override if given, else available threads; never below the floor.
    pub fn pool_size(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.all_threads).max(self.floor)
    }
}

// ---- Watcher / quiescence ----

/// Poll and idle tuning for the watcher and the worker queue wait.
pub struct WatchConsts;

impl WatchConsts {
    /// Event poll / queue pop timeout.
    pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
    /// Quiet polls before the watcher infers quiescence (~2 s at the default interval).
    pub const IDLE_POLLS: u32 = 20;
}

// ---- Scanning ----

/// jwalk busy timeout for the rayon pool during a parallel scan.
pub const PARALLEL_SCAN_BUSY_TIMEOUT: Duration = Duration::from_secs(60);
