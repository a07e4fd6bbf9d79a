//! Initial scan: one recursive walk of the root, pushing every regular file onto the queue.

use std::path::{Path, PathBuf};

use crate::engine::tools::{Exclusions, should_include};
use crate::error::IngestError;
use crate::utils::config::PARALLEL_SCAN_BUSY_TIMEOUT;

use super::queue::WorkQueue;

/// One result from a directory walk: either a path to consider or an error with optional path.
pub enum WalkOutcome {
    Ok(PathBuf),
    Err { msg: String, path: Option<PathBuf> },
}

/// Convert a jwalk result into [`WalkOutcome`].
pub fn to_outcome_jwalk(r: Result<jwalk::DirEntry<((), ())>, jwalk::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => WalkOutcome::Ok(entry.path()),
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => WalkOutcome::Ok(entry.into_path()),
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

fn jwalk_iter(root: &Path, follow_links: bool) -> Box<dyn Iterator<Item = WalkOutcome>> {
    use jwalk::Parallelism;
    Box::new(
        jwalk::WalkDir::new(root)
            .follow_links(follow_links)
            .parallelism(Parallelism::RayonDefaultPool {
                busy_timeout: PARALLEL_SCAN_BUSY_TIMEOUT,
            })
            .into_iter()
            .map(to_outcome_jwalk),
    )
}

fn walkdir_iter(root: &Path, follow_links: bool) -> Box<dyn Iterator<Item = WalkOutcome>> {
    use walkdir::WalkDir;
    Box::new(
        WalkDir::new(root)
            .follow_links(follow_links)
            .into_iter()
            .map(to_outcome_walkdir),
    )
}

/// Walk `root` on the calling thread and enqueue every included regular file.
/// Returns the number of paths pushed. Any traversal error aborts the scan.
pub fn run_initial_scan(
    root: &Path,
    parallel: bool,
    follow_links: bool,
    exclusions: &Exclusions,
    queue: &WorkQueue,
) -> Result<usize, IngestError> {
    let iter = match parallel {
        true => jwalk_iter(root, follow_links),
        false => walkdir_iter(root, follow_links),
    };
    let count = run_scan_loop(root, iter, exclusions, queue)?;
    log::debug!("Initial scan queued {} files", count);
    Ok(count)
}

/// Consume `iter`, pushing included regular files. Symlinks count when their target is a file.
pub fn run_scan_loop<I>(
    root: &Path,
    iter: I,
    exclusions: &Exclusions,
    queue: &WorkQueue,
) -> Result<usize, IngestError>
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut count = 0_usize;
    for outcome in iter {
        match outcome {
            WalkOutcome::Ok(path) => {
                if path.is_file() && should_include(&path, exclusions) {
                    queue.push(path);
                    count += 1;
                }
            }
            WalkOutcome::Err { msg, path } => {
                let message = match path {
                    Some(p) => format!("{} (path: {})", msg, p.display()),
                    None => msg,
                };
                return Err(IngestError::Scan {
                    root: root.to_path_buf(),
                    message,
                });
            }
        }
    }
    Ok(count)
}
