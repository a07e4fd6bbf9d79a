//! Path and filter utilities

use std::path::{Path, PathBuf};

use crate::error::IngestError;
use crate::utils::config::PackagePaths;

/// Normalize path to a portable DB string: forward slashes (so Windows `\` becomes `/`).
pub fn path_to_db_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Check if a file should be excluded based on OS-specific hidden files
pub fn is_os_hidden_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        match name {
            // macOS
            ".DS_Store" | ".AppleDouble" | ".LSOverride" => true,
            // Windows
            "Thumbs.db" | "ehthumbs.db" | "Desktop.ini" | "$RECYCLE.BIN" => true,
            // Linux
            ".directory" => true,
            _ => {
                // macOS resource forks, trash dirs
                name.starts_with("._") || name.starts_with(".Trash-")
            }
        }
    } else {
        false
    }
}

/// Paths the scanner and the watcher must never enqueue.
#[derive(Clone, Debug, Default)]
pub struct Exclusions {
    pub root: PathBuf,
    /// Canonical library database path plus its SQLite sidecars.
    pub db_files: Vec<PathBuf>,
    pub patterns: Vec<String>,
}

impl Exclusions {
    /// Build exclusions for `root` (canonical) and the database at `db_path`, plus user patterns.
    pub fn new(root: &Path, db_path: &Path, user_patterns: &[String]) -> Self {
        let mut patterns = PackagePaths::get().default_exclude_patterns();
        patterns.extend(user_patterns.iter().cloned());
        Self {
            root: root.to_path_buf(),
            db_files: db_sidecar_paths(db_path),
            patterns,
        }
    }
}

/// Canonical database path and its `-wal`, `-shm`, `-journal` siblings (which may not exist yet).
pub fn db_sidecar_paths(db_path: &Path) -> Vec<PathBuf> {
    let Some(name) = db_path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
        return Vec::new();
    };
    let parent = match db_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let parent = parent.canonicalize().unwrap_or(parent);
    ["", "-wal", "-shm", "-journal"]
        .iter()
        .map(|suffix| parent.join(format!("{name}{suffix}")))
        .collect()
}

/// Returns true if the path should be enqueued (not excluded).
pub fn should_include(path: &Path, exclusions: &Exclusions) -> bool {
    if path == exclusions.root {
        return false;
    }
    if exclusions.db_files.iter().any(|db| path == db.as_path()) {
        return false;
    }
    if is_os_hidden_file(path) {
        return false;
    }
    if exclusions.patterns.is_empty() {
        return true;
    }
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return true,
    };
    let path_str = path.to_str().unwrap_or("");
    !exclusions
        .patterns
        .iter()
        .any(|pattern| glob_match(pattern, name) || glob_match(pattern, path_str))
}

/// Simple glob pattern matching (supports * and ?)
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.strip_prefix('!').unwrap_or(pattern).chars().collect();
    let text: Vec<char> = text.chars().collect();
    glob_match_chars(&pattern, &text)
}

fn glob_match_chars(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => {
            if rest.is_empty() {
                return true; // trailing * matches everything
            }
            (0..=text.len()).any(|i| glob_match_chars(rest, &text[i..]))
        }
        Some(('?', rest)) => !text.is_empty() && glob_match_chars(rest, &text[1..]),
        Some((c, rest)) => text.first() == Some(c) && glob_match_chars(rest, &text[1..]),
    }
}

/// Validate that `path` is an existing directory and return its canonical form.
pub fn check_root_and_canonicalize(path: &Path) -> Result<PathBuf, IngestError> {
    if !path.is_dir() {
        return Err(IngestError::InvalidRoot(path.to_path_buf()));
    }
    path.canonicalize()
        .map_err(|_| IngestError::InvalidRoot(path.to_path_buf()))
}
