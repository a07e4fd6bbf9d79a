//! Load `.medialib.toml` from the root directory (CLI only). Lib callers build [`Opts`] directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Deserialize)]
pub(crate) struct MedialibToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    db_path: Option<String>,
    workers: Option<usize>,
    poll_ms: Option<u64>,
    idle_polls: Option<u32>,
    exclude: Option<Vec<String>>,
    follow_links: Option<bool>,
    parallel_scan: Option<bool>,
    verbose: Option<bool>,
}

/// Load `.medialib.toml` from `dir` if present. Returns None if missing, unreadable, or malformed.
pub(crate) fn load_medialib_toml(dir: &Path) -> Option<MedialibToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_medialib_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub(crate) fn parse_medialib_toml(s: &str) -> Result<MedialibToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub(crate) fn apply_file_to_opts(file: &MedialibToml, opts: &mut Opts) {
    let sec = &file.settings;
    if let Some(ref p) = sec.db_path {
        opts.db_path = PathBuf::from(p);
    }
    if let Some(n) = sec.workers {
        opts.num_workers = Some(n);
    }
    if let Some(ms) = sec.poll_ms {
        opts.poll_interval = Duration::from_millis(ms.max(1));
    }
    apply_file_opt!(sec, opts, idle_polls => idle_polls);
    if let Some(ref v) = sec.exclude {
        opts.exclude = v.clone();
    }
    apply_file_opt!(sec, opts, follow_links => follow_links);
    apply_file_opt!(sec, opts, parallel_scan => parallel_scan);
    apply_file_opt!(sec, opts, verbose => verbose);
}
