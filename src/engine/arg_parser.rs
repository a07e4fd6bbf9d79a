use clap::Parser;
use std::path::PathBuf;

/// Ingest a media library directory into SQLite, then browse it from a small shell.
#[derive(Clone, Debug, Parser)]
#[command(name = "medialib")]
#[command(about = "Scan, watch and extract metadata for a media directory.")]
pub struct Cli {
    /// Directory to ingest. Prompted for on stdin when omitted.
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Path to the library database. Default: `library.db` in the working directory.
    #[arg(long, short)]
    pub db: Option<PathBuf>,

    /// Number of extraction workers. Default: available parallelism (minimum 2).
    #[arg(long, short = 'w', value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Watcher and worker poll interval in milliseconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_ms: Option<u64>,

    /// Quiet polls (scan done, queue empty) before the watcher stops.
    #[arg(long, value_parser = clap::value_parser!(u32))]
    pub idle_polls: Option<u32>,

    /// Exclude patterns (glob syntax). Can specify multiple: -e pattern1 pattern2 pattern3
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Follow symbolic links during the initial scan.
    #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Walk the directory tree in parallel for the initial scan.
    #[arg(long, short = 'p', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub parallel_scan: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Exit after ingestion instead of opening the command shell.
    #[arg(long)]
    pub no_shell: bool,
}
