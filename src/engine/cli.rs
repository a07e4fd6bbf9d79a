//! CLI command handler: ingest DIR, print a summary, then open the command shell.

use anyhow::{Context, Result, bail};
use colored::Colorize;
use log::{debug, info};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::Opts;
use crate::engine::arg_parser::Cli;
use crate::engine::shell::run_shell;
use crate::library::Library;
use crate::pipeline::Coordinator;
use crate::utils::medialib_toml::{apply_file_to_opts, load_medialib_toml};
use crate::utils::setup_logging;

/// Layer opts: defaults, then `.medialib.toml` in `root`, then CLI flags.
pub fn setup_opts(cli: &Cli, root: &Path) -> Opts {
    let mut opts = Opts::default();
    if let Some(file) = load_medialib_toml(root) {
        apply_file_to_opts(&file, &mut opts);
    }
    if let Some(ref db) = cli.db {
        opts.db_path = db.clone();
    }
    if cli.workers.is_some() {
        opts.num_workers = cli.workers;
    }
    if let Some(ms) = cli.poll_ms {
        opts.poll_interval = Duration::from_millis(ms);
    }
    if let Some(n) = cli.idle_polls {
        opts.idle_polls = n;
    }
    if !cli.exclude.is_empty() {
        opts.exclude = cli.exclude.clone();
    }
    if let Some(v) = cli.follow_links {
        opts.follow_links = v;
    }
    if let Some(v) = cli.parallel_scan {
        opts.parallel_scan = v;
    }
    if let Some(v) = cli.verbose {
        opts.verbose = v;
    }
    opts
}

/// Read the target directory from `input` when it was not given on the command line.
pub fn prompt_for_dir(input: &mut impl BufRead, out: &mut impl Write) -> Result<PathBuf> {
    write!(out, "Enter the directory to scan: ")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("read directory from stdin")?;
    let dir = line.trim();
    if dir.is_empty() {
        bail!("no directory given");
    }
    Ok(PathBuf::from(dir))
}

fn print_summary(library: &Library, opts: &Opts) {
    let s = library.summary();
    println!(
        "{} {} files ({} scanned, {} from watcher) with {} workers",
        "Ingested".green(),
        library.records().len(),
        s.scanned,
        s.watched,
        s.workers
    );
    let errors = library.records().values().filter(|r| r.is_error()).count();
    if errors > 0 {
        println!("{} {} files could not be read", "Failed".red(), errors);
    }
    println!(
        "Database: {} ({} rows written, {} failed)",
        opts.db_path.display(),
        s.persisted.written,
        s.persisted.failed
    );
}

/// Ingest the directory, report, and run the shell unless `--no-shell`.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let dir = match cli.dir {
        Some(ref d) => d.clone(),
        None => prompt_for_dir(&mut io::stdin().lock(), &mut io::stdout())?,
    };
    let opts = setup_opts(cli, &dir);
    setup_logging(opts.verbose);
    debug!("{} CONFIG:{:#?}", env!("CARGO_PKG_NAME").to_uppercase(), opts);

    let coordinator = Coordinator::new(opts);
    let stop = coordinator.stop_signal();
    let ingesting = Arc::new(AtomicBool::new(true));
    let ingesting_handler = Arc::clone(&ingesting);
    ctrlc::set_handler(move || {
        if ingesting_handler.load(Ordering::Acquire) {
            info!("Stopping watcher; queued files will still be processed.");
            stop.stop();
        } else {
            std::process::exit(130);
        }
    })
    .context("set Ctrl+C handler")?;

    let mut library = coordinator.run(&dir)?;
    ingesting.store(false, Ordering::Release);
    print_summary(&library, coordinator.opts());

    if !cli.no_shell {
        run_shell(&mut library, io::stdin().lock(), io::stdout())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_flags_override_file_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".medialib.toml"),
            "[settings]\nworkers = 7\nidle_polls = 3\nverbose = true\n",
        )
        .unwrap();
        let cli = Cli::try_parse_from(["medialib", "--workers", "2", "-v", "false"]).unwrap();
        let opts = setup_opts(&cli, dir.path());
        assert_eq!(opts.num_workers, Some(2));
        assert_eq!(opts.idle_polls, 3);
        assert!(!opts.verbose);
        assert_eq!(opts.poll_interval, Opts::default().poll_interval);
    }

    #[test]
    fn prompt_reads_one_trimmed_line() {
        let mut out = Vec::new();
        let dir = prompt_for_dir(&mut "  /music/lib \nrest\n".as_bytes(), &mut out).unwrap();
        assert_eq!(dir, PathBuf::from("/music/lib"));
        assert!(String::from_utf8(out).unwrap().starts_with("Enter the directory"));
        assert!(prompt_for_dir(&mut "\n".as_bytes(), &mut Vec::new()).is_err());
    }
}
