//! Medialib CLI: ingest a directory, then browse the results from a command shell.

use anyhow::Result;
use clap::Parser;
use medialib::engine::arg_parser::Cli;
use medialib::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
