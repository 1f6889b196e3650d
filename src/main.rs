//! Dedup CLI: index directories into SQLite, query the store, print build info.

use anyhow::Result;
use clap::Parser;
use dedup::engine::arg_parser::Cli;
use dedup::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
