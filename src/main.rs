//! dirclone CLI: print the plan to make DEST match SRC; use --apply to make the changes.

use anyhow::Result;
use clap::Parser;
use dirclone::engine::arg_parser::Cli;
use dirclone::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
