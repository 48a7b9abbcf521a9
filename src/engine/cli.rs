//! CLI command handler: report the plan by default; --apply makes the changes.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::compare::DiffSummary;
use crate::engine::arg_parser::Cli;
use crate::engine::tools::{running_as_root, window_secs_to_ns};
use crate::utils::dirclone_toml::{OutputSettings, load_dirclone_toml};
use crate::utils::{Colors, PackagePaths, setup_logging};
use crate::{ApplyOpts, CloneOpts, Opts, Progress, Strategy, TreeCloner};

/// Output switches after merging file and flags. Verbose wins over progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputOpts {
    pub verbose: bool,
    pub progress: bool,
    pub show_stats: bool,
}

/// Merge defaults, config file and CLI flags (flags win) into lib options.
pub fn setup_opts(cli: &Cli) -> (CloneOpts, OutputOpts) {
    let mut opts = CloneOpts::default();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(PackagePaths::get().config_filename()));
    let file_output = match load_dirclone_toml(&config_path) {
        Some(file) => {
            file.apply_to_opts(&mut opts);
            file.output()
        }
        None => OutputSettings::default(),
    };

    if cli.concurrency.is_some() {
        opts.concurrency = cli.concurrency;
    }
    if let Some(v) = cli.follow_symlinks {
        opts.follow_links = v;
    }
    if let Some(v) = cli.single_file_system {
        opts.single_fs = v;
    }
    if !cli.exclude.is_empty() {
        opts.exclude.extend(cli.exclude.iter().cloned());
    }
    if let Some(v) = cli.check_hash {
        opts.with_hash = v;
    }
    if let Some(secs) = cli.mtime_window {
        opts.mtime_window_ns = window_secs_to_ns(secs);
    }
    if let Some(v) = cli.ignore_missing {
        opts.ignore_missing = v;
    }

    let verbose = cli.verbose.or(file_output.verbose).unwrap_or(false);
    let progress = cli.progress.or(file_output.progress).unwrap_or(false) && !verbose;
    let show_stats = cli.show_stats.or(file_output.show_stats).unwrap_or(false);
    (
        opts,
        OutputOpts {
            verbose,
            progress,
            show_stats,
        },
    )
}

/// Run a dry run (default) or apply the plan when --apply.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let (clone_opts, out) = setup_opts(cli);
    setup_logging(out.verbose);
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        clone_opts
    );
    let opts = Opts::from(&clone_opts);
    let progress = Progress::new(out.progress, out.verbose, out.show_stats);

    if cli.apply {
        if running_as_root() {
            info!("Running as root: ownership will be preserved.");
        }
        run_apply(cli, opts, &progress)
    } else {
        warn!("DRY RUN: NO CHANGES WILL BE MADE. Use --apply to clone.");
        run_report(cli, opts, &progress)
    }
}

fn run_apply(cli: &Cli, opts: Opts, progress: &Progress) -> Result<()> {
    let cancel_requested = Arc::new(AtomicBool::new(false));
    let cancel_requested_handler = Arc::clone(&cancel_requested);
    ctrlc::set_handler(move || {
        cancel_requested_handler.store(true, Ordering::Relaxed);
    })
    .context("set Ctrl+C handler")?;

    let apply = ApplyOpts {
        cancel: Some(Arc::clone(&cancel_requested)),
        ..ApplyOpts::from(&opts)
    };
    let tc = TreeCloner::new(&cli.src, &cli.dst, opts, true, progress)
        .with_context(|| format!("clone {} -> {}", cli.src.display(), cli.dst.display()))?;
    let res = tc.sync(&Strategy::apply(apply), progress);

    if cancel_requested.load(Ordering::Relaxed) {
        return Err(anyhow::anyhow!(
            "Clone cancelled by user; {} was partially updated",
            cli.dst.display()
        ));
    }
    res?;
    Ok(())
}

fn run_report(cli: &Cli, opts: Opts, progress: &Progress) -> Result<()> {
    let tc = TreeCloner::new(&cli.src, &cli.dst, opts, false, progress)
        .with_context(|| format!("diff {} -> {}", cli.src.display(), cli.dst.display()))?;
    tc.sync(&Strategy::report(std::io::stdout()), progress)?;
    log_summary(&DiffSummary::of(tc.difference()));
    Ok(())
}

/// Log per-group counts of a dry run.
fn log_summary(s: &DiffSummary) {
    info!(
        "{} | {} | {} | {} | {} | Unchanged: {}",
        Colors::colorize(Colors::ADDED, &format!("New dirs: {}", s.new_dirs)),
        Colors::colorize(Colors::ADDED, &format!("New files: {}", s.new_files)),
        Colors::colorize(Colors::MODIFIED, &format!("Modified: {}", s.modified)),
        Colors::colorize(Colors::REMOVED, &format!("Delete dirs: {}", s.delete_dirs)),
        Colors::colorize(Colors::REMOVED, &format!("Delete files: {}", s.delete_files)),
        s.unchanged
    );
}
