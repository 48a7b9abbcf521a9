//! Run observers: the notification hooks the sync pipeline calls, and the CLI's progress bar /
//! verbose printer built on them.

use humansize::{DECIMAL, format_size};
use kdam::{Animation, Bar, BarExt};
use log::info;
use std::path::Path;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::engine::tools::shell_quote;
use crate::error::CloneError;
use crate::utils::config::PROGRESS_UPDATE_BATCH_SIZE;
use crate::{Difference, OpKind};

/// Hooks called by a run. Called from worker threads: keep them fast, a slow observer
/// throttles the whole pipeline.
pub trait Observer: Sync {
    /// Destination root is about to be checked / created.
    fn bootstrap(&self, _dst: &Path) {}
    /// Classification is known; called once before planning starts.
    fn difference(&self, _diff: &Difference) {}
    /// A worker picked up an operation.
    fn dispatched(&self, _kind: OpKind, _src: &Path, _dst: &Path) {}
    /// An operation finished without error.
    fn succeeded(&self, _kind: OpKind, _dst: &Path) {}
    /// An operation failed; the error also goes into the run's combined error.
    fn failed(&self, _kind: OpKind, _err: &CloneError) {}
    /// All workers finished.
    fn complete(&self) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Configuration for creating a progress bar
pub struct ProgressBarConfig {
    pub total: usize,
    pub desc: &'static str,
    pub animation: Animation,
}

impl ProgressBarConfig {
    pub fn new(total: usize, desc: &'static str, animation: Animation) -> Self {
        Self {
            total,
            desc,
            animation,
        }
    }
}

/// Create a progress bar with the given configuration
pub fn create_progress_bar(config: ProgressBarConfig) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = config.total,
        desc = config.desc,
        animation = config.animation,
        unit = " ops"
    )))
}

/// Update the bar's total. Refreshes the display.
pub fn set_bar_total(pb: &ProgressBar, total: usize) {
    if let Ok(mut bar) = pb.lock() {
        bar.total = total;
        let _ = bar.refresh();
    }
}

/// Update progress bar if available.
/// Uses try_lock so workers never wait on the bar; a skipped update is caught up at the end.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Counters kept by [`Progress`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProgressCounts {
    pub copied: usize,
    pub removed: usize,
    pub failed: usize,
    pub total_copy: usize,
    pub total_remove: usize,
    pub unchanged: usize,
}

/// Progress bar, verbose printer and stats for a run.
pub struct Progress {
    copied: AtomicUsize,
    removed: AtomicUsize,
    failed: AtomicUsize,
    /// Operations finished, successful or not.
    processed: AtomicUsize,
    total_copy: AtomicUsize,
    total_remove: AtomicUsize,
    unchanged: AtomicUsize,
    bytes_copy: AtomicU64,
    bytes_remove: AtomicU64,
    bar: Option<ProgressBar>,
    verbose: bool,
    stats: bool,
    start: Instant,
}

impl Progress {
    /// `show_bar` only draws a bar on a terminal; elsewhere it falls back to verbose lines.
    pub fn new(show_bar: bool, verbose: bool, stats: bool) -> Self {
        use std::io::IsTerminal;
        let tty = std::io::stderr().is_terminal();
        let bar = (show_bar && tty)
            .then(|| create_progress_bar(ProgressBarConfig::new(0, "clone", Animation::Classic)));
        Progress {
            copied: AtomicUsize::new(0),
            removed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            processed: AtomicUsize::new(0),
            total_copy: AtomicUsize::new(0),
            total_remove: AtomicUsize::new(0),
            unchanged: AtomicUsize::new(0),
            bytes_copy: AtomicU64::new(0),
            bytes_remove: AtomicU64::new(0),
            verbose: verbose || (show_bar && !tty),
            bar,
            stats,
            start: Instant::now(),
        }
    }

    pub fn counts(&self) -> ProgressCounts {
        ProgressCounts {
            copied: self.copied.load(Ordering::Relaxed),
            removed: self.removed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            total_copy: self.total_copy.load(Ordering::Relaxed),
            total_remove: self.total_remove.load(Ordering::Relaxed),
            unchanged: self.unchanged.load(Ordering::Relaxed),
        }
    }

    /// `elapsed: +copied, -removed, !failed, =unchanged; +bytes, -bytes`
    pub fn stats_line(&self) -> String {
        let c = self.counts();
        let elapsed = Duration::from_millis(self.start.elapsed().as_millis() as u64);
        format!(
            "{:?}: +{}, -{}, !{}, ={}; +{}, -{}",
            elapsed,
            c.copied,
            c.removed,
            c.failed,
            c.unchanged,
            format_size(self.bytes_copy.load(Ordering::Relaxed), DECIMAL),
            format_size(self.bytes_remove.load(Ordering::Relaxed), DECIMAL),
        )
    }

    fn tick(&self) {
        let done = self.processed.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(bar) = self.bar.as_ref()
            && done.is_multiple_of(PROGRESS_UPDATE_BATCH_SIZE)
        {
            update_progress_bar(bar, PROGRESS_UPDATE_BATCH_SIZE);
        }
    }
}

impl Observer for Progress {
    fn bootstrap(&self, dst: &Path) {
        if self.verbose {
            info!("# mkdir -p {}", shell_quote(dst));
        }
    }

    fn difference(&self, diff: &Difference) {
        let size_of = |map: &crate::PathMap, rel: &std::path::PathBuf| {
            map.get(rel)
                .filter(|m| m.is_file())
                .map_or(0, |m| m.size)
        };
        let copy_bytes: u64 = diff
            .left_only
            .iter()
            .chain(diff.changed.iter())
            .map(|rel| size_of(&diff.left, rel))
            .sum();
        let remove_bytes: u64 = diff
            .right_only
            .iter()
            .map(|rel| size_of(&diff.right, rel))
            .sum();
        self.total_copy
            .store(diff.left_only.len() + diff.changed.len(), Ordering::Relaxed);
        self.total_remove
            .store(diff.right_only.len(), Ordering::Relaxed);
        self.unchanged.store(diff.common.len(), Ordering::Relaxed);
        self.bytes_copy.store(copy_bytes, Ordering::Relaxed);
        self.bytes_remove.store(remove_bytes, Ordering::Relaxed);
        if let Some(bar) = self.bar.as_ref() {
            set_bar_total(bar, diff.planned_ops());
        }
    }

    fn dispatched(&self, kind: OpKind, src: &Path, dst: &Path) {
        if self.verbose {
            match kind {
                OpKind::Copy => info!("# cp -p {} {}", shell_quote(src), shell_quote(dst)),
                OpKind::Remove => info!("# rm {}", shell_quote(dst)),
            }
        }
    }

    fn succeeded(&self, kind: OpKind, _dst: &Path) {
        match kind {
            OpKind::Copy => self.copied.fetch_add(1, Ordering::Relaxed),
            OpKind::Remove => self.removed.fetch_add(1, Ordering::Relaxed),
        };
        self.tick();
    }

    fn failed(&self, _kind: OpKind, _err: &CloneError) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.tick();
    }

    fn complete(&self) {
        if let Some(bar) = self.bar.as_ref()
            && let Ok(mut bar) = bar.lock()
        {
            let _ = bar.update_to(self.processed.load(Ordering::Relaxed));
            eprintln!();
        }
        if self.stats {
            info!("{}", self.stats_line());
        }
    }
}
