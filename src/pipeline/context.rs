//! Pipeline contexts and channels: shared data for the scan walk thread, and the per-run state
//! of the sync pipeline.

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::CloneError;
use crate::utils::config::{SCAN_CHANNEL_CAP, WORK_QUEUE_PER_WORKER};
use crate::{Op, Opts, PathMeta};

/// Shared context for the walk thread of a scan: root, walk flags, excludes and skip state.
pub struct ScanContext {
    pub root: PathBuf,
    pub exclude: Vec<String>,
    pub follow_links: bool,
    pub single_fs: bool,
    pub skipped_paths: Arc<Mutex<Vec<(PathBuf, String)>>>,
}

/// Channels for one scan. Walk thread gets `path_tx` and `ctx`; metadata workers get `path_rx`
/// and `entry_tx`; the caller drains `entry_rx`.
pub struct ScanChannels {
    pub path_tx: Sender<PathBuf>,
    pub path_rx: Receiver<PathBuf>,
    pub entry_tx: Sender<(PathBuf, PathMeta)>,
    pub entry_rx: Receiver<(PathBuf, PathMeta)>,
    pub skipped_paths: Arc<Mutex<Vec<(PathBuf, String)>>>,
    pub ctx: ScanContext,
}

pub fn create_scan_channels(root: &Path, opts: &Opts) -> ScanChannels {
    let (path_tx, path_rx) = bounded::<PathBuf>(SCAN_CHANNEL_CAP);
    let (entry_tx, entry_rx) = bounded::<(PathBuf, PathMeta)>(SCAN_CHANNEL_CAP);
    let skipped_paths: Arc<Mutex<Vec<(PathBuf, String)>>> = Arc::new(Mutex::new(Vec::new()));

    let ctx = ScanContext {
        root: root.to_path_buf(),
        exclude: opts.exclude.clone(),
        follow_links: opts.follow_links,
        single_fs: opts.single_fs,
        skipped_paths: Arc::clone(&skipped_paths),
    };

    ScanChannels {
        path_tx,
        path_rx,
        entry_tx,
        entry_rx,
        skipped_paths,
        ctx,
    }
}

/// Channels for one sync run: the bounded work queue and the error path.
///
/// The work queue holds at most `concurrency * WORK_QUEUE_PER_WORKER` operations, so planners
/// block when workers fall behind. The error channel is unbounded so neither planners nor
/// workers ever block on reporting a failure.
pub struct RunChannels<'a> {
    pub work_tx: Sender<Op<'a>>,
    pub work_rx: Receiver<Op<'a>>,
    pub err_tx: Sender<CloneError>,
    pub err_rx: Receiver<CloneError>,
}

pub fn create_run_channels<'a>(concurrency: usize) -> RunChannels<'a> {
    let (work_tx, work_rx) = bounded::<Op<'a>>(concurrency.max(1) * WORK_QUEUE_PER_WORKER);
    let (err_tx, err_rx) = unbounded::<CloneError>();
    RunChannels {
        work_tx,
        work_rx,
        err_tx,
        err_rx,
    }
}
