use log::{debug, warn};
use std::path::Path;

use crate::error::{CloneError, Result};
use crate::pipeline::{create_scan_channels, spawn_metadata_workers, spawn_walk_thread};
use crate::{Opts, Snapshot};

/// Walk `root` into an in-memory [`Snapshot`] keyed by relative path.
/// Walk → path channel → metadata workers → entry channel → map.
///
/// The root must be a directory. Unreadable entries below it are logged and left out.
pub fn scan_tree(root: &Path, opts: &Opts) -> Result<Snapshot> {
    let root_meta = std::fs::metadata(root).map_err(|source| CloneError::Scan {
        path: root.to_path_buf(),
        source,
    })?;
    if !root_meta.is_dir() {
        return Err(CloneError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let channels = create_scan_channels(root, opts);
    let walk_handle = spawn_walk_thread(channels.path_tx, channels.ctx);
    let worker_handles = spawn_metadata_workers(
        channels.path_rx,
        &channels.entry_tx,
        root,
        opts.concurrency,
        opts.follow_links,
        &opts.filter,
    );
    // Dropping the last sender closes the channel once workers exit.
    drop(channels.entry_tx);

    let mut snapshot = Snapshot::new(root);
    while let Ok((rel, meta)) = channels.entry_rx.recv() {
        snapshot.entries.insert(rel, meta);
    }

    let path_count = walk_handle
        .join()
        .map_err(|_| CloneError::WorkerPanicked)?;
    for h in worker_handles {
        h.join().map_err(|_| CloneError::WorkerPanicked)?;
    }
    debug!(
        "{}: walked {} paths, kept {} entries",
        root.display(),
        path_count,
        snapshot.entries.len()
    );

    let skipped = channels.skipped_paths.lock().unwrap().len();
    if skipped > 0 {
        warn!(
            "{}: skipped {} paths due to permission errors or access issues",
            root.display(),
            skipped
        );
    }
    Ok(snapshot)
}
