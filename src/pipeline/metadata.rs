use crossbeam_channel::{Receiver, Sender};
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::engine::tools::path_relative_to;
use crate::{EntryFilter, EntryKind, PathMeta};

/// `lstat` (or `stat` when following links).
pub fn stat(path: &Path, follow_links: bool) -> io::Result<Metadata> {
    if follow_links {
        std::fs::metadata(path)
    } else {
        std::fs::symlink_metadata(path)
    }
}

pub fn entry_kind(meta: &Metadata) -> EntryKind {
    let ft = meta.file_type();
    if ft.is_dir() {
        EntryKind::Dir
    } else if ft.is_file() {
        EntryKind::File
    } else if ft.is_symlink() {
        EntryKind::Symlink
    } else {
        EntryKind::Other
    }
}

#[cfg(unix)]
fn mode_uid_gid(meta: &Metadata) -> (u32, u32, u32) {
    use std::os::unix::fs::MetadataExt;
    (meta.mode() & 0o7777, meta.uid(), meta.gid())
}

#[cfg(not(unix))]
fn mode_uid_gid(meta: &Metadata) -> (u32, u32, u32) {
    let mode = if meta.permissions().readonly() { 0o444 } else { 0o644 };
    (mode, 0, 0)
}

/// Stat a single path into a [`PathMeta`]. Hash is left empty.
pub fn path_to_meta(abs_path: &Path, follow_links: bool) -> io::Result<PathMeta> {
    let meta = stat(abs_path, follow_links)?;
    let kind = entry_kind(&meta);
    let mtime_ns = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0);
    let (mode, uid, gid) = mode_uid_gid(&meta);
    let link_target = match kind {
        EntryKind::Symlink => Some(std::fs::read_link(abs_path)?),
        _ => None,
    };
    Ok(PathMeta {
        path: abs_path.to_path_buf(),
        kind,
        size: if kind == EntryKind::Dir { 0 } else { meta.len() },
        mtime_ns,
        mode,
        uid,
        gid,
        link_target,
        hash: None,
    })
}

/// Single metadata worker: read paths from path_rx, stat them, filter, send (relative, meta) on entry_tx.
/// Entries that vanish between walk and stat are dropped.
fn metadata_worker_loop(
    path_rx: Receiver<PathBuf>,
    entry_tx: Sender<(PathBuf, PathMeta)>,
    root: PathBuf,
    follow_links: bool,
    filter: Option<EntryFilter>,
) {
    while let Ok(abs_path) = path_rx.recv() {
        let meta = match path_to_meta(&abs_path, follow_links) {
            Ok(m) => m,
            Err(e) => {
                log::debug!("{}: {}", abs_path.display(), e);
                continue;
            }
        };
        if let Some(f) = filter.as_ref()
            && !f(&meta)
        {
            continue;
        }
        let rel = path_relative_to(&abs_path, &root).unwrap_or_else(|| abs_path.clone());
        if entry_tx.send((rel, meta)).is_err() {
            break;
        }
    }
}

/// Spawn metadata workers. Caller must drop its `entry_tx` after this so the entry channel
/// closes once the workers exit.
pub fn spawn_metadata_workers(
    path_rx: Receiver<PathBuf>,
    entry_tx: &Sender<(PathBuf, PathMeta)>,
    root: &Path,
    num_threads: usize,
    follow_links: bool,
    filter: &Option<EntryFilter>,
) -> Vec<JoinHandle<()>> {
    let root = root.to_path_buf();
    (0..num_threads.max(1))
        .map(|_| {
            let path_rx = path_rx.clone();
            let entry_tx = entry_tx.clone();
            let root = root.clone();
            let filter = filter.clone();
            thread::spawn(move || {
                metadata_worker_loop(path_rx, entry_tx, root, follow_links, filter)
            })
        })
        .collect()
}
