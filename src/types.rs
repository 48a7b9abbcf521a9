//! Public and internal types for the dirclone API and pipelines.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::utils::config::PackagePaths;
use crate::utils::fd_limit::determine_threads_given_fd_limit;

/// Kind of a filesystem entry as seen by the walk (symlinks are not followed unless asked).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    /// Fifo, socket, device node.
    Other,
}

/// Metadata for a single path on one side of the comparison.
#[derive(Clone, Debug)]
pub struct PathMeta {
    /// Absolute path of the entry (root joined with the relative name).
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Modification time in nanoseconds since epoch.
    pub mtime_ns: i64,
    /// Permission bits (`st_mode & 0o7777`); 0 where unavailable.
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    /// Link target when `kind` is [`EntryKind::Symlink`].
    pub link_target: Option<PathBuf>,
    /// Blake3 hash (32 bytes), filled in only when content comparison is enabled.
    pub hash: Option<[u8; 32]>,
}

impl PathMeta {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Map of relative path → metadata for one walked tree.
pub type PathMap = HashMap<PathBuf, PathMeta>;

/// In-memory snapshot of one directory tree.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub root: PathBuf,
    pub entries: PathMap,
}

impl Snapshot {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            entries: PathMap::new(),
        }
    }
}

/// Three-way classification of a source (left) tree against a destination (right) tree.
///
/// The four relation lists partition the union of both trees' relative paths. `left` and `right`
/// are the per-side lookups from relative path to metadata; the planner resolves every listed path
/// through them.
#[derive(Clone, Debug, Default)]
pub struct Difference {
    /// Present on both sides and identical.
    pub common: Vec<PathBuf>,
    /// Present only in the source.
    pub left_only: Vec<PathBuf>,
    /// Present only in the destination.
    pub right_only: Vec<PathBuf>,
    /// Present on both sides but different.
    pub changed: Vec<PathBuf>,
    pub left: PathMap,
    pub right: PathMap,
}

impl Difference {
    /// Number of operations a plan over this difference will contain.
    pub fn planned_ops(&self) -> usize {
        self.left_only.len() + self.changed.len() + self.right_only.len()
    }

    /// True when the destination already matches the source.
    pub fn is_empty(&self) -> bool {
        self.planned_ops() == 0
    }
}

/// Operation kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Copy `src` to `dst`.
    Copy,
    /// Remove `dst`.
    Remove,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Copy => f.write_str("copy"),
            OpKind::Remove => f.write_str("remove"),
        }
    }
}

/// One planned mutation. Borrows metadata from the [`Difference`] it was planned from.
///
/// For [`OpKind::Copy`] both `src` and `dst` are set. For [`OpKind::Remove`] only `dst` and
/// `dst_meta` are meaningful; `src` is empty.
#[derive(Clone, Debug)]
pub struct Op<'a> {
    pub kind: OpKind,
    pub src: PathBuf,
    pub dst: PathBuf,
    pub src_meta: Option<&'a PathMeta>,
    pub dst_meta: Option<&'a PathMeta>,
}

impl<'a> Op<'a> {
    pub fn copy(src: &'a PathMeta, dst: PathBuf, dst_meta: Option<&'a PathMeta>) -> Self {
        Op {
            kind: OpKind::Copy,
            src: src.path.clone(),
            dst,
            src_meta: Some(src),
            dst_meta,
        }
    }

    pub fn remove(target: &'a PathMeta) -> Self {
        Op {
            kind: OpKind::Remove,
            src: PathBuf::new(),
            dst: target.path.clone(),
            src_meta: None,
            dst_meta: Some(target),
        }
    }
}

/// Inclusion predicate over walked entries. Returning `false` drops the entry from the snapshot.
pub type EntryFilter = Arc<dyn Fn(&PathMeta) -> bool + Send + Sync>;

/// Lib options for [`clone_tree`](crate::clone_tree) and [`diff_tree`](crate::diff_tree).
#[derive(Clone, Default)]
pub struct CloneOpts {
    /// Worker count. `None` or `0` uses the host core count.
    pub concurrency: Option<usize>,
    /// Don't cross filesystem boundaries while walking.
    pub single_fs: bool,
    /// Follow symbolic links.
    pub follow_links: bool,
    /// Exclude patterns (glob syntax, e.g. `node_modules`, `*.log`). Added to the defaults.
    pub exclude: Vec<String>,
    /// Optional inclusion predicate over per-entry metadata.
    pub filter: Option<EntryFilter>,
    /// Compare file contents (blake3) in addition to size, mode and mtime.
    pub with_hash: bool,
    /// Mtime tolerance window in nanoseconds. Negative values count as 0.
    pub mtime_window_ns: i64,
    /// Treat a source that vanished after the scan as copied.
    pub ignore_missing: bool,
}

impl fmt::Debug for CloneOpts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloneOpts")
            .field("concurrency", &self.concurrency)
            .field("single_fs", &self.single_fs)
            .field("follow_links", &self.follow_links)
            .field("exclude", &self.exclude)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .field("with_hash", &self.with_hash)
            .field("mtime_window_ns", &self.mtime_window_ns)
            .field("ignore_missing", &self.ignore_missing)
            .finish()
    }
}

/// Resolved, immutable run configuration. Built once from [`CloneOpts`] before any walking starts.
#[derive(Clone)]
pub struct Opts {
    /// Worker count, always ≥ 1.
    pub concurrency: usize,
    pub single_fs: bool,
    pub follow_links: bool,
    /// Default excludes followed by caller excludes.
    pub exclude: Vec<String>,
    pub filter: Option<EntryFilter>,
    pub with_hash: bool,
    pub mtime_window_ns: i64,
    pub ignore_missing: bool,
}

impl From<&CloneOpts> for Opts {
    fn from(o: &CloneOpts) -> Self {
        let wanted = match o.concurrency {
            None | Some(0) => rayon::current_num_threads(),
            Some(n) => n,
        };
        let mut exclude = PackagePaths::get().default_exclude_patterns();
        exclude.extend(o.exclude.iter().cloned());
        Opts {
            concurrency: determine_threads_given_fd_limit(wanted).max(1),
            single_fs: o.single_fs,
            follow_links: o.follow_links,
            exclude,
            filter: o.filter.clone(),
            with_hash: o.with_hash,
            mtime_window_ns: o.mtime_window_ns.max(0),
            ignore_missing: o.ignore_missing,
        }
    }
}

impl fmt::Debug for Opts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opts")
            .field("concurrency", &self.concurrency)
            .field("single_fs", &self.single_fs)
            .field("follow_links", &self.follow_links)
            .field("exclude", &self.exclude)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .field("with_hash", &self.with_hash)
            .field("mtime_window_ns", &self.mtime_window_ns)
            .field("ignore_missing", &self.ignore_missing)
            .finish()
    }
}

impl Default for Opts {
    fn default() -> Self {
        Opts::from(&CloneOpts::default())
    }
}
