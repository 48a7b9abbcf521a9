//! Tree comparison: classify a source snapshot against a destination snapshot.

use log::debug;
use rayon::prelude::*;
use std::path::PathBuf;

use crate::engine::{hash_equals, hash_file, mtime_changed};
use crate::utils::Colors;
use crate::{Difference, EntryKind, Opts, PathMeta, Snapshot};

/// True when `dst` already matches `src` by metadata. Directories compare by permissions only:
/// their mtime moves whenever a child is written.
pub fn same_metadata(src: &PathMeta, dst: &PathMeta, mtime_window_ns: i64) -> bool {
    if src.kind != dst.kind {
        return false;
    }
    match src.kind {
        EntryKind::Dir => src.mode == dst.mode,
        EntryKind::Symlink => src.link_target == dst.link_target,
        EntryKind::File | EntryKind::Other => {
            src.size == dst.size
                && src.mode == dst.mode
                && !mtime_changed(src.mtime_ns, dst.mtime_ns, mtime_window_ns)
        }
    }
}

/// Classify `left` (source) against `right` (destination).
///
/// With `opts.with_hash`, file pairs that agree on metadata are also compared by content
/// (blake3, hashed in parallel); the digests are kept on the returned metadata.
pub fn classify(left: Snapshot, right: Snapshot, opts: &Opts) -> Difference {
    let mut left_map = left.entries;
    let mut right_map = right.entries;

    let mut common = Vec::new();
    let mut left_only = Vec::new();
    let mut changed = Vec::new();
    let mut candidates = Vec::new();

    for (rel, l) in &left_map {
        match right_map.get(rel) {
            None => left_only.push(rel.clone()),
            Some(r) if !same_metadata(l, r, opts.mtime_window_ns) => changed.push(rel.clone()),
            Some(r) if opts.with_hash && l.is_file() && r.is_file() => {
                candidates.push(rel.clone())
            }
            Some(_) => common.push(rel.clone()),
        }
    }
    let right_only: Vec<PathBuf> = right_map
        .keys()
        .filter(|rel| !left_map.contains_key(*rel))
        .cloned()
        .collect();

    if !candidates.is_empty() {
        let hashed: Vec<(PathBuf, Option<[u8; 32]>, Option<[u8; 32]>)> = candidates
            .into_par_iter()
            .map(|rel| {
                let l = &left_map[&rel];
                let r = &right_map[&rel];
                let lh = hash_or_log(l);
                let rh = hash_or_log(r);
                (rel, lh, rh)
            })
            .collect();
        for (rel, lh, rh) in hashed {
            if lh.is_some() && hash_equals(&lh, &rh) {
                common.push(rel.clone());
            } else {
                changed.push(rel.clone());
            }
            if let Some(l) = left_map.get_mut(&rel) {
                l.hash = lh;
            }
            if let Some(r) = right_map.get_mut(&rel) {
                r.hash = rh;
            }
        }
    }

    common.sort();
    left_only.sort();
    changed.sort();
    let mut right_only = right_only;
    right_only.sort();

    let diff = Difference {
        common,
        left_only,
        right_only,
        changed,
        left: left_map,
        right: right_map,
    };
    print_diff(&diff);
    diff
}

fn hash_or_log(meta: &PathMeta) -> Option<[u8; 32]> {
    hash_file(&meta.path, meta.size)
        .map_err(|e| debug!("{}: can't hash: {}", meta.path.display(), e))
        .ok()
}

/// Counts per group, split into dirs and files, as printed after a dry run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub new_dirs: usize,
    pub new_files: usize,
    pub modified: usize,
    pub delete_dirs: usize,
    pub delete_files: usize,
    pub unchanged: usize,
}

impl DiffSummary {
    pub fn of(diff: &Difference) -> Self {
        let is_dir = |map: &crate::PathMap, rel: &PathBuf| map.get(rel).is_some_and(|m| m.is_dir());
        let new_dirs = diff
            .left_only
            .iter()
            .filter(|rel| is_dir(&diff.left, rel))
            .count();
        let delete_dirs = diff
            .right_only
            .iter()
            .filter(|rel| is_dir(&diff.right, rel))
            .count();
        DiffSummary {
            new_dirs,
            new_files: diff.left_only.len() - new_dirs,
            modified: diff.changed.len(),
            delete_dirs,
            delete_files: diff.right_only.len() - delete_dirs,
            unchanged: diff.common.len(),
        }
    }
}

/// Log diff summary
pub fn print_diff(diff: &Difference) {
    let s = DiffSummary::of(diff);
    if diff.is_empty() {
        debug!("No changes detected ({} unchanged).", s.unchanged);
        return;
    }
    debug!(
        "{} | {} | {} | {}",
        Colors::colorize(
            Colors::ADDED,
            &format!("New: {} dirs, {} files", s.new_dirs, s.new_files)
        ),
        Colors::colorize(Colors::MODIFIED, &format!("Modified: {}", s.modified)),
        Colors::colorize(
            Colors::REMOVED,
            &format!("Delete: {} dirs, {} files", s.delete_dirs, s.delete_files)
        ),
        format!("Unchanged: {}", s.unchanged)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn meta(path: &str, kind: EntryKind, size: u64, mtime_ns: i64) -> PathMeta {
        PathMeta {
            path: PathBuf::from(path),
            kind,
            size,
            mtime_ns,
            mode: 0o644,
            uid: 0,
            gid: 0,
            link_target: None,
            hash: None,
        }
    }

    fn snap(root: &str, items: &[(&str, EntryKind, u64, i64)]) -> Snapshot {
        let mut s = Snapshot::new(Path::new(root));
        for (rel, kind, size, mtime) in items {
            s.entries.insert(
                PathBuf::from(rel),
                meta(&format!("{root}/{rel}"), *kind, *size, *mtime),
            );
        }
        s
    }

    #[test]
    fn three_way_partition() {
        let left = snap(
            "/s",
            &[
                ("a", EntryKind::File, 1, 10),
                ("b", EntryKind::File, 1, 10),
                ("same", EntryKind::File, 5, 10),
                ("d", EntryKind::Dir, 0, 10),
            ],
        );
        let right = snap(
            "/d",
            &[
                ("a", EntryKind::File, 2, 10),
                ("c", EntryKind::File, 1, 10),
                ("same", EntryKind::File, 5, 10),
                ("d", EntryKind::Dir, 0, 99),
            ],
        );
        let diff = classify(left, right, &Opts::default());
        assert_eq!(diff.changed, vec![PathBuf::from("a")]);
        assert_eq!(diff.left_only, vec![PathBuf::from("b")]);
        assert_eq!(diff.right_only, vec![PathBuf::from("c")]);
        assert_eq!(diff.common, vec![PathBuf::from("d"), PathBuf::from("same")]);
    }

    #[test]
    fn kind_change_is_changed() {
        let a = meta("/s/x", EntryKind::File, 0, 0);
        let b = meta("/d/x", EntryKind::Dir, 0, 0);
        assert!(!same_metadata(&a, &b, 0));
    }

    #[test]
    fn mtime_window_applies_to_files() {
        let a = meta("/s/x", EntryKind::File, 3, 100);
        let b = meta("/d/x", EntryKind::File, 3, 150);
        assert!(!same_metadata(&a, &b, 0));
        assert!(same_metadata(&a, &b, 50));
    }

    #[test]
    fn summary_splits_dirs_and_files() {
        let left = snap(
            "/s",
            &[("n", EntryKind::Dir, 0, 0), ("n/f", EntryKind::File, 1, 0)],
        );
        let right = snap("/d", &[("old", EntryKind::Dir, 0, 0)]);
        let s = DiffSummary::of(&classify(left, right, &Opts::default()));
        assert_eq!(s.new_dirs, 1);
        assert_eq!(s.new_files, 1);
        assert_eq!(s.delete_dirs, 1);
        assert_eq!(s.delete_files, 0);
    }
}
