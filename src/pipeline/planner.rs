//! Operation planner: turns a [`Difference`] into Copy/Remove operations.
//!
//! Each relation group that needs operations is planned by its own producer. A path that is
//! missing from the lookup it should resolve through is reported on the error channel and
//! skipped; planning of the rest continues.

use crossbeam_channel::{Sender, unbounded};
use std::path::Path;

use crate::error::{CloneError, Side};
use crate::{Difference, Op, PathMeta};

/// Relation groups that produce operations. `common` never does.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanGroup {
    /// Present on both sides and different: copy over the destination entry.
    Changed,
    /// Source only: copy to `dst_root/<rel>`.
    LeftOnly,
    /// Destination only: remove.
    RightOnly,
}

impl PlanGroup {
    pub const ALL: [PlanGroup; 3] = [PlanGroup::Changed, PlanGroup::LeftOnly, PlanGroup::RightOnly];

    /// Emit this group's operations into `work_tx`, blocking while the queue is full.
    /// Returns the number of operations emitted.
    pub fn produce<'a>(
        self,
        diff: &'a Difference,
        dst_root: &Path,
        work_tx: &Sender<Op<'a>>,
        err_tx: &Sender<CloneError>,
    ) -> usize {
        let names = match self {
            PlanGroup::Changed => &diff.changed,
            PlanGroup::LeftOnly => &diff.left_only,
            PlanGroup::RightOnly => &diff.right_only,
        };
        let mut emitted = 0;
        for rel in names {
            let op = match self.resolve(diff, rel, dst_root) {
                Ok(op) => op,
                Err(e) => {
                    log::warn!("{}", e);
                    let _ = err_tx.send(e);
                    continue;
                }
            };
            if work_tx.send(op).is_err() {
                // every worker is gone; nothing left to hand work to
                break;
            }
            emitted += 1;
        }
        emitted
    }

    fn resolve<'a>(
        self,
        diff: &'a Difference,
        rel: &Path,
        dst_root: &Path,
    ) -> Result<Op<'a>, CloneError> {
        match self {
            PlanGroup::Changed => {
                let src = lookup(diff, rel, Side::Source)?;
                let dst = lookup(diff, rel, Side::Destination)?;
                Ok(Op::copy(src, dst.path.clone(), Some(dst)))
            }
            PlanGroup::LeftOnly => {
                let src = lookup(diff, rel, Side::Source)?;
                Ok(Op::copy(src, dst_root.join(rel), None))
            }
            PlanGroup::RightOnly => {
                let dst = lookup(diff, rel, Side::Destination)?;
                Ok(Op::remove(dst))
            }
        }
    }
}

fn lookup<'a>(diff: &'a Difference, rel: &Path, side: Side) -> Result<&'a PathMeta, CloneError> {
    let map = match side {
        Side::Source => &diff.left,
        Side::Destination => &diff.right,
    };
    map.get(rel)
        .ok_or_else(|| CloneError::ClassificationInconsistency {
            path: rel.to_path_buf(),
            side,
        })
}

/// Plan every group sequentially into a list. Used for counting and inspection; the sync
/// pipeline plans concurrently instead.
pub fn plan_all<'a>(diff: &'a Difference, dst_root: &Path) -> (Vec<Op<'a>>, Vec<CloneError>) {
    let (work_tx, work_rx) = unbounded();
    let (err_tx, err_rx) = unbounded();
    for group in PlanGroup::ALL {
        group.produce(diff, dst_root, &work_tx, &err_tx);
    }
    drop(work_tx);
    drop(err_tx);
    (work_rx.into_iter().collect(), err_rx.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntryKind, OpKind};
    use std::path::PathBuf;

    fn meta(path: &str, kind: EntryKind) -> PathMeta {
        PathMeta {
            path: PathBuf::from(path),
            kind,
            size: 0,
            mtime_ns: 0,
            mode: 0o644,
            uid: 0,
            gid: 0,
            link_target: None,
            hash: None,
        }
    }

    fn scenario() -> Difference {
        let mut d = Difference::default();
        for rel in ["a", "b", "same"] {
            d.left
                .insert(rel.into(), meta(&format!("/s/{rel}"), EntryKind::File));
        }
        for rel in ["a", "c", "same"] {
            d.right
                .insert(rel.into(), meta(&format!("/d/{rel}"), EntryKind::File));
        }
        d.changed.push("a".into());
        d.left_only.push("b".into());
        d.right_only.push("c".into());
        d.common.push("same".into());
        d
    }

    #[test]
    fn copies_and_removes_match_relation_sizes() {
        let d = scenario();
        let (ops, errs) = plan_all(&d, Path::new("/d"));
        assert!(errs.is_empty());
        assert_eq!(ops.len(), 3);
        let copies: Vec<_> = ops.iter().filter(|o| o.kind == OpKind::Copy).collect();
        let removes: Vec<_> = ops.iter().filter(|o| o.kind == OpKind::Remove).collect();
        assert_eq!(copies.len(), d.changed.len() + d.left_only.len());
        assert_eq!(removes.len(), d.right_only.len());
        assert!(!ops.iter().any(|o| o.dst.ends_with("same")));
    }

    #[test]
    fn paths_resolve_under_each_root() {
        let d = scenario();
        let (ops, _) = plan_all(&d, Path::new("/d"));
        let a = ops.iter().find(|o| o.src == Path::new("/s/a")).unwrap();
        assert_eq!(a.dst, PathBuf::from("/d/a"));
        assert!(a.dst_meta.is_some());
        let b = ops.iter().find(|o| o.src == Path::new("/s/b")).unwrap();
        assert_eq!(b.dst, PathBuf::from("/d/b"));
        assert!(b.dst_meta.is_none());
        let c = ops.iter().find(|o| o.kind == OpKind::Remove).unwrap();
        assert_eq!(c.dst, PathBuf::from("/d/c"));
        assert!(c.src.as_os_str().is_empty());
    }

    #[test]
    fn missing_lookup_is_reported_and_skipped() {
        let mut d = scenario();
        d.left_only.push("ghost".into());
        d.right_only.push("phantom".into());
        d.changed.push("half".into());
        d.left.insert("half".into(), meta("/s/half", EntryKind::File));
        let (ops, errs) = plan_all(&d, Path::new("/d"));
        assert_eq!(ops.len(), 3);
        assert_eq!(errs.len(), 3);
        assert!(errs.iter().all(|e| matches!(
            e,
            CloneError::ClassificationInconsistency { .. }
        )));
    }
}
