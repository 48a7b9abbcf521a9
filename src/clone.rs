//! Tree clone: bootstrap the destination, snapshot both trees, classify, then run the sync
//! pipeline with the chosen strategy.

use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;

use crate::bootstrap::{DestState, ensure_destination};
use crate::compare::classify;
use crate::engine::progress::Observer;
use crate::error::{CloneError, Result};
use crate::pipeline::orchestrator::run_plan;
use crate::pipeline::scan::scan_tree;
use crate::pipeline::strategy::{ApplyOpts, Strategy};
use crate::{CloneOpts, Difference, Opts, Snapshot};

/// Source/destination pair with its classification, ready to sync.
pub struct TreeCloner {
    pub src: PathBuf,
    pub dst: PathBuf,
    pub opts: Opts,
    pub dest_state: DestState,
    diff: Difference,
}

impl TreeCloner {
    /// Bootstrap the destination (creating it when `create_dst`), walk both trees concurrently
    /// and classify them.
    pub fn new(
        src: &Path,
        dst: &Path,
        opts: Opts,
        create_dst: bool,
        observer: &dyn Observer,
    ) -> Result<Self> {
        observer.bootstrap(dst);
        let dest_state = ensure_destination(src, dst, create_dst)?;

        let (left, right) = thread::scope(|s| {
            let left = s.spawn(|| scan_tree(src, &opts));
            let right = match dest_state {
                DestState::Missing => Ok(Snapshot::new(dst)),
                _ => scan_tree(dst, &opts),
            };
            let left = left.join().map_err(|_| CloneError::WorkerPanicked)?;
            Ok::<_, CloneError>((left?, right?))
        })?;
        debug!(
            "scanned {} source and {} destination entries",
            left.entries.len(),
            right.entries.len()
        );

        let diff = classify(left, right, &opts);
        Ok(TreeCloner {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
            opts,
            dest_state,
            diff,
        })
    }

    pub fn difference(&self) -> &Difference {
        &self.diff
    }

    /// Run the sync pipeline with `strategy`.
    pub fn sync(&self, strategy: &Strategy<'_>, observer: &dyn Observer) -> Result<()> {
        run_plan(
            &self.diff,
            &self.dst,
            strategy,
            self.opts.concurrency,
            observer,
        )
    }
}

fn resolve_opts(opts: &CloneOpts) -> Opts {
    let opts = Opts::from(opts);
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    opts
}

/// Make `dst` match `src`: copy what is new or changed, remove what is gone.
pub fn clone_tree(src: &Path, dst: &Path, opts: &CloneOpts, observer: &dyn Observer) -> Result<()> {
    let opts = resolve_opts(opts);
    let apply = ApplyOpts::from(&opts);
    let tc = TreeCloner::new(src, dst, opts, true, observer)?;
    tc.sync(&Strategy::apply(apply), observer)
}

/// Write the plan that [`clone_tree`] would execute to `out`, one line per operation.
/// Nothing is modified, not even a missing destination root.
pub fn diff_tree(
    out: &mut (dyn Write + Send),
    src: &Path,
    dst: &Path,
    opts: &CloneOpts,
    observer: &dyn Observer,
) -> Result<()> {
    let opts = resolve_opts(opts);
    let tc = TreeCloner::new(src, dst, opts, false, observer)?;
    tc.sync(&Strategy::report(out), observer)
}
