//! Sync pipeline: planners → bounded work queue → worker pool, with a dedicated error collector.
//!
//! Shutdown order is fixed:
//! 1. the work queue closes when the last planner drops its sender;
//! 2. workers drain the queue and exit;
//! 3. the error channel closes once every planner and worker has been joined;
//! 4. the collector drains what is left and returns the list.

use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::path::Path;
use std::thread;

use crate::engine::progress::Observer;
use crate::error::{CloneError, Result};
use crate::pipeline::context::{RunChannels, create_run_channels};
use crate::pipeline::error_handler::combine_errors;
use crate::pipeline::planner::PlanGroup;
use crate::pipeline::strategy::Strategy;
use crate::{Difference, Op};

/// One sync run over a borrowed [`Difference`]. Owns nothing beyond its settings; the queue and
/// error channel live only inside [`SyncRun::run`].
pub struct SyncRun<'a, 'w> {
    pub diff: &'a Difference,
    pub dst_root: &'a Path,
    pub strategy: &'a Strategy<'w>,
    pub concurrency: usize,
    pub observer: &'a dyn Observer,
}

/// What a finished run did, before errors are combined.
#[derive(Debug, Default)]
pub struct RunOutcome {
    /// Operations pushed onto the queue.
    pub planned: usize,
    /// Operations a worker ran (successfully or not).
    pub executed: usize,
    pub errors: Vec<CloneError>,
}

impl<'a, 'w> SyncRun<'a, 'w> {
    /// Plan and execute every operation, then report success or one combined error.
    pub fn run(&self) -> Result<()> {
        let outcome = self.execute();
        combine_errors(outcome.errors)
    }

    /// Plan and execute every operation and hand back the raw outcome.
    pub fn execute(&self) -> RunOutcome {
        let concurrency = self.concurrency.max(1);
        self.observer.difference(self.diff);
        debug!(
            "sync: {} changed, {} new, {} to remove, {} workers",
            self.diff.changed.len(),
            self.diff.left_only.len(),
            self.diff.right_only.len(),
            concurrency
        );

        let RunChannels {
            work_tx,
            work_rx,
            err_tx,
            err_rx,
        } = create_run_channels(concurrency);

        let outcome = thread::scope(|s| {
            // harvest errors
            let collector = s.spawn(move || err_rx.iter().collect::<Vec<CloneError>>());

            let workers: Vec<_> = (0..concurrency)
                .map(|_| {
                    let work_rx = work_rx.clone();
                    let err_tx = err_tx.clone();
                    s.spawn(move || self.worker_loop(work_rx, err_tx))
                })
                .collect();
            drop(work_rx);

            let producers: Vec<_> = PlanGroup::ALL
                .into_iter()
                .map(|group| {
                    let work_tx = work_tx.clone();
                    let err_tx = err_tx.clone();
                    s.spawn(move || {
                        let n = group.produce(self.diff, self.dst_root, &work_tx, &err_tx);
                        debug!("planner {:?}: {} operations", group, n);
                        n
                    })
                })
                .collect();
            // Only planners hold queue senders now; the queue closes when the last one finishes.
            drop(work_tx);

            let mut planned = 0;
            for p in producers {
                match p.join() {
                    Ok(n) => planned += n,
                    Err(_) => {
                        let _ = err_tx.send(CloneError::WorkerPanicked);
                    }
                }
            }
            let mut executed = 0;
            for w in workers {
                match w.join() {
                    Ok(n) => executed += n,
                    Err(_) => {
                        let _ = err_tx.send(CloneError::WorkerPanicked);
                    }
                }
            }

            drop(err_tx);
            let errors = collector.join().unwrap_or_default();
            RunOutcome {
                planned,
                executed,
                errors,
            }
        });

        self.strategy.flush();
        self.observer.complete();
        debug!(
            "sync: executed {} of {} planned operations, {} errors",
            outcome.executed,
            outcome.planned,
            outcome.errors.len()
        );
        outcome
    }

    /// Pull operations until the queue is closed and empty. A failed operation is reported and
    /// the loop moves on. Returns the number of operations run.
    fn worker_loop(&self, work_rx: Receiver<Op<'a>>, err_tx: Sender<CloneError>) -> usize {
        let mut done = 0;
        while let Ok(op) = work_rx.recv() {
            self.observer.dispatched(op.kind, &op.src, &op.dst);
            match self.strategy.execute(&op) {
                Ok(()) => self.observer.succeeded(op.kind, &op.dst),
                Err(e) => {
                    self.observer.failed(op.kind, &e);
                    let _ = err_tx.send(e);
                }
            }
            done += 1;
        }
        done
    }
}

/// Execute a plan over `diff` into `dst_root` with `concurrency` workers.
///
/// A path listed in a relation but missing from its lookup is recorded as
/// [`CloneError::ClassificationInconsistency`] and skipped; every other operation is still
/// attempted and the run then fails with the combined errors.
pub fn run_plan(
    diff: &Difference,
    dst_root: &Path,
    strategy: &Strategy<'_>,
    concurrency: usize,
    observer: &dyn Observer,
) -> Result<()> {
    SyncRun {
        diff,
        dst_root,
        strategy,
        concurrency,
        observer,
    }
    .run()
}
