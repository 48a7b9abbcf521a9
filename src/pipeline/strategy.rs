//! Execution strategies: apply an operation to the filesystem, or report it as a shell-style line.

use log::{debug, warn};
use std::io::{ErrorKind, Write};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::fsops::{clone_entry, remove_entry};
use crate::engine::tools::shell_quote;
use crate::error::CloneError;
use crate::{Op, OpKind, Opts};

/// Settings for [`Strategy::Apply`].
#[derive(Clone, Debug, Default)]
pub struct ApplyOpts {
    /// Copy what a symlink points to instead of the link.
    pub follow_links: bool,
    /// A source that vanished since the scan counts as copied.
    pub ignore_missing: bool,
    /// When set to true, every remaining operation fails with [`CloneError::Cancelled`].
    pub cancel: Option<Arc<AtomicBool>>,
}

impl From<&Opts> for ApplyOpts {
    fn from(o: &Opts) -> Self {
        ApplyOpts {
            follow_links: o.follow_links,
            ignore_missing: o.ignore_missing,
            cancel: None,
        }
    }
}

/// How each planned operation is carried out. Chosen once per run.
pub enum Strategy<'w> {
    /// Mutate the destination.
    Apply(ApplyOpts),
    /// Write one line per operation to the sink; touch nothing.
    Report(Mutex<Box<dyn Write + Send + 'w>>),
}

impl<'w> Strategy<'w> {
    pub fn apply(opts: ApplyOpts) -> Self {
        Strategy::Apply(opts)
    }

    pub fn report<W: Write + Send + 'w>(out: W) -> Self {
        Strategy::Report(Mutex::new(Box::new(out)))
    }

    pub fn execute(&self, op: &Op<'_>) -> Result<(), CloneError> {
        match self {
            Strategy::Apply(opts) => apply(opts, op),
            Strategy::Report(out) => {
                let line = report_line(op);
                let mut out = out.lock().unwrap();
                if let Err(e) = writeln!(out, "{}", line) {
                    warn!("can't write report line: {}", e);
                }
                Ok(())
            }
        }
    }

    /// Flush the report sink. No-op for apply.
    pub fn flush(&self) {
        if let Strategy::Report(out) = self
            && let Err(e) = out.lock().unwrap().flush()
        {
            warn!("can't flush report: {}", e);
        }
    }
}

fn apply(opts: &ApplyOpts, op: &Op<'_>) -> Result<(), CloneError> {
    if let Some(cancel) = opts.cancel.as_ref()
        && cancel.load(Ordering::Relaxed)
    {
        return Err(CloneError::Cancelled {
            path: op.dst.clone(),
        });
    }
    match op.kind {
        OpKind::Copy => match clone_entry(&op.dst, &op.src, opts.follow_links) {
            Ok(()) => Ok(()),
            Err(e)
                if opts.ignore_missing
                    && e.kind() == ErrorKind::NotFound
                    && std::fs::symlink_metadata(&op.src).is_err() =>
            {
                debug!("{}: vanished, ignored", op.src.display());
                Ok(())
            }
            Err(e) => Err(CloneError::op_failed(OpKind::Copy, op.src.clone(), e)),
        },
        OpKind::Remove => {
            let recursive = match op.dst_meta {
                Some(m) => m.is_dir(),
                None => std::fs::symlink_metadata(&op.dst).is_ok_and(|m| m.is_dir()),
            };
            remove_entry(&op.dst, recursive)
                .map_err(|e| CloneError::op_failed(OpKind::Remove, op.dst.clone(), e))
        }
    }
}

/// Shell-style description of `op`: `cp -p`, `rm -rf` or `rm -f`.
pub fn report_line(op: &Op<'_>) -> String {
    match op.kind {
        OpKind::Copy => format!("cp -p {} {}", shell_quote(&op.src), shell_quote(&op.dst)),
        OpKind::Remove if op.dst_meta.is_some_and(|m| m.is_dir()) => {
            format!("rm -rf {}", shell_quote(&op.dst))
        }
        OpKind::Remove => format!("rm -f {}", shell_quote(&op.dst)),
    }
}
