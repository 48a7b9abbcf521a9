//! Walk loop: consumes a walkdir iterator and sends included paths to `path_tx`, recording
//! skipped paths.

use crossbeam_channel::Sender;
use log::warn;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use walkdir::WalkDir;

use crate::engine::tools::should_include_in_walk;

use super::context::ScanContext;

/// One result from a directory walk: either a path to consider or an error with optional path.
pub enum WalkOutcome {
    Ok(PathBuf),
    Err { msg: String, path: Option<PathBuf> },
}

/// Convert a walkdir result into [`WalkOutcome`].
pub fn to_outcome_walkdir(r: Result<walkdir::DirEntry, walkdir::Error>) -> WalkOutcome {
    match r {
        Ok(entry) => WalkOutcome::Ok(entry.into_path()),
        Err(err) => WalkOutcome::Err {
            msg: format!("{}", err),
            path: err.path().map(PathBuf::from),
        },
    }
}

/// Walk iterator over `ctx.root`. Excluded directories are pruned, not descended into.
fn walkdir_iter(ctx: &ScanContext) -> Box<dyn Iterator<Item = WalkOutcome> + '_> {
    Box::new(
        WalkDir::new(&ctx.root)
            .follow_links(ctx.follow_links)
            .same_file_system(ctx.single_fs)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0 || should_include_in_walk(e.path(), &ctx.root, &ctx.exclude)
            })
            .map(to_outcome_walkdir),
    )
}

pub fn spawn_walk_thread(path_tx: Sender<PathBuf>, ctx: ScanContext) -> JoinHandle<usize> {
    thread::spawn(move || {
        let iter = walkdir_iter(&ctx);
        run_walk_loop(&path_tx, &ctx, iter)
    })
}

/// Run the walk loop: consume `iter`, send included paths (never the root) to `path_tx`, push
/// errors to `skipped_paths`. Returns the count of paths sent.
pub fn run_walk_loop<I>(path_tx: &Sender<PathBuf>, ctx: &ScanContext, iter: I) -> usize
where
    I: Iterator<Item = WalkOutcome>,
{
    let mut count = 0_usize;
    for outcome in iter {
        match outcome {
            WalkOutcome::Ok(path) => {
                if path == ctx.root {
                    continue;
                }
                if path_tx.send(path).is_err() {
                    break;
                }
                count += 1;
            }
            WalkOutcome::Err { msg, path } => {
                let path = path.unwrap_or_else(|| PathBuf::from("<no-path>"));
                warn!("{}: skipped: {}", path.display(), msg);
                ctx.skipped_paths.lock().unwrap().push((path, msg));
            }
        }
    }
    count
}
