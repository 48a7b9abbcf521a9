//! dirclone: efficiently clone a directory tree.
//!
//! Only entries that are new or changed are copied (with their metadata), entries that no
//! longer exist in the source are removed, and the whole plan can be printed instead of applied.

pub mod bootstrap;
pub mod clone;
pub mod compare;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use clone::{TreeCloner, clone_tree, diff_tree};
pub use engine::progress::{NoopObserver, Observer, Progress};
pub use error::{CloneError, CombinedError, Result, Side};
pub use pipeline::orchestrator::{SyncRun, run_plan};
pub use pipeline::strategy::{ApplyOpts, Strategy};
