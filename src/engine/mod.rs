//! Engine module: CLI, filesystem primitives, hashing, progress and path tools.

pub mod arg_parser;
pub mod cli;
pub mod fsops;
pub mod hashing;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use fsops::{clone_entry, remove_entry};
pub use hashing::{hash_equals, hash_file};
pub use progress::{NoopObserver, Observer, Progress};
pub use tools::{
    glob_match, mtime_changed, path_relative_to, running_as_root, should_include_in_walk,
};
