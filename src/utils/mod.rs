pub mod config;
pub mod dirclone_toml;
pub mod fd_limit;
pub mod logger;
pub mod tempfiles;

pub use config::*;
pub use fd_limit::{FDS_PER_WORKER, determine_threads_given_fd_limit, max_open_fds};
pub use logger::{Colors, setup_logging};
pub use tempfiles::{remove_temp, temp_path_for};
