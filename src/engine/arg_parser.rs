use clap::Parser;
use std::path::PathBuf;

/// Efficiently clone a directory: copy only what changed, remove what is gone.
#[derive(Clone, Parser)]
#[command(name = "dirclone")]
#[command(
    about = "Make DEST match SRC. Prints the plan unless --apply is given.",
    long_about = "Faithfully duplicates the contents of SRC into DEST by only copying entries \
                  that are new or changed and removing entries that are gone from SRC. All \
                  file metadata is duplicated, including xattrs when possible."
)]
pub struct Cli {
    /// Source directory.
    #[arg(value_name = "SRC")]
    pub src: PathBuf,

    /// Destination directory. Created when missing.
    #[arg(value_name = "DEST")]
    pub dst: PathBuf,

    /// Make the changes. Without it, one shell-style line per planned operation is printed.
    #[arg(long)]
    pub apply: bool,

    /// Use up to N concurrent workers. Default: number of CPUs.
    #[arg(long, short = 'c', value_name = "N")]
    pub concurrency: Option<usize>,

    /// Follow symbolic links.
    #[arg(long, short = 'L', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_symlinks: Option<bool>,

    /// Don't cross file-system mount points.
    #[arg(long, short = 'x', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub single_file_system: Option<bool>,

    /// Exclude patterns (glob syntax). Can specify multiple: -e pattern1 pattern2 pattern3
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Compare file contents with blake3 when metadata matches (slower but exact).
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub check_hash: Option<bool>,

    /// Mtime tolerance window in seconds. Files within this window are considered unchanged.
    #[arg(long, short = 'm', value_parser = clap::value_parser!(u32))]
    pub mtime_window: Option<u32>,

    /// Ignore source files that disappear while cloning.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub ignore_missing: Option<bool>,

    /// Show a progress bar (verbose lines when not on a terminal).
    #[arg(long, short = 'p', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub progress: Option<bool>,

    /// Show clone statistics at the end.
    #[arg(long, short = 's', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub show_stats: Option<bool>,

    /// Verbose output: one line per operation and debug logging. Wins over --progress.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    /// Config file. Default: `.dirclone.toml` in the current directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
