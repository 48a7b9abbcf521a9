//! Load `.dirclone.toml` (CLI only). Lib does not use this; the consuming program injects config via CloneOpts.

use serde::Deserialize;
use std::path::Path;

use crate::CloneOpts;
use crate::engine::tools::window_secs_to_ns;

#[derive(Debug, Default, Deserialize)]
pub struct DircloneToml {
    #[serde(default)]
    settings: CloneSection,
}

#[derive(Debug, Default, Deserialize)]
struct CloneSection {
    concurrency: Option<usize>,
    single_fs: Option<bool>,
    follow_links: Option<bool>,
    exclude: Option<Vec<String>>,
    hash: Option<bool>,
    mtime_window: Option<u32>,
    ignore_missing: Option<bool>,
    progress: Option<bool>,
    show_stats: Option<bool>,
    verbose: Option<bool>,
}

/// Output switches that live in the file but not in [`CloneOpts`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputSettings {
    pub progress: Option<bool>,
    pub show_stats: Option<bool>,
    pub verbose: Option<bool>,
}

/// Load a config file from `path`. Returns None if the file is missing or unreadable; logs parse errors.
pub fn load_dirclone_toml(path: &Path) -> Option<DircloneToml> {
    let s = std::fs::read_to_string(path).ok()?;
    parse_dirclone_toml(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

pub fn parse_dirclone_toml(s: &str) -> Result<DircloneToml, toml::de::Error> {
    toml::from_str(s)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($idx:expr, $opts:expr, $idx_field:ident => $opts_field:ident) => {
        if let Some(v) = $idx.$idx_field {
            $opts.$opts_field = v;
        }
    };
}

impl DircloneToml {
    /// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
    /// The apply switch is never read from the file.
    pub fn apply_to_opts(&self, opts: &mut CloneOpts) {
        let s = &self.settings;
        if let Some(n) = s.concurrency {
            opts.concurrency = Some(n);
        }
        apply_file_opt!(s, opts, single_fs => single_fs);
        apply_file_opt!(s, opts, follow_links => follow_links);
        if let Some(ref v) = s.exclude {
            opts.exclude = v.clone();
        }
        apply_file_opt!(s, opts, hash => with_hash);
        if let Some(secs) = s.mtime_window {
            opts.mtime_window_ns = window_secs_to_ns(secs);
        }
        apply_file_opt!(s, opts, ignore_missing => ignore_missing);
    }

    pub fn output(&self) -> OutputSettings {
        OutputSettings {
            progress: self.settings.progress,
            show_stats: self.settings.show_stats,
            verbose: self.settings.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let file = parse_dirclone_toml(
            r#"
            [settings]
            concurrency = 3
            single_fs = true
            exclude = ["*.log"]
            mtime_window = 2
            show_stats = true
            "#,
        )
        .unwrap();
        let mut opts = CloneOpts::default();
        file.apply_to_opts(&mut opts);
        assert_eq!(opts.concurrency, Some(3));
        assert!(opts.single_fs);
        assert!(!opts.follow_links);
        assert_eq!(opts.exclude, vec!["*.log".to_string()]);
        assert_eq!(opts.mtime_window_ns, 2_000_000_000);
        assert_eq!(file.output().show_stats, Some(true));
        assert_eq!(file.output().progress, None);
    }

    #[test]
    fn negative_window_is_a_parse_error() {
        assert!(parse_dirclone_toml("[settings]\nmtime_window = -5\n").is_err());
    }

    #[test]
    fn empty_file_changes_nothing() {
        let file = parse_dirclone_toml("").unwrap();
        let mut opts = CloneOpts::default();
        file.apply_to_opts(&mut opts);
        assert_eq!(opts.concurrency, None);
        assert!(opts.exclude.is_empty());
    }
}
