//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
    temp_suffix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
                temp_suffix: format!(".{pkg}.tmp"),
            }
        })
    }

    /// Name of the optional CLI config file (e.g. `.dirclone.toml`).
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Suffix of the sibling temp file a regular file is copied into before the rename.
    pub fn temp_suffix(&self) -> &str {
        &self.temp_suffix
    }

    /// Names excluded from every walk. `.zfs` is the ZFS snapshot control dir.
    pub fn default_exclude_patterns(&self) -> Vec<String> {
        vec![".zfs".to_string(), format!("*{}", self.temp_suffix())]
    }
}

// ---- Hashing ----

/// Hashing I/O thresholds and buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// File size above which hashing uses memory-mapped I/O (bytes). 100 MB.
    pub const HASH_MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;
    /// Chunk size for reading files below mmap threshold (bytes). 1 MB.
    pub const HASH_READ_CHUNK_SIZE: usize = 1024 * 1024;
}

// ---- Channels ----

/// Capacity of the walk → metadata-worker path channel.
pub const SCAN_CHANNEL_CAP: usize = 50_000;

/// Work queue capacity per worker. Producers block once `concurrency * WORK_QUEUE_PER_WORKER`
/// operations are queued.
pub const WORK_QUEUE_PER_WORKER: usize = 1;

// ---- Progress ----

/// Progress bar refresh batching (operations per bar update).
pub const PROGRESS_UPDATE_BATCH_SIZE: usize = 16;
