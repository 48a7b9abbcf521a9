//! Destination bootstrap: make sure the destination root is a directory before planning.

use log::{debug, info};
use std::io::ErrorKind;
use std::path::Path;

use crate::engine::fsops::clone_entry;
use crate::error::{CloneError, Result};

/// State of the destination root after [`ensure_destination`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DestState {
    /// Already a directory.
    Existing,
    /// Did not exist and was created with the source root's metadata.
    Created,
    /// Does not exist and creation was not requested (report mode).
    Missing,
}

/// Check both roots. The source must be a directory. An existing destination must be a
/// directory (symlinks to directories are accepted); a missing one is created by cloning the
/// source root's directory metadata when `create` is set.
///
/// Any other stat failure on either root is returned as [`CloneError::Scan`].
pub fn ensure_destination(src: &Path, dst: &Path, create: bool) -> Result<DestState> {
    let src_meta = std::fs::metadata(src).map_err(|source| CloneError::Scan {
        path: src.to_path_buf(),
        source,
    })?;
    if !src_meta.is_dir() {
        return Err(CloneError::NotADirectory {
            path: src.to_path_buf(),
        });
    }

    match std::fs::metadata(dst) {
        Ok(m) if m.is_dir() => {
            debug!("{}: destination exists", dst.display());
            Ok(DestState::Existing)
        }
        Ok(_) => Err(CloneError::NotADirectory {
            path: dst.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if !create {
                info!("{}: destination does not exist yet", dst.display());
                return Ok(DestState::Missing);
            }
            clone_entry(dst, src, true).map_err(|source| CloneError::BootstrapFailed {
                path: dst.to_path_buf(),
                source,
            })?;
            debug!("{}: created destination", dst.display());
            Ok(DestState::Created)
        }
        Err(source) => Err(CloneError::Scan {
            path: dst.to_path_buf(),
            source,
        }),
    }
}
