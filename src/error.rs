//! Error types for bootstrap, scanning and sync runs.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::OpKind;

/// Which side of the comparison a lookup was made against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Source,
    Destination,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Destination => f.write_str("destination"),
        }
    }
}

/// Errors produced by dirclone.
#[derive(Debug, Error)]
pub enum CloneError {
    /// A root exists but is not a directory.
    #[error("{path}: not a directory")]
    NotADirectory { path: PathBuf },

    /// Destination root could not be created.
    #[error("{path}: can't create destination: {source}")]
    BootstrapFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A root could not be stat'ed or walked.
    #[error("{path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A relation lists a path that is missing from its per-side lookup.
    #[error("{path}: can't find in {side} map")]
    ClassificationInconsistency { path: PathBuf, side: Side },

    /// A copy or remove failed.
    #[error("{kind} {path}: {source}")]
    OperationFailed {
        kind: OpKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The operation was skipped because cancellation was requested.
    #[error("{path}: cancelled")]
    Cancelled { path: PathBuf },

    /// A worker thread panicked; its in-flight operation has an unknown outcome.
    #[error("worker thread panicked")]
    WorkerPanicked,

    /// Every error captured during one run.
    #[error(transparent)]
    Combined(#[from] CombinedError),
}

impl CloneError {
    pub fn op_failed(kind: OpKind, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CloneError::OperationFailed {
            kind,
            path: path.into(),
            source,
        }
    }

    /// True for the two errors that stop a run before planning.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CloneError::NotADirectory { .. }
                | CloneError::BootstrapFailed { .. }
                | CloneError::Scan { .. }
        )
    }

    /// Underlying errors: the collected list for [`CloneError::Combined`], else just `self`.
    pub fn errors(&self) -> Vec<&CloneError> {
        match self {
            CloneError::Combined(c) => c.errors().iter().collect(),
            other => vec![other],
        }
    }
}

/// Aggregate of every error captured in one run, in the order they were received.
#[derive(Debug, Default)]
pub struct CombinedError {
    errors: Vec<CloneError>,
}

impl CombinedError {
    pub fn new(errors: Vec<CloneError>) -> Self {
        Self { errors }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CloneError> {
        self.errors.iter()
    }

    pub fn errors(&self) -> &[CloneError] {
        &self.errors
    }
}

impl fmt::Display for CombinedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", e)?;
        }
        Ok(())
    }
}

impl std::error::Error for CombinedError {}

/// Result alias used by the public dirclone API.
pub type Result<T> = std::result::Result<T, CloneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_lists_every_message() {
        let c = CombinedError::new(vec![
            CloneError::ClassificationInconsistency {
                path: PathBuf::from("a"),
                side: Side::Source,
            },
            CloneError::op_failed(
                OpKind::Remove,
                "/x/b",
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            ),
        ]);
        let msg = c.to_string();
        assert_eq!(msg.lines().count(), 2);
        assert!(msg.contains("a: can't find in source map"));
        assert!(msg.contains("remove /x/b: denied"));
    }

    #[test]
    fn duplicates_are_kept() {
        let e = || CloneError::Cancelled {
            path: PathBuf::from("same"),
        };
        let c = CombinedError::new(vec![e(), e()]);
        assert_eq!(c.len(), 2);
        assert_eq!(CloneError::from(c).errors().len(), 2);
    }
}
