use log::debug;

use crate::error::{CloneError, CombinedError, Result};

/// Turn the errors collected by one run into its outcome: success when none were captured,
/// otherwise one [`CloneError::Combined`] carrying all of them in arrival order.
pub fn combine_errors(errors: Vec<CloneError>) -> Result<()> {
    if errors.is_empty() {
        return Ok(());
    }
    debug!("run finished with {} errors", errors.len());
    Err(CloneError::Combined(CombinedError::new(errors)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn empty_is_success() {
        assert!(combine_errors(Vec::new()).is_ok());
    }

    #[test]
    fn single_error_is_still_combined() {
        let err = combine_errors(vec![CloneError::Cancelled {
            path: PathBuf::from("x"),
        }])
        .unwrap_err();
        match err {
            CloneError::Combined(c) => assert_eq!(c.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }
}
