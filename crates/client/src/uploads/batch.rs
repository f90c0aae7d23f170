//! Upload batch selection and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Maximum number of files one batch may carry, by policy.
pub const MAX_BATCH_FILES: usize = 6;

/// Errors rejecting a batch before any request is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    /// More files were selected than one batch allows.
    #[error("only up to {max} files are allowed at once, got {count}")]
    TooManyFiles {
        /// Number of files selected.
        count: usize,
        /// The policy limit.
        max: usize,
    },

    /// Nothing was selected.
    #[error("no files selected")]
    Empty,
}

/// An ephemeral ordered selection of files for one upload flow.
///
/// A batch exists only for the duration of one selection → confirmation →
/// upload interaction and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadBatch {
    paths: Vec<PathBuf>,
    overwrite: bool,
}

impl UploadBatch {
    /// Validates a selection into a batch.
    ///
    /// Rejects empty selections and selections above [`MAX_BATCH_FILES`];
    /// rejection happens before any request is issued.
    pub fn new(paths: Vec<PathBuf>) -> Result<Self, BatchError> {
        if paths.is_empty() {
            return Err(BatchError::Empty);
        }
        if paths.len() > MAX_BATCH_FILES {
            return Err(BatchError::TooManyFiles {
                count: paths.len(),
                max: MAX_BATCH_FILES,
            });
        }

        Ok(Self {
            paths,
            overwrite: false,
        })
    }

    /// Requests that existing names be overwritten on the backend.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// The selected paths, in selection order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Number of files in the batch.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// A validated batch is never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether existing names should be overwritten.
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("f{i}.txt"))).collect()
    }

    #[test]
    fn accepts_up_to_the_limit() {
        for n in 1..=MAX_BATCH_FILES {
            let batch = UploadBatch::new(paths(n)).unwrap();
            assert_eq!(batch.len(), n);
        }
    }

    #[test]
    fn rejects_batches_above_the_limit() {
        let err = UploadBatch::new(paths(MAX_BATCH_FILES + 1)).unwrap_err();
        assert_eq!(
            err,
            BatchError::TooManyFiles {
                count: 7,
                max: MAX_BATCH_FILES
            }
        );
    }

    #[test]
    fn rejects_empty_selection() {
        assert_eq!(UploadBatch::new(vec![]).unwrap_err(), BatchError::Empty);
    }

    #[test]
    fn keeps_selection_order() {
        let batch = UploadBatch::new(paths(3)).unwrap();
        let names: Vec<_> = batch
            .paths()
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["f0.txt", "f1.txt", "f2.txt"]);
    }

    #[test]
    fn overwrite_defaults_off() {
        let batch = UploadBatch::new(paths(1)).unwrap();
        assert!(!batch.overwrite());
        assert!(batch.with_overwrite(true).overwrite());
    }
}
