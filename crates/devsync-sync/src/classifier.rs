//! Filesystem path classifier (secondary/driven adapter)
//!
//! Implements [`IPathClassifier`] with a single `stat` per path.
//!
//! ## Design Decisions
//!
//! - **Symlinks are followed**: a bind mount of a symlink mounts its target,
//!   so the target's kind is what matters.
//! - **Missing paths are errors**: `NotFound` maps to
//!   [`ClassifyError::PathNotFound`] rather than being reported as a file.

use std::io::ErrorKind;

use devsync_core::{
    domain::newtypes::{PathKind, VolumePath},
    ports::path_classifier::{ClassifyError, IPathClassifier},
};
use tracing::{debug, instrument};

/// Adapter that bridges the [`IPathClassifier`] port to the real filesystem.
///
/// This is a zero-sized struct because all context comes from the
/// [`VolumePath`] argument.
#[derive(Debug, Clone, Default)]
pub struct FsPathClassifier;

impl FsPathClassifier {
    /// Create a new `FsPathClassifier`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl IPathClassifier for FsPathClassifier {
    #[instrument(skip(self), fields(path = %path))]
    fn classify(&self, path: &VolumePath) -> Result<PathKind, ClassifyError> {
        let metadata = std::fs::metadata(path.as_path()).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ClassifyError::PathNotFound(path.as_path().to_path_buf()),
            ErrorKind::PermissionDenied => {
                ClassifyError::PermissionDenied(path.as_path().to_path_buf())
            }
            _ => ClassifyError::Io {
                path: path.as_path().to_path_buf(),
                source: e,
            },
        })?;

        let kind = if metadata.is_dir() {
            PathKind::Directory
        } else {
            PathKind::File
        };
        debug!(%kind, "path classified");
        Ok(kind)
    }
}

// ============================================================================
// Unit tests
// ============================================================================
