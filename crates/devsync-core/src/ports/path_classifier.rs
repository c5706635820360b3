//! Path classifier port (driven/secondary port)
//!
//! This module defines the one question the mount resolver asks of the
//! outside world: is this absolute path a directory?
//!
//! ## Design Notes
//!
//! - The classifier is passed into the resolver explicitly, so resolution
//!   stays pure and tests can answer from memory instead of touching disk.
//! - A missing path is an error (`ClassifyError::PathNotFound`), never a
//!   silent "file": a typo'd volume must surface as a configuration problem.

use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::newtypes::{PathKind, VolumePath};

// ============================================================================
// ClassifyError
// ============================================================================

/// Errors raised while classifying a volume path
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// The path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The path exists but cannot be inspected
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Any other I/O failure while inspecting the path
    #[error("Failed to inspect {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClassifyError {
    /// The path the error refers to
    pub fn path(&self) -> &PathBuf {
        match self {
            ClassifyError::PathNotFound(p) | ClassifyError::PermissionDenied(p) => p,
            ClassifyError::Io { path, .. } => path,
        }
    }
}

// ============================================================================
// IPathClassifier trait
// ============================================================================

/// Port trait answering whether a volume path is a directory
///
/// ## Implementation Notes
///
/// - Paths are `VolumePath` instances, which are guaranteed to be absolute
///   and lexically normalized.
/// - Implementations may block (e.g. on a `stat` call); retries or
///   timeouts belong here, not in the resolver.
pub trait IPathClassifier: Send + Sync {
    /// Classifies a path as a directory or a file
    ///
    /// # Errors
    /// Returns `ClassifyError::PathNotFound` if nothing exists at `path`,
    /// or another variant if the path cannot be inspected
    fn classify(&self, path: &VolumePath) -> Result<PathKind, ClassifyError>;
}

// ============================================================================
// StaticPathClassifier
// ============================================================================

/// In-memory classifier answering from fixed sets of paths
///
/// Paths registered as directories classify as [`PathKind::Directory`],
/// registered files as [`PathKind::File`]. Anything else is
/// `PathNotFound`, unless the classifier was built with
/// [`with_directories`](Self::with_directories), in which case every
/// non-directory is a file.
#[derive(Debug, Clone, Default)]
pub struct StaticPathClassifier {
    directories: BTreeSet<VolumePath>,
    files: BTreeSet<VolumePath>,
    files_by_default: bool,
}

impl StaticPathClassifier {
    /// Creates an empty classifier that knows no paths
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a classifier where only `directories` are directories and
    /// every other path is a file
    #[must_use]
    pub fn with_directories<I>(directories: I) -> Self
    where
        I: IntoIterator<Item = VolumePath>,
    {
        Self {
            directories: directories.into_iter().collect(),
            files: BTreeSet::new(),
            files_by_default: true,
        }
    }

    /// Registers a directory
    #[must_use]
    pub fn directory(mut self, path: VolumePath) -> Self {
        self.files.remove(&path);
        self.directories.insert(path);
        self
    }

    /// Registers a file
    #[must_use]
    pub fn file(mut self, path: VolumePath) -> Self {
        self.directories.remove(&path);
        self.files.insert(path);
        self
    }
}

impl IPathClassifier for StaticPathClassifier {
    fn classify(&self, path: &VolumePath) -> Result<PathKind, ClassifyError> {
        if self.directories.contains(path) {
            Ok(PathKind::Directory)
        } else if self.files_by_default || self.files.contains(path) {
            Ok(PathKind::File)
        } else {
            Err(ClassifyError::PathNotFound(path.as_path().to_path_buf()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vp(s: &str) -> VolumePath {
        s.parse().unwrap()
    }

    #[test]
    fn test_registered_paths() {
        let classifier = StaticPathClassifier::new()
            .directory(vp("/a"))
            .file(vp("/a/f1"));

        assert_eq!(classifier.classify(&vp("/a")).unwrap(), PathKind::Directory);
        assert_eq!(classifier.classify(&vp("/a/f1")).unwrap(), PathKind::File);
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        let classifier = StaticPathClassifier::new().directory(vp("/a"));
        let err = classifier.classify(&vp("/a/typo")).unwrap_err();
        assert!(matches!(err, ClassifyError::PathNotFound(_)));
        assert_eq!(err.path(), &PathBuf::from("/a/typo"));
        assert_eq!(err.to_string(), "Path not found: /a/typo");
    }

    #[test]
    fn test_with_directories_defaults_to_files() {
        let classifier = StaticPathClassifier::with_directories([vp("/a")]);
        assert_eq!(classifier.classify(&vp("/a")).unwrap(), PathKind::Directory);
        assert_eq!(classifier.classify(&vp("/anything")).unwrap(), PathKind::File);
    }

    #[test]
    fn test_later_registration_wins() {
        let classifier = StaticPathClassifier::new()
            .file(vp("/a"))
            .directory(vp("/a"));
        assert_eq!(classifier.classify(&vp("/a")).unwrap(), PathKind::Directory);
    }
}
