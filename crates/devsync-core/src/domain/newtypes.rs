//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for domain values.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// Path types
// ============================================================================

/// A validated absolute path requested for synchronization
///
/// VolumePath ensures the path is:
/// - Absolute (starts with /)
/// - Valid UTF-8, so every name relative to it round-trips through a `String`
/// - Lexically normalized (no `.` or `..` components, no trailing separator)
///
/// The path may name a file or a directory; which one is decided later by
/// an [`IPathClassifier`](crate::ports::IPathClassifier). Ordering follows
/// [`PathBuf`], i.e. it compares component by component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "PathBuf", into = "PathBuf")]
pub struct VolumePath(PathBuf);

impl VolumePath {
    /// Create a new VolumePath, validating it is absolute
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if the path is not absolute, is not
    /// valid UTF-8, or if a `..` component would escape the filesystem root
    pub fn new(path: PathBuf) -> Result<Self, DomainError> {
        if !path.is_absolute() {
            return Err(DomainError::InvalidPath(format!(
                "Path must be absolute: {}",
                path.display()
            )));
        }
        if path.to_str().is_none() {
            return Err(DomainError::InvalidPath(format!(
                "Path is not valid UTF-8: {}",
                path.display()
            )));
        }

        // Lexical only: the path may be a symlink alias that must not be
        // resolved here, and it may not exist at all.
        let normalized = Self::normalize_path(&path)?;
        Ok(Self(normalized))
    }

    /// Get the inner path reference
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Get the parent directory, or `None` for the root
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.0.parent().map(|p| Self(p.to_path_buf()))
    }

    /// Get the path relative to a root, as a `/`-separated string
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if this path is not within `root`
    /// or is equal to it (the relative path would be empty)
    pub fn relative_to(&self, root: &VolumePath) -> Result<String, DomainError> {
        let relative = self.0.strip_prefix(&root.0).map_err(|_| {
            DomainError::InvalidPath(format!(
                "{} is not within {}",
                self.0.display(),
                root.0.display()
            ))
        })?;

        if relative.as_os_str().is_empty() {
            return Err(DomainError::InvalidPath(format!(
                "{} has no name relative to itself",
                self.0.display()
            )));
        }

        relative.to_str().map(str::to_owned).ok_or_else(|| {
            DomainError::InvalidPath(format!(
                "{} is not valid UTF-8",
                relative.display()
            ))
        })
    }

    /// Normalize a path by resolving . and .. components
    fn normalize_path(path: &Path) -> Result<PathBuf, DomainError> {
        let mut normalized = PathBuf::new();

        for component in path.components() {
            match component {
                Component::Prefix(p) => normalized.push(p.as_os_str()),
                Component::RootDir => normalized.push("/"),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(DomainError::InvalidPath(
                            "Path escapes root via ..".to_string(),
                        ));
                    }
                }
                Component::Normal(c) => normalized.push(c),
            }
        }

        Ok(normalized)
    }
}

impl Display for VolumePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl FromStr for VolumePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(PathBuf::from(s))
    }
}

impl TryFrom<PathBuf> for VolumePath {
    type Error = DomainError;

    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl From<VolumePath> for PathBuf {
    fn from(volume: VolumePath) -> Self {
        volume.0
    }
}

impl AsRef<Path> for VolumePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

// ============================================================================
// Path classification
// ============================================================================

/// What kind of filesystem entry a [`VolumePath`] names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    /// A directory; it can root a whole-subtree mount
    Directory,
    /// Anything that is not a directory (regular file, device, socket...)
    File,
}

impl PathKind {
    /// Returns true for [`PathKind::Directory`]
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, PathKind::Directory)
    }
}

impl Display for PathKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PathKind::Directory => write!(f, "directory"),
            PathKind::File => write!(f, "file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod volume_path_tests {
        use super::*;

        fn vp(s: &str) -> VolumePath {
            s.parse().unwrap()
        }

        #[test]
        fn test_new_absolute_path() {
            let path = VolumePath::new(PathBuf::from("/home/dev/project")).unwrap();
            assert_eq!(path.as_path(), Path::new("/home/dev/project"));
        }

        #[test]
        fn test_new_relative_path_fails() {
            let result = VolumePath::new(PathBuf::from("relative/path"));
            assert!(matches!(result, Err(DomainError::InvalidPath(_))));
        }

        #[test]
        fn test_empty_path_fails() {
            assert!("".parse::<VolumePath>().is_err());
        }

        #[test]
        fn test_normalization() {
            assert_eq!(vp("/home/dev/./project/../app"), vp("/home/dev/app"));
            assert_eq!(vp("/home//dev/app/"), vp("/home/dev/app"));
        }

        #[test]
        fn test_escaping_root_fails() {
            let result: Result<VolumePath, _> = "/../etc".parse();
            assert!(result.is_err());
        }

        #[cfg(unix)]
        #[test]
        fn test_non_utf8_path_fails() {
            use std::ffi::OsStr;
            use std::os::unix::ffi::OsStrExt;

            let raw = PathBuf::from(OsStr::from_bytes(b"/a/f\xff"));
            let result = VolumePath::new(raw);
            assert!(matches!(result, Err(DomainError::InvalidPath(_))));
        }

        #[test]
        fn test_parent() {
            assert_eq!(vp("/a/b/f1").parent(), Some(vp("/a/b")));
            assert_eq!(vp("/a").parent(), Some(vp("/")));
            assert!(vp("/").parent().is_none());
        }

        #[test]
        fn test_relative_to() {
            assert_eq!(vp("/a/f1").relative_to(&vp("/a")).unwrap(), "f1");
            assert_eq!(vp("/a/b/f2").relative_to(&vp("/a")).unwrap(), "b/f2");
            assert_eq!(vp("/f").relative_to(&vp("/")).unwrap(), "f");
        }

        #[test]
        fn test_relative_to_is_component_aligned() {
            assert!(vp("/ab").relative_to(&vp("/a")).is_err());
        }

        #[test]
        fn test_relative_to_outside_or_self_fails() {
            assert!(vp("/b/f1").relative_to(&vp("/a")).is_err());
            assert!(vp("/a").relative_to(&vp("/a")).is_err());
        }

        #[test]
        fn test_ordering_is_component_wise() {
            // "/a/b" sorts before "/a-b" component-wise even though '-' < '/'
            let mut paths = vec![vp("/a-b"), vp("/a/b"), vp("/a")];
            paths.sort();
            assert_eq!(paths, vec![vp("/a"), vp("/a/b"), vp("/a-b")]);
        }

        #[test]
        fn test_display() {
            assert_eq!(vp("/home/dev/app").to_string(), "/home/dev/app");
        }

        #[test]
        fn test_serde_roundtrip() {
            let path = vp("/home/dev/app");
            let json = serde_json::to_string(&path).unwrap();
            assert_eq!(json, "\"/home/dev/app\"");
            let back: VolumePath = serde_json::from_str(&json).unwrap();
            assert_eq!(path, back);
        }

        #[test]
        fn test_deserialize_relative_fails() {
            let result: Result<VolumePath, _> = serde_json::from_str("\"relative\"");
            assert!(result.is_err());
        }
    }

    mod path_kind_tests {
        use super::*;

        #[test]
        fn test_display() {
            assert_eq!(PathKind::Directory.to_string(), "directory");
            assert_eq!(PathKind::File.to_string(), "file");
        }
    }
}
