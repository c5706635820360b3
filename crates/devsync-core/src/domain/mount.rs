//! Mount: one watch-root directive for the sync agent
//!
//! A [`Mount`] either synchronizes the whole subtree under its path
//! (`sync_all`) or only an explicit allowlist of names relative to it
//! (`include`). Mounts are plain immutable values: they are computed fresh
//! by the [`MountResolver`](crate::usecases::MountResolver) and handed to the
//! agent configuration builder.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::newtypes::VolumePath;

/// A single watch root for the sync agent
///
/// Equality is field-wise and order-sensitive on `include`, which keeps test
/// comparisons deterministic. Use [`Mount::is_equivalent`] to compare
/// coverage while ignoring include order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    /// Directory rooting this watch
    pub path: VolumePath,
    /// Whether the entire subtree under `path` is synchronized
    #[serde(default)]
    pub sync_all: bool,
    /// Names relative to `path`, synchronized individually when `sync_all` is false
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
}

impl Mount {
    /// A mount covering the entire subtree under `path`
    #[must_use]
    pub fn sync_all(path: VolumePath) -> Self {
        Self {
            path,
            sync_all: true,
            include: Vec::new(),
        }
    }

    /// A mount covering only the given names under `path`
    ///
    /// Duplicate names are dropped, keeping the first occurrence.
    #[must_use]
    pub fn with_includes<I, S>(path: VolumePath, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let include = names
            .into_iter()
            .map(Into::<String>::into)
            .filter(|name| seen.insert(name.clone()))
            .collect();

        Self {
            path,
            sync_all: false,
            include,
        }
    }

    /// Returns true if `target` is synchronized by this mount
    ///
    /// A whole-subtree mount covers its path and everything beneath it. An
    /// include mount covers each `path/<name>` and everything beneath those.
    #[must_use]
    pub fn covers(&self, target: &Path) -> bool {
        let root = self.path.as_path();
        if self.sync_all {
            return target.starts_with(root);
        }

        let Ok(relative) = target.strip_prefix(root) else {
            return false;
        };
        self.include
            .iter()
            .any(|name| relative.starts_with(Path::new(name)))
    }

    /// Compares two mounts ignoring the order of their include entries
    #[must_use]
    pub fn is_equivalent(&self, other: &Mount) -> bool {
        if self.path != other.path || self.sync_all != other.sync_all {
            return false;
        }
        let mine: BTreeSet<&str> = self.include.iter().map(String::as_str).collect();
        let theirs: BTreeSet<&str> = other.include.iter().map(String::as_str).collect();
        mine == theirs
    }
}
