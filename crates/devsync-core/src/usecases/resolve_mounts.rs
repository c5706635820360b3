//! Mount resolution use case
//!
//! Reduces the volume paths declared for a deployment into the minimal set
//! of [`Mount`] watch roots for the sync agent. Every agent watch root has a
//! fixed cost, so the resolver:
//!
//! 1. classifies each unique path once through an [`IPathClassifier`]
//! 2. keys directories by themselves and files by their parent directory
//! 3. drops every path that has a requested proper ancestor
//! 4. emits one mount per topmost surviving key: a whole-subtree mount when
//!    that key was itself requested as a directory, an include list otherwise
//!
//! The result depends only on the *set* of requested paths and their kinds,
//! never on input order (apart from the order of include entries, which
//! follows first appearance). Resolution itself cannot fail; a path the
//! classifier rejects is skipped with a warning and reported in
//! [`Resolution::skipped`].

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{DomainError, Mount, PathKind, VolumePath};
use crate::ports::{ClassifyError, IPathClassifier};

/// A requested volume the classifier could not classify
#[derive(Debug)]
pub struct SkippedVolume {
    /// The requested path
    pub path: VolumePath,
    /// Why it was skipped
    pub error: ClassifyError,
}

/// Outcome of a resolution: the mounts to configure plus skipped volumes
#[derive(Debug, Default)]
pub struct Resolution {
    /// Watch roots, ordered by path
    pub mounts: Vec<Mount>,
    /// Volumes left out because they could not be classified
    pub skipped: Vec<SkippedVolume>,
}

impl Resolution {
    /// True when every requested volume made it into the mounts
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// The mount synchronizing `path`, if any
    #[must_use]
    pub fn covering_mount(&self, path: &Path) -> Option<&Mount> {
        self.mounts.iter().find(|mount| mount.covers(path))
    }

    /// Compares the mounts with `expected`, ignoring include order
    #[must_use]
    pub fn same_mounts_as(&self, expected: &[Mount]) -> bool {
        self.mounts.len() == expected.len()
            && self
                .mounts
                .iter()
                .zip(expected)
                .all(|(actual, expected)| actual.is_equivalent(expected))
    }
}

/// A classified volume that survived ancestor domination
struct Survivor<'a> {
    path: &'a VolumePath,
    kind: PathKind,
    key: VolumePath,
}

/// Per-root accumulator used while emitting mounts
#[derive(Default)]
struct RootGroup {
    sync_all: bool,
    include: Vec<String>,
}

/// Use case computing the sync agent's watch roots from volume paths
///
/// The resolver holds nothing but its classifier, so one instance can serve
/// any number of concurrent, independent resolutions.
pub struct MountResolver {
    classifier: Arc<dyn IPathClassifier + Send + Sync>,
}

impl MountResolver {
    /// Creates a new MountResolver
    ///
    /// # Arguments
    ///
    /// * `classifier` - Answers whether a volume path is a directory
    pub fn new(classifier: Arc<dyn IPathClassifier + Send + Sync>) -> Self {
        Self { classifier }
    }

    /// Resolves volume paths into the minimal covering set of mounts
    ///
    /// Duplicate paths count once. Paths the classifier rejects are skipped
    /// and listed in [`Resolution::skipped`]; the remaining paths are still
    /// resolved.
    pub fn resolve(&self, volumes: &[VolumePath]) -> Resolution {
        let (classified, skipped) = self.classify_all(volumes);

        let survivors = Self::dominate(&classified);
        let mounts = Self::emit(&survivors);

        info!(
            requested = volumes.len(),
            mounts = mounts.len(),
            skipped = skipped.len(),
            "Resolved sync mounts"
        );

        Resolution { mounts, skipped }
    }

    /// Step 1: classify each unique path exactly once, in input order
    fn classify_all(
        &self,
        volumes: &[VolumePath],
    ) -> (Vec<(VolumePath, PathKind)>, Vec<SkippedVolume>) {
        let mut seen: HashSet<&VolumePath> = HashSet::new();
        let mut classified = Vec::new();
        let mut skipped = Vec::new();

        for volume in volumes {
            if !seen.insert(volume) {
                debug!(path = %volume, "Ignoring duplicate volume");
                continue;
            }

            match self.classifier.classify(volume) {
                Ok(kind) => {
                    debug!(path = %volume, %kind, "Classified volume");
                    classified.push((volume.clone(), kind));
                }
                Err(error) => {
                    warn!(path = %volume, %error, "Skipping volume that could not be classified");
                    skipped.push(SkippedVolume {
                        path: volume.clone(),
                        error,
                    });
                }
            }
        }

        (classified, skipped)
    }

    /// Steps 2-3: assign grouping keys and drop paths with a requested ancestor
    fn dominate(classified: &[(VolumePath, PathKind)]) -> Vec<Survivor<'_>> {
        let requested: BTreeSet<&Path> = classified.iter().map(|(p, _)| p.as_path()).collect();

        classified
            .iter()
            .filter(|(path, _)| {
                let ancestor = path
                    .as_path()
                    .ancestors()
                    .skip(1)
                    .find(|a| requested.contains(a));
                if let Some(ancestor) = ancestor {
                    debug!(path = %path, ancestor = %ancestor.display(), "Volume covered by requested ancestor");
                    return false;
                }
                true
            })
            .map(|(path, kind)| Survivor {
                path,
                kind: *kind,
                key: Self::grouping_key(path, *kind),
            })
            .collect()
    }

    /// A directory groups under itself, anything else under its parent
    fn grouping_key(path: &VolumePath, kind: PathKind) -> VolumePath {
        if kind.is_directory() {
            return path.clone();
        }
        path.parent().unwrap_or_else(|| path.clone())
    }

    /// Steps 4-5: one mount per topmost key, siblings collapsed into includes
    fn emit(survivors: &[Survivor<'_>]) -> Vec<Mount> {
        let keys: BTreeMap<&Path, &VolumePath> = survivors
            .iter()
            .map(|s| (s.key.as_path(), &s.key))
            .collect();
        let mut groups: BTreeMap<VolumePath, RootGroup> = BTreeMap::new();

        for survivor in survivors {
            // `ancestors` yields the key itself first, so `last` is the
            // topmost key at or above it.
            let root = survivor
                .key
                .as_path()
                .ancestors()
                .filter_map(|a| keys.get(a).copied())
                .last()
                .unwrap_or(&survivor.key)
                .clone();

            let is_root_itself = survivor.path == &root;
            let group = groups.entry(root.clone()).or_default();

            if is_root_itself {
                debug!(path = %root, kind = %survivor.kind, "Syncing whole directory");
                group.sync_all = true;
                continue;
            }

            match survivor.path.relative_to(&root) {
                Ok(name) => group.include.push(name),
                Err(error) => {
                    debug!(path = %survivor.path, %error, "Volume outside its grouping root");
                }
            }
        }

        groups
            .into_iter()
            .map(|(root, group)| {
                if group.sync_all {
                    Mount::sync_all(root)
                } else {
                    Mount::with_includes(root, group.include)
                }
            })
            .collect()
    }
}

/// Parses raw volume strings, skipping (with a warning) any that are not
/// valid absolute paths
///
/// Returns the valid paths in input order and the rejected inputs with
/// their errors.
pub fn parse_volume_paths<I, S>(raw: I) -> (Vec<VolumePath>, Vec<(String, DomainError)>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut volumes = Vec::new();
    let mut rejected = Vec::new();

    for item in raw {
        let item = item.as_ref();
        match item.parse::<VolumePath>() {
            Ok(volume) => volumes.push(volume),
            Err(error) => {
                warn!(volume = item, %error, "Skipping invalid volume path");
                rejected.push((item.to_string(), error));
            }
        }
    }

    (volumes, rejected)
}
