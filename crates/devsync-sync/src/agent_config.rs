//! Sync agent folder configuration
//!
//! Turns resolved [`Mount`]s into the folder entries the sync agent is
//! configured with. A whole-subtree mount becomes a plain folder; an include
//! mount becomes a folder whose ignore list allows exactly the included
//! names and ignores everything else:
//!
//! ```text
//! Mount { path: "/a", include: ["f1", "dir"] }
//!   -> ignore: ["!/f1", "!/dir", "*"]
//! ```
//!
//! Folder IDs are derived from the mount path so that re-rendering the same
//! deployment yields the same IDs and the agent keeps its index.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use devsync_core::config::AgentConfig;
use devsync_core::domain::{Mount, VolumePath};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

/// File name written into the agent config directory
pub const FOLDERS_FILE_NAME: &str = "folders.json";

/// Prefix of every generated folder ID
const FOLDER_ID_PREFIX: &str = "devsync-";

/// Number of hex characters of the path hash kept in a folder ID
const FOLDER_ID_HASH_LEN: usize = 12;

/// One folder entry for the sync agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderConfig {
    /// Stable identifier derived from `path`
    pub id: String,
    /// Directory watched by the agent
    pub path: VolumePath,
    /// Ignore patterns, evaluated top to bottom; empty syncs everything
    pub ignore: Vec<String>,
    /// Seconds between full rescans
    pub rescan_interval_s: u32,
    /// Seconds the watcher accumulates changes before syncing
    pub fs_watcher_delay_s: u32,
}

impl FolderConfig {
    /// Builds the folder entry for one mount
    #[must_use]
    pub fn from_mount(mount: &Mount, settings: &AgentConfig) -> Self {
        Self {
            id: folder_id(&mount.path),
            path: mount.path.clone(),
            ignore: ignore_patterns(mount),
            rescan_interval_s: settings.rescan_interval_s,
            fs_watcher_delay_s: settings.fs_watcher_delay_s,
        }
    }
}

/// The full folder configuration handed to the sync agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentFolders {
    pub folders: Vec<FolderConfig>,
}

impl AgentFolders {
    /// Builds one folder entry per mount, keeping mount order
    #[must_use]
    pub fn from_mounts(mounts: &[Mount], settings: &AgentConfig) -> Self {
        Self {
            folders: mounts
                .iter()
                .map(|mount| FolderConfig::from_mount(mount, settings))
                .collect(),
        }
    }

    /// Pretty-printed JSON document
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize agent folder configuration")
    }

    /// Writes `folders.json` into `dir`, creating the directory if needed
    ///
    /// Returns the path of the written file.
    #[instrument(skip(self), fields(dir = %dir.display(), folders = self.folders.len()))]
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let path = dir.join(FOLDERS_FILE_NAME);
        let json = self.to_json()?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!(path = %path.display(), "Wrote agent folder configuration");
        Ok(path)
    }
}

/// `devsync-` followed by the first hex characters of SHA-256(path)
#[must_use]
pub fn folder_id(path: &VolumePath) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_path().as_os_str().as_encoded_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{FOLDER_ID_PREFIX}{}", &digest[..FOLDER_ID_HASH_LEN])
}

/// Allowlist ignore patterns for an include mount, none for a subtree mount
#[must_use]
pub fn ignore_patterns(mount: &Mount) -> Vec<String> {
    if mount.sync_all {
        return Vec::new();
    }

    let mut patterns: Vec<String> = mount
        .include
        .iter()
        .map(|name| format!("!/{name}"))
        .collect();
    patterns.push("*".to_string());
    debug!(path = %mount.path, patterns = patterns.len(), "Built ignore patterns");
    patterns
}
