//! devsync Sync - Adapters around the mount resolver
//!
//! Provides:
//! - Filesystem-backed path classification
//! - Bind-mount source extraction from compose files
//! - Sync agent folder configuration rendering
//!
//! ## Modules
//!
//! - [`classifier`] - [`FsPathClassifier`], the production `IPathClassifier`
//! - [`compose`] - Bind sources of `services.*.volumes`, symlink-resolved
//! - [`agent_config`] - One agent folder entry per resolved mount

pub mod agent_config;
pub mod classifier;
pub mod compose;

pub use agent_config::{AgentFolders, FolderConfig};
pub use classifier::FsPathClassifier;
pub use compose::{load_bind_sources, BindSource, ComposeError, ComposeVolumes};
