//! Use cases (interactors) for devsync
//!
//! Use cases orchestrate domain entities and port interfaces.
//!
//! ## Use Cases
//!
//! - [`MountResolver`] - Minimal covering set of sync-agent mounts for a volume list

pub mod resolve_mounts;

pub use resolve_mounts::{parse_volume_paths, MountResolver, Resolution, SkippedVolume};
