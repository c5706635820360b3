//! Port definitions (hexagonal architecture interfaces)
//!
//! Ports are interfaces that the domain core depends on, but whose
//! production implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IPathClassifier`] - Directory-or-file classification of volume paths

pub mod path_classifier;

pub use path_classifier::{ClassifyError, IPathClassifier, StaticPathClassifier};
