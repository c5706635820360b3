//! Domain entities and business logic
//!
//! This module contains the core domain types for devsync:
//! - Newtypes for validated volume paths and their filesystem kind
//! - The `Mount` watch-root directive
//! - Domain-specific error types

pub mod errors;
pub mod mount;
pub mod newtypes;

// Re-export commonly used types
pub use errors::DomainError;
pub use mount::Mount;
pub use newtypes::*;
