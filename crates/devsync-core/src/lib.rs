//! devsync Core - Domain logic for the sync mount resolver
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `VolumePath`, `PathKind`, `Mount`
//! - **Use cases** - `MountResolver`
//! - **Port definitions** - `IPathClassifier`, implemented by adapter crates
//! - **Configuration** - typed YAML configuration with validation
//!
//! # Architecture
//!
//! The domain module contains pure data types with no I/O.
//! Ports define trait interfaces that adapter crates implement.
//! Use cases orchestrate domain entities through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
