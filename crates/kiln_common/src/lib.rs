//! Shared foundational types used across the Kiln build orchestrator.
//!
//! This crate provides the identities that flow through every stage of an
//! incremental build: source unit keys, compiled artifact identifiers, and
//! content hashes used for change detection.

#![warn(missing_docs)]

pub mod hash;
pub mod ids;

pub use hash::ContentHash;
pub use ids::{ArtifactId, UnitKey};
