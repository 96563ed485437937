//! Persisted build state for incremental rebuilds.
//!
//! Each build root keeps a manifest of source content hashes next to the
//! dependent graph learned by its last successful build. Comparing fresh
//! hashes against the manifest yields the Build Request for the next round.

#![warn(missing_docs)]

pub mod error;
pub mod hasher;
pub mod manifest;
pub mod state;

pub use error::CacheError;
pub use hasher::{ChangeSet, SourceHasher};
pub use manifest::BuildManifest;
pub use state::BuildState;
