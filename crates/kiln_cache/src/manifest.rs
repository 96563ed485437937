//! The per-root state manifest.
//!
//! Stored as `manifest.json` in the root's state directory. It records the
//! content hash every source unit had when it was last compiled successfully,
//! together with the dependent graph that build produced.

use std::collections::BTreeMap;
use std::path::Path;

use kiln_common::{ContentHash, UnitKey};
use kiln_graph::DependentGraph;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Name of the manifest file within a state directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Persisted state of one build root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Kiln version that produced this manifest. Invalidate on version change.
    pub kiln_version: String,

    /// Content hash of each unit at its last successful compilation.
    pub files: BTreeMap<UnitKey, ContentHash>,

    /// Dependent graph as of the last successful build.
    #[serde(default)]
    pub dependents: DependentGraph,
}

impl BuildManifest {
    /// Creates a new, empty manifest for the given Kiln version.
    pub fn new(kiln_version: &str) -> Self {
        Self {
            kiln_version: kiln_version.to_string(),
            files: BTreeMap::new(),
            dependents: DependentGraph::new(),
        }
    }

    /// Loads the manifest from `state_dir`, returning `None` if the file
    /// doesn't exist or can't be parsed.
    pub fn load(state_dir: &Path) -> Option<Self> {
        let path = state_dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Saves the manifest, creating `state_dir` if it doesn't exist.
    pub fn save(&self, state_dir: &Path) -> Result<(), CacheError> {
        std::fs::create_dir_all(state_dir).map_err(|e| CacheError::Io {
            path: state_dir.to_path_buf(),
            source: e,
        })?;
        let path = state_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Returns `true` if this manifest was produced by a compatible Kiln version.
    pub fn is_compatible(&self, current_version: &str) -> bool {
        self.kiln_version == current_version
    }
}
