//! Per-root build state: the engine's caller-side persistence.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use kiln_common::UnitKey;
use kiln_graph::DependentGraph;
use tracing::debug;

use crate::error::CacheError;
use crate::hasher::{ChangeSet, SourceHasher};
use crate::manifest::BuildManifest;

/// Build state of one root, loaded from and saved to its state directory.
///
/// Loading is fail-safe: a missing, corrupt, or version-incompatible
/// manifest starts fresh with no hashes and an empty graph, so the next
/// build compiles every unit.
#[derive(Debug)]
pub struct BuildState {
    state_dir: PathBuf,
    manifest: BuildManifest,
    kiln_version: String,
}

impl BuildState {
    /// Loads existing state or creates an empty one.
    pub fn load_or_create(state_dir: &Path, kiln_version: &str) -> Self {
        let manifest = BuildManifest::load(state_dir)
            .filter(|m| m.is_compatible(kiln_version))
            .unwrap_or_else(|| {
                debug!(dir = %state_dir.display(), "starting from empty build state");
                BuildManifest::new(kiln_version)
            });

        Self {
            state_dir: state_dir.to_path_buf(),
            manifest,
            kiln_version: kiln_version.to_string(),
        }
    }

    /// The directory this state is persisted in.
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    /// The dependent graph of the last successful build.
    pub fn graph(&self) -> &DependentGraph {
        &self.manifest.dependents
    }

    /// The manifest as currently held in memory.
    pub fn manifest(&self) -> &BuildManifest {
        &self.manifest
    }

    /// Hashes `units` and compares them against the last successful build.
    pub fn detect_changes(&self, units: &[UnitKey]) -> ChangeSet {
        SourceHasher::detect_changes(SourceHasher::hash_units(units), &self.manifest)
    }

    /// Commits the result of a successful build.
    ///
    /// Every unit in `compiled` gets the hash observed in `changes`. A deleted
    /// unit is forgotten, and dropped from `graph`, only once all of its
    /// recorded dependents have been recompiled or deleted themselves; until
    /// then it stays in the manifest so the next change set reports it again.
    pub fn record_success(
        &mut self,
        changes: &ChangeSet,
        compiled: &BTreeSet<UnitKey>,
        mut graph: DependentGraph,
    ) {
        for unit in compiled {
            if let Some(hash) = changes.hashes.get(unit) {
                self.manifest.files.insert(unit.clone(), *hash);
            }
        }

        let deleted: BTreeSet<&UnitKey> = changes.deleted_units.iter().collect();
        for unit in &changes.deleted_units {
            let settled = self
                .manifest
                .dependents
                .dependents_of(unit)
                .map_or(true, |deps| {
                    deps.iter().all(|d| compiled.contains(d) || deleted.contains(d))
                });
            if settled {
                self.manifest.files.remove(unit);
                graph.remove_unit(unit);
            } else {
                debug!(%unit, "keeping deleted unit until its dependents are rebuilt");
            }
        }

        self.manifest.dependents = graph;
    }

    /// Persists the manifest to disk.
    pub fn save(&self) -> Result<(), CacheError> {
        self.manifest.save(&self.state_dir)
    }

    /// Discards all persisted state for this root and resets to empty.
    pub fn clear(&mut self) -> Result<(), CacheError> {
        if self.state_dir.exists() {
            std::fs::remove_dir_all(&self.state_dir).map_err(|e| CacheError::Io {
                path: self.state_dir.clone(),
                source: e,
            })?;
        }
        self.manifest = BuildManifest::new(&self.kiln_version);
        Ok(())
    }
}
