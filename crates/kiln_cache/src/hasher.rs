//! Source hashing and change detection.
//!
//! Computes content hashes for source units and compares them against the
//! manifest to find which units are new, modified, deleted, or unchanged
//! since the last successful build.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use kiln_common::{ContentHash, UnitKey};
use kiln_graph::DependentGraph;

use crate::error::CacheError;
use crate::manifest::BuildManifest;

/// Result of comparing current unit hashes against the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Units not present in the manifest.
    pub new_units: Vec<UnitKey>,

    /// Units whose content hash differs from the manifest.
    pub modified_units: Vec<UnitKey>,

    /// Units present in the manifest but missing from the current set.
    pub deleted_units: Vec<UnitKey>,

    /// Units whose content hash matches the manifest.
    pub unchanged_units: Vec<UnitKey>,

    /// Hashes of every unit that could be read, as observed during detection.
    pub hashes: BTreeMap<UnitKey, ContentHash>,
}

impl ChangeSet {
    /// Returns `true` if there are no new, modified, or deleted units.
    pub fn is_empty(&self) -> bool {
        self.new_units.is_empty() && self.modified_units.is_empty() && self.deleted_units.is_empty()
    }

    /// Derives the Build Request for the next round.
    ///
    /// New and modified units, plus the surviving direct dependents of every
    /// deleted unit: they referenced something that no longer exists and must
    /// be recompiled to surface that. Further dependents are left to closure
    /// expansion.
    pub fn request(&self, graph: &DependentGraph) -> BTreeSet<UnitKey> {
        let mut request: BTreeSet<UnitKey> = self
            .new_units
            .iter()
            .chain(&self.modified_units)
            .cloned()
            .collect();
        for deleted in &self.deleted_units {
            if let Some(dependents) = graph.dependents_of(deleted) {
                request.extend(
                    dependents
                        .iter()
                        .filter(|d| self.hashes.contains_key(*d))
                        .cloned(),
                );
            }
        }
        request
    }
}

/// Utility for computing content hashes of source units and detecting changes.
pub struct SourceHasher;

impl SourceHasher {
    /// Computes the XXH3-128 content hash of a single file.
    pub fn hash_file(path: &Path) -> Result<ContentHash, CacheError> {
        let content = std::fs::read(path).map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(ContentHash::from_bytes(&content))
    }

    /// Computes content hashes for multiple units.
    ///
    /// Units that cannot be read are skipped and so appear as deleted in the
    /// change set.
    pub fn hash_units(units: &[UnitKey]) -> BTreeMap<UnitKey, ContentHash> {
        units
            .iter()
            .filter_map(|unit| {
                Self::hash_file(unit.as_path())
                    .ok()
                    .map(|hash| (unit.clone(), hash))
            })
            .collect()
    }

    /// Compares current hashes against the manifest.
    ///
    /// Every list in the result is sorted.
    pub fn detect_changes(
        current_hashes: BTreeMap<UnitKey, ContentHash>,
        manifest: &BuildManifest,
    ) -> ChangeSet {
        let mut changes = ChangeSet::default();

        // BTreeMap iteration keeps every list sorted.
        for (unit, hash) in &current_hashes {
            match manifest.files.get(unit) {
                Some(recorded) if recorded == hash => changes.unchanged_units.push(unit.clone()),
                Some(_) => changes.modified_units.push(unit.clone()),
                None => changes.new_units.push(unit.clone()),
            }
        }
        changes.deleted_units = manifest
            .files
            .keys()
            .filter(|unit| !current_hashes.contains_key(*unit))
            .cloned()
            .collect();
        changes.hashes = current_hashes;
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(s: &str) -> UnitKey {
        UnitKey::from(s)
    }

    fn hashes(entries: &[(&str, &[u8])]) -> BTreeMap<UnitKey, ContentHash> {
        entries
            .iter()
            .map(|(u, bytes)| (unit(u), ContentHash::from_bytes(bytes)))
            .collect()
    }

    #[test]
    fn hash_file_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("A.java");
        std::fs::write(&path, "class A {}").unwrap();
        let h1 = SourceHasher::hash_file(&path).unwrap();
        let h2 = SourceHasher::hash_file(&path).unwrap();
        assert_eq!(h1, h2);
    }

    #[test]
    fn hash_file_nonexistent_errors() {
        let err = SourceHasher::hash_file(Path::new("/nonexistent/A.java")).unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
    }

    #[test]
    fn hash_units_skips_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("A.java");
        std::fs::write(&present, "class A {}").unwrap();
        let units = vec![
            UnitKey::from_path(&present),
            UnitKey::from_path(&dir.path().join("Gone.java")),
        ];
        let hashed = SourceHasher::hash_units(&units);
        assert_eq!(hashed.len(), 1);
        assert!(hashed.contains_key(&units[0]));
    }

    #[test]
    fn detect_changes_all_new() {
        let manifest = BuildManifest::new("0.1.0");
        let cs = SourceHasher::detect_changes(hashes(&[("b", b"b"), ("a", b"a")]), &manifest);
        assert_eq!(cs.new_units, vec![unit("a"), unit("b")]);
        assert!(cs.modified_units.is_empty());
        assert!(cs.deleted_units.is_empty());
    }

    #[test]
    fn detect_changes_mixed() {
        let mut manifest = BuildManifest::new("0.1.0");
        manifest.files = hashes(&[("same", b"1"), ("edited", b"old"), ("removed", b"x")]);
        let cs = SourceHasher::detect_changes(
            hashes(&[("same", b"1"), ("edited", b"new"), ("fresh", b"y")]),
            &manifest,
        );
        assert_eq!(cs.new_units, vec![unit("fresh")]);
        assert_eq!(cs.modified_units, vec![unit("edited")]);
        assert_eq!(cs.deleted_units, vec![unit("removed")]);
        assert_eq!(cs.unchanged_units, vec![unit("same")]);
        assert!(!cs.is_empty());
    }

    #[test]
    fn nothing_changed_is_empty_request() {
        let mut manifest = BuildManifest::new("0.1.0");
        manifest.files = hashes(&[("a", b"1")]);
        manifest.dependents.add_dependent(unit("a"), unit("b"));
        let cs = SourceHasher::detect_changes(hashes(&[("a", b"1")]), &manifest);
        assert!(cs.is_empty());
        assert!(cs.request(&manifest.dependents).is_empty());
    }

    #[test]
    fn request_includes_surviving_dependents_of_deleted() {
        let mut manifest = BuildManifest::new("0.1.0");
        manifest.files = hashes(&[("One", b"1"), ("Two", b"2"), ("Three", b"3"), ("Four", b"4")]);
        // Two and Three use One; Three is deleted too. Four uses Two.
        manifest.dependents = [
            (unit("One"), unit("Two")),
            (unit("One"), unit("Three")),
            (unit("Two"), unit("Four")),
        ]
        .into_iter()
        .collect();
        let cs = SourceHasher::detect_changes(hashes(&[("Two", b"2"), ("Four", b"4")]), &manifest);
        assert_eq!(cs.deleted_units, vec![unit("One"), unit("Three")]);
        let request: Vec<UnitKey> = cs.request(&manifest.dependents).into_iter().collect();
        assert_eq!(request, vec![unit("Two")]);
    }
}
