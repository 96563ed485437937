//! Mapping between compiled artifacts and the source units they came from.
//!
//! An artifact `<artifact_root>/<rel>.<artifact_ext>` corresponds to the unit
//! `<source_root>/<rel>.<source_ext>`. The mapping is a prefix and suffix
//! rewrite in both directions. Nested-class artifacts (`Outer$Inner.class`)
//! have no unit of their own and map to the unit of their outermost class.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use kiln_common::{ArtifactId, UnitKey};

use crate::error::NamingError;

/// The source/artifact naming contract of one build root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Naming {
    source_root: PathBuf,
    artifact_root: PathBuf,
    source_ext: String,
    artifact_ext: String,
}

impl Naming {
    /// Creates a naming contract. Extensions may be given with or without
    /// the leading dot.
    pub fn new(
        source_root: impl Into<PathBuf>,
        artifact_root: impl Into<PathBuf>,
        source_ext: &str,
        artifact_ext: &str,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            artifact_root: artifact_root.into(),
            source_ext: source_ext.trim_start_matches('.').to_string(),
            artifact_ext: artifact_ext.trim_start_matches('.').to_string(),
        }
    }

    /// Directory holding the source units.
    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    /// Directory the compiler writes artifacts into.
    pub fn artifact_root(&self) -> &Path {
        &self.artifact_root
    }

    /// Suffix of source units, without the dot.
    pub fn source_ext(&self) -> &str {
        &self.source_ext
    }

    /// Suffix of compiled artifacts, without the dot.
    pub fn artifact_ext(&self) -> &str {
        &self.artifact_ext
    }

    /// Maps an artifact back to the source unit that produced it.
    pub fn to_source_unit(&self, artifact: &ArtifactId) -> Result<UnitKey, NamingError> {
        let path = rewrite(
            artifact.as_str(),
            &self.artifact_root,
            &self.artifact_ext,
            &self.source_root,
            &self.source_ext,
        )?;
        Ok(UnitKey::from_path(&outermost(path, &self.source_ext)))
    }

    /// Maps a source unit to the artifact the compiler will write for it.
    pub fn to_artifact(&self, unit: &UnitKey) -> Result<ArtifactId, NamingError> {
        rewrite(
            unit.as_str(),
            &self.source_root,
            &self.source_ext,
            &self.artifact_root,
            &self.artifact_ext,
        )
        .map(|path| ArtifactId::from_path(&path))
    }

    /// Returns `true` if `path` carries the source suffix.
    pub fn is_source(&self, path: &Path) -> bool {
        path.extension() == Some(OsStr::new(&self.source_ext))
    }
}

fn rewrite(
    key: &str,
    from_root: &Path,
    from_ext: &str,
    to_root: &Path,
    to_ext: &str,
) -> Result<PathBuf, NamingError> {
    let relative = Path::new(key)
        .strip_prefix(from_root)
        .map_err(|_| NamingError::OutsideRoot {
            key: key.to_string(),
            root: from_root.to_path_buf(),
        })?;
    if relative.extension() != Some(OsStr::new(from_ext)) {
        return Err(NamingError::UnexpectedSuffix {
            key: key.to_string(),
            expected: from_ext.to_string(),
        });
    }
    Ok(to_root.join(relative).with_extension(to_ext))
}

/// `Outer$Inner$1.java` -> `Outer.java`. A leading `$` is part of the name.
fn outermost(path: PathBuf, ext: &str) -> PathBuf {
    let stem = path.file_stem().and_then(OsStr::to_str).unwrap_or_default();
    match stem.get(1..).and_then(|rest| rest.find('$')) {
        Some(idx) => {
            let top = format!("{}.{ext}", &stem[..idx + 1]);
            path.with_file_name(top)
        }
        None => path,
    }
}
