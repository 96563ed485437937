//! Boundaries to the external compiler and dependency analyzer.
//!
//! The engine only sees the typed results defined here. How a concrete
//! implementation obtains them (running a process and scraping its
//! transcript, calling a library, replaying a fixture) is its own business.

use std::collections::BTreeSet;
use std::path::Path;

use kiln_common::{ArtifactId, UnitKey};
use kiln_diagnostics::Diagnostic;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// What one compiler run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutcome {
    /// Every artifact the compiler reports having written this round. May be
    /// a strict subset of the working set when the compiler judged some
    /// units up to date.
    pub written: BTreeSet<ArtifactId>,
    /// Everything the compiler reported.
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildOutcome {
    /// A round succeeds only if the compiler reported nothing at all.
    pub fn succeeded(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Artifact `dependent` depends on artifact `dependency`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// The artifact that has the dependency.
    pub dependent: ArtifactId,
    /// The artifact it depends on.
    pub dependency: ArtifactId,
}

impl DependencyEdge {
    /// Creates an edge: `dependent` depends on `dependency`.
    pub fn new(dependent: impl Into<ArtifactId>, dependency: impl Into<ArtifactId>) -> Self {
        Self {
            dependent: dependent.into(),
            dependency: dependency.into(),
        }
    }
}

/// Compiles a working set into a destination directory.
///
/// Implementations are expected to hand the whole working set to a compiler
/// with prefer-newer staleness semantics and report back exactly the
/// artifacts it wrote.
pub trait BuildInvoker {
    /// Compiles `working_set`, writing artifacts under `destination`.
    fn invoke(
        &mut self,
        working_set: &BTreeSet<UnitKey>,
        destination: &Path,
    ) -> Result<BuildOutcome, ToolError>;
}

/// Derives artifact-level dependency edges from compiled artifacts.
pub trait DependencyHarvester {
    /// Reports the dependencies of the given artifacts, in analyzer order.
    fn harvest(&mut self, written: &BTreeSet<ArtifactId>) -> Result<Vec<DependencyEdge>, ToolError>;
}

impl<T: BuildInvoker + ?Sized> BuildInvoker for Box<T> {
    fn invoke(
        &mut self,
        working_set: &BTreeSet<UnitKey>,
        destination: &Path,
    ) -> Result<BuildOutcome, ToolError> {
        (**self).invoke(working_set, destination)
    }
}

impl<T: DependencyHarvester + ?Sized> DependencyHarvester for Box<T> {
    fn harvest(&mut self, written: &BTreeSet<ArtifactId>) -> Result<Vec<DependencyEdge>, ToolError> {
        (**self).harvest(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_with_only_warnings_fails() {
        let outcome = BuildOutcome {
            written: [ArtifactId::from("b/A.class")].into_iter().collect(),
            diagnostics: vec![Diagnostic::warning("deprecation")],
        };
        assert!(!outcome.succeeded());
    }

    #[test]
    fn empty_outcome_succeeds() {
        assert!(BuildOutcome::default().succeeded());
    }

    #[test]
    fn edge_constructor_order() {
        let edge = DependencyEdge::new("b/Two.class", "b/One.class");
        assert_eq!(edge.dependent.as_str(), "b/Two.class");
        assert_eq!(edge.dependency.as_str(), "b/One.class");
    }
}
