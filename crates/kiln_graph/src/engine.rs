//! The caller-facing build entry point.

use std::collections::BTreeSet;
use std::path::Path;

use kiln_common::{ArtifactId, UnitKey};
use tracing::{debug, info, warn};

use crate::closure::{expand, Expansion};
use crate::error::BuildError;
use crate::graph::DependentGraph;
use crate::naming::Naming;
use crate::reconcile::reconcile;
use crate::toolchain::{BuildInvoker, DependencyHarvester};

/// Summary of one successful build call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Every unit handed to the compiler.
    pub working_set: BTreeSet<UnitKey>,
    /// Every artifact the compiler wrote.
    pub written: BTreeSet<ArtifactId>,
    /// Number of dependency edges harvested from the written artifacts.
    pub edges: usize,
    /// Number of productive closure passes.
    pub passes: usize,
}

/// Incremental builder for one build root.
///
/// Holds the two external collaborators and the naming contract of the
/// root. The dependent graph is not owned here; each call borrows the
/// caller's graph mutably and either replaces it wholesale or leaves it
/// untouched.
pub struct Builder<C, H> {
    compiler: C,
    harvester: H,
    naming: Naming,
}

impl<C: BuildInvoker, H: DependencyHarvester> Builder<C, H> {
    /// Creates a builder for the root described by `naming`.
    pub fn new(compiler: C, harvester: H, naming: Naming) -> Self {
        Self {
            compiler,
            harvester,
            naming,
        }
    }

    /// The naming contract of this root.
    pub fn naming(&self) -> &Naming {
        &self.naming
    }

    /// The compiler collaborator.
    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// The analyzer collaborator.
    pub fn harvester(&self) -> &H {
        &self.harvester
    }

    /// Builds `request` and everything that depends on it.
    ///
    /// Returns the artifacts the compiler wrote. On success `graph` is
    /// replaced by the reconciled graph; on any error it is left exactly as
    /// it was.
    pub fn build(
        &mut self,
        request: BTreeSet<UnitKey>,
        graph: &mut DependentGraph,
    ) -> Result<BTreeSet<ArtifactId>, BuildError> {
        self.build_with_report(request, graph).map(|report| report.written)
    }

    /// Like [`build`](Self::build), returning the full [`BuildReport`].
    #[tracing::instrument(level = "debug", skip_all, fields(
        root = %self.naming.source_root().display(),
        request = request.len(),
    ))]
    pub fn build_with_report(
        &mut self,
        request: BTreeSet<UnitKey>,
        graph: &mut DependentGraph,
    ) -> Result<BuildReport, BuildError> {
        let destination = self.naming.artifact_root().to_path_buf();
        std::fs::create_dir_all(&destination).map_err(|source| BuildError::Io {
            path: destination.clone(),
            source,
        })?;

        let Expansion {
            units,
            snapshot,
            passes,
        } = expand(request, graph.clone());
        debug!(working_set = units.len(), passes, "closure expanded");

        let outcome = self.compiler.invoke(&units, &destination)?;
        if !outcome.succeeded() {
            warn!(
                diagnostics = outcome.diagnostics.len(),
                written = outcome.written.len(),
                "compiler reported diagnostics; dependency graph left unchanged"
            );
            return Err(BuildError::Compile {
                diagnostics: outcome.diagnostics,
            });
        }
        debug!(written = outcome.written.len(), "compile succeeded");

        let edges = if outcome.written.is_empty() {
            Vec::new()
        } else {
            self.harvester.harvest(&outcome.written)?
        };
        debug!(edges = edges.len(), "dependencies harvested");

        let updated = reconcile(snapshot, &edges, &self.naming)?;
        graph.replace_with(updated);

        info!(
            compiled = units.len(),
            written = outcome.written.len(),
            graph_units = graph.len(),
            "build complete"
        );
        Ok(BuildReport {
            working_set: units,
            written: outcome.written,
            edges: edges.len(),
            passes,
        })
    }

    /// Builds every source unit under the source root.
    pub fn build_full(&mut self, graph: &mut DependentGraph) -> Result<BuildReport, BuildError> {
        let request = self.discover_sources()?;
        debug!(sources = request.len(), "full build");
        self.build_with_report(request, graph)
    }

    /// Lists every file under the source root that carries the source suffix.
    pub fn discover_sources(&self) -> Result<BTreeSet<UnitKey>, BuildError> {
        let mut units = BTreeSet::new();
        walk_dir(self.naming.source_root(), &self.naming, &mut units)?;
        Ok(units)
    }
}

/// Recursively walks a directory collecting source units.
fn walk_dir(dir: &Path, naming: &Naming, units: &mut BTreeSet<UnitKey>) -> Result<(), BuildError> {
    let io_err = |source| BuildError::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_dir() {
            walk_dir(&path, naming, units)?;
        } else if naming.is_source(&path) {
            units.insert(UnitKey::from_path(&path));
        }
    }
    Ok(())
}
