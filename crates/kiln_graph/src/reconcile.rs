//! Installing freshly harvested edges into the consumed snapshot.

use kiln_common::UnitKey;
use tracing::trace;

use crate::error::NamingError;
use crate::graph::DependentGraph;
use crate::naming::Naming;
use crate::toolchain::DependencyEdge;

/// Builds the next dependent graph from this round's snapshot and edges.
///
/// `snapshot` must be the one returned by [`expand`](crate::expand): the
/// entries of every unit expanded this round are already gone, so the
/// harvested edges replace them instead of being merged on top. Entries of
/// untouched units pass through unchanged.
///
/// Every edge is translated before anything is inserted, so a translation
/// failure returns without a half-built graph. Self-edges are dropped; a
/// unit never needs to be rebuilt because of itself.
pub fn reconcile(
    mut snapshot: DependentGraph,
    edges: &[DependencyEdge],
    naming: &Naming,
) -> Result<DependentGraph, NamingError> {
    let translated = edges
        .iter()
        .map(|edge| {
            Ok((
                naming.to_source_unit(&edge.dependency)?,
                naming.to_source_unit(&edge.dependent)?,
            ))
        })
        .collect::<Result<Vec<(UnitKey, UnitKey)>, NamingError>>()?;

    for (dependency, dependent) in translated {
        if dependency == dependent {
            trace!(unit = %dependency, "dropping self-edge");
            continue;
        }
        snapshot.add_dependent(dependency, dependent);
    }
    Ok(snapshot)
}
