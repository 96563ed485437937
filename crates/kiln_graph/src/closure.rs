//! Transitive expansion of a change set along dependent edges.

use std::collections::BTreeSet;

use kiln_common::UnitKey;
use tracing::trace;

use crate::graph::DependentGraph;

/// Result of expanding a build request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// The working set: the request plus everything that transitively
    /// depends on it.
    pub units: BTreeSet<UnitKey>,
    /// The snapshot with the entry of every unit that was expanded removed.
    pub snapshot: DependentGraph,
    /// Number of passes that discovered at least one dependent.
    pub passes: usize,
}

/// Grows `initial` to a fixed point over `snapshot`.
///
/// Each pass looks up every unit of the working set in the snapshot, pools
/// the dependents it finds and removes the consumed entries. The pool is
/// added after the pass. The loop ends on the first pass that finds
/// nothing. A consumed entry yields nothing on later lookups, which bounds
/// the loop and makes cycles safe: every unit on a cycle ends up in the
/// working set exactly once.
pub fn expand(initial: BTreeSet<UnitKey>, mut snapshot: DependentGraph) -> Expansion {
    let mut units = initial;
    let mut passes = 0;
    loop {
        let mut pool = BTreeSet::new();
        for unit in &units {
            if let Some(dependents) = snapshot.take_dependents(unit) {
                pool.extend(dependents);
            }
        }
        if pool.is_empty() {
            break;
        }
        passes += 1;
        trace!(pass = passes, discovered = pool.len(), "closure pass");
        units.extend(pool);
    }
    Expansion {
        units,
        snapshot,
        passes,
    }
}
