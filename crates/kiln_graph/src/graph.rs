//! The dependent (reverse-dependency) graph.

use std::collections::{BTreeMap, BTreeSet};

use kiln_common::UnitKey;
use serde::{Deserialize, Serialize};

type Edges = BTreeMap<UnitKey, BTreeSet<UnitKey>>;

/// Mapping from a source unit to the units that depend on it.
///
/// An entry `A -> {B}` means B depends on A, so a change to A must trigger a
/// rebuild of B. Units with no known dependents have no entry at all; the
/// graph never stores an empty set. Deserializing drops empty sets so a
/// hand-edited file cannot break that rule.
///
/// The graph is owned by the caller across builds. A build call only ever
/// replaces it wholesale after a successful round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Edges", into = "Edges")]
pub struct DependentGraph {
    edges: Edges,
}

impl DependentGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no unit has recorded dependents.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of units with at least one dependent.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Total number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Returns the dependents of `unit`, if it has any.
    pub fn dependents_of(&self, unit: &UnitKey) -> Option<&BTreeSet<UnitKey>> {
        self.edges.get(unit)
    }

    /// Returns `true` if `unit` has recorded dependents.
    pub fn contains_unit(&self, unit: &UnitKey) -> bool {
        self.edges.contains_key(unit)
    }

    /// Records that `dependent` depends on `dependency`. Returns `false` if
    /// the edge was already present.
    pub fn add_dependent(&mut self, dependency: UnitKey, dependent: UnitKey) -> bool {
        self.edges.entry(dependency).or_default().insert(dependent)
    }

    /// Removes and returns the dependents of `unit`.
    pub fn take_dependents(&mut self, unit: &UnitKey) -> Option<BTreeSet<UnitKey>> {
        self.edges.remove(unit)
    }

    /// Removes `unit` everywhere: its own entry and its membership in every
    /// other unit's dependents. Entries left empty are dropped.
    pub fn remove_unit(&mut self, unit: &UnitKey) {
        self.edges.remove(unit);
        self.edges.retain(|_, dependents| {
            dependents.remove(unit);
            !dependents.is_empty()
        });
    }

    /// Replaces the whole graph with `other`: clear, then repopulate.
    pub fn replace_with(&mut self, other: DependentGraph) {
        self.edges.clear();
        self.edges.extend(other.edges);
    }

    /// Iterates over `(unit, dependents)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&UnitKey, &BTreeSet<UnitKey>)> {
        self.edges.iter()
    }
}

impl From<Edges> for DependentGraph {
    fn from(mut edges: Edges) -> Self {
        edges.retain(|_, dependents| !dependents.is_empty());
        Self { edges }
    }
}

impl From<DependentGraph> for Edges {
    fn from(graph: DependentGraph) -> Self {
        graph.edges
    }
}

/// Builds a graph from `(dependency, dependent)` pairs.
impl FromIterator<(UnitKey, UnitKey)> for DependentGraph {
    fn from_iter<I: IntoIterator<Item = (UnitKey, UnitKey)>>(iter: I) -> Self {
        let mut graph = Self::new();
        for (dependency, dependent) in iter {
            graph.add_dependent(dependency, dependent);
        }
        graph
    }
}
