//! Incremental dependency-graph engine.
//!
//! Given the set of source units the caller believes changed and the
//! [`DependentGraph`] learned by earlier builds, the engine:
//!
//! 1. expands the request to every unit that transitively depends on it
//!    ([`closure::expand`]),
//! 2. hands that working set to the compiler ([`BuildInvoker`]),
//! 3. aborts with the graph untouched if the compiler reported anything,
//! 4. otherwise harvests fresh artifact-level edges for the artifacts just
//!    written ([`DependencyHarvester`]) and
//! 5. installs a reconciled graph in which the edges of every unit touched
//!    this round are replaced, not merged ([`reconcile::reconcile`]).
//!
//! The caller owns the graph and its persistence. [`Builder`] ties the
//! stages together.

#![warn(missing_docs)]

pub mod closure;
pub mod engine;
pub mod error;
pub mod graph;
pub mod naming;
pub mod reconcile;
pub mod toolchain;

pub use closure::{expand, Expansion};
pub use engine::{BuildReport, Builder};
pub use error::{BuildError, NamingError, ToolError};
pub use graph::DependentGraph;
pub use naming::Naming;
pub use reconcile::reconcile;
pub use toolchain::{BuildInvoker, BuildOutcome, DependencyEdge, DependencyHarvester};
