//! Ranked loopless path search.
//!
//! Two algorithms make up the search:
//! 1. [`shortest_path`] – a label-correcting variant of Dijkstra's algorithm (after Bhandari,
//!    "Survivable Networks") that stays correct when some link weights are negative, as happens on
//!    the transformed graphs used for disjoint-path computations. The graph must not contain a
//!    negative cycle reachable from the source; if it does, the search reports
//!    [`PathError::InconsistentGraph`] instead of looping.
//! 2. [`YenEngine`] – Yen's k-shortest loopless paths. Each round takes the last returned path,
//!    branches off at every node from its deflection node onwards (the "spur"), searches the graph
//!    with the root path and previously explored links hidden, and keeps the results in a candidate
//!    heap ordered by cost and then by node sequence.
//!
//! Both algorithms read graphs through [`GraphView`]. A [`WeightedView`] binds a
//! [`Network`](crate::network::Network) to one weight attribute; a [`RestrictedView`] hides nodes
//! and links of another view without copying it.

/// Label-correcting shortest path search
mod dijkstra;
/// Typed failures of the path search
mod error;
/// Graph views consumed by the search
mod view;
/// Path values produced by the engine
mod weighted_path;
/// Yen's k-shortest loopless paths
mod yen;

#[cfg(test)]
mod tests;

pub use dijkstra::{
    shortest_path,
    Path,
};
pub use error::PathError;
pub use view::{
    GraphView,
    RestrictedView,
    WeightedView,
};
pub use weighted_path::WeightedPath;
pub use yen::{
    EngineState,
    SearchLimits,
    YenEngine,
};
