#![deny(
    // Strict on purpose: anything that trips these gets an inline allow, which flags it for a second look in review.
    clippy::nursery,
    clippy::pedantic,
    missing_docs,
    clippy::missing_docs_in_private_items,
)]

//! # kp-gen – ranked alternate paths for network design problems
//!
//! kp-gen enumerates loopless paths between two nodes of a network in order of increasing cost
//! (Yen's algorithm on top of a negative-weight tolerant Dijkstra) and wraps that engine in the
//! helpers needed to set up and read back network design problems.
//!
//! ## Pieces
//! 1. [`network`] – caller-owned [`Network`] of nodes and attributed links, stored in a
//!    [`petgraph::Graph`], plus its JSON file form.
//! 2. [`paths`] – [`shortest_path`] and the pull-based [`YenEngine`], reading the network
//!    through [`GraphView`](paths::GraphView)s so the search never copies or mutates it.
//! 3. [`design`] – path pricing, random capacities and demands, candidate path generation and
//!    summaries of solved link-path designs.
//! 4. [`flow`] – decomposition of node-link solutions (per-link flows) into loaded paths.
//! 5. [`model`] / [`utils`] – JSON records for demands, path bundles and reports, and the file
//!    helpers the `kp-gen` binary uses.
//!
//! Searches run under [`tracing`] spans; install a subscriber (for example
//! `kp_core::logging::setup`) to see them.

pub mod design;
pub mod flow;
pub mod model;
pub mod network;
pub mod paths;
pub mod utils;

pub use model::{
    CandidatePaths,
    Demand,
    DemandMap,
    PathBundle,
    PathReport,
};
pub use network::{
    Link,
    Network,
    NodeId,
};
pub use paths::{
    shortest_path,
    PathError,
    SearchLimits,
    WeightedPath,
    YenEngine,
};
