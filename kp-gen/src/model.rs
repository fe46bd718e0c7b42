//! Interchange records for demands, candidate paths and path reports.
//!
//! In memory, demands and candidate paths are maps keyed by the `(source, target)` pair; on disk
//! they are lists of flat JSON records. Conversion between the two lives here.
use std::collections::BTreeMap;

use serde::{
    Deserialize,
    Serialize,
};

use crate::network::NodeId;
use crate::paths::WeightedPath;

/// Demand volumes keyed by `(source, target)`.
pub type DemandMap<N> = BTreeMap<(N, N), f64>;

/// Candidate paths keyed by demand pair; each path is a node list.
pub type CandidatePaths<N> = BTreeMap<(N, N), Vec<Vec<N>>>;

/// Load assigned to candidate path `p` of demand `d`, keyed by `(d, p)`.
pub type PathLoads<N> = BTreeMap<((N, N), usize), f64>;

/// Flow carried on each link, as `((from, to), flow)`.
pub type LinkFlows<N> = Vec<((N, N), f64)>;

/// One demand record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Demand<N> {
    /// Node the traffic enters at.
    pub source: N,
    /// Node the traffic leaves at.
    pub target: N,
    /// Traffic volume.
    #[serde(alias = "demand")]
    pub volume: f64,
}

/// Candidate paths for one demand pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathBundle<N> {
    /// First node of every path.
    pub source: N,
    /// Last node of every path.
    pub target: N,
    /// Node lists, cheapest first.
    pub paths: Vec<Vec<N>>,
}

/// Summary of one candidate path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathReport<N> {
    /// Nodes along the path.
    pub node_list: Vec<N>,
    /// Total link weight.
    pub cost: f64,
    /// Bottleneck capacity (or carried load, for decomposed flows).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
}

impl<N: NodeId> From<WeightedPath<N>> for PathReport<N> {
    fn from(path: WeightedPath<N>) -> Self {
        let (cost, capacity) = (path.cost(), path.capacity());
        Self { node_list: path.into_nodes(), cost, capacity }
    }
}

/// A path that carries traffic in a solved design.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionPathReport<N> {
    /// Nodes along the path.
    pub node_list: Vec<N>,
    /// Traffic carried by the path.
    pub load: f64,
    /// Total link weight.
    pub cost: f64,
    /// Share of the demand volume carried by the path.
    pub ratio: f64,
}

/// Total load carried by one link.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkLoad<N> {
    /// First endpoint.
    pub source: N,
    /// Second endpoint.
    pub target: N,
    /// Sum of the loads of every path using the link.
    pub load: f64,
}

/// Collects demand records into a map; a repeated pair keeps its last volume.
pub fn demands_from_records<N: NodeId>(records: Vec<Demand<N>>) -> DemandMap<N> {
    records.into_iter().map(|d| ((d.source, d.target), d.volume)).collect()
}

/// Flattens a demand map into records, ordered by pair.
pub fn demands_to_records<N: NodeId>(demands: &DemandMap<N>) -> Vec<Demand<N>> {
    demands
        .iter()
        .map(|((source, target), &volume)| Demand { source: source.clone(), target: target.clone(), volume })
        .collect()
}

/// Collects path bundles into a candidate map.
pub fn paths_from_bundles<N: NodeId>(bundles: Vec<PathBundle<N>>) -> CandidatePaths<N> {
    bundles.into_iter().map(|b| ((b.source, b.target), b.paths)).collect()
}

/// Flattens a candidate map into bundles, ordered by pair.
pub fn paths_to_bundles<N: NodeId>(paths: &CandidatePaths<N>) -> Vec<PathBundle<N>> {
    paths
        .iter()
        .map(|((source, target), paths)| PathBundle {
            source: source.clone(),
            target: target.clone(),
            paths: paths.clone(),
        })
        .collect()
}
