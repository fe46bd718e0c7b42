//! Reading node-link design solutions back as paths.
//!
//! A node-link formulation assigns every demand a flow value per link instead of a choice among
//! candidate paths. [`decompose_flow`] turns one such flow into loaded simple paths by repeatedly
//! peeling off a source-to-sink path and subtracting its bottleneck flow from every link on it.

use std::collections::{
    BTreeMap,
    HashMap,
};

use anyhow::Result;
use itertools::Itertools;
use kp_core::errors::{
    bail,
    ensure,
    Context,
};
use petgraph::algo::astar;
use petgraph::graphmap::DiGraphMap;
use tracing::{
    debug,
    instrument,
};

use crate::design::path_cost;
use crate::model::{
    DemandMap,
    LinkFlows,
    PathReport,
};
use crate::network::{
    Network,
    NodeId,
};

/// Flow per demand and link, keyed by `((from, to), (source, target))`.
pub type DemandLinkFlows<N> = BTreeMap<((N, N), (N, N)), f64>;

/// One path carved out of a demand's flow.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowPath<N> {
    /// Nodes from the demand source to its target.
    pub nodes: Vec<N>,
    /// Flow routed along the path.
    pub load: f64,
}

/// Relative tolerance for comparing flow values.
const FLOW_EPSILON: f64 = 1000.0 * f64::EPSILON;

/// The links carrying non-negligible flow for every demand, in `links` order.
///
/// Flow counts as zero below `f64::EPSILON`, scaled by the demand volume unless `no_splitting` is
/// set (in which case flows are expected to be 0/1 indicators).
pub fn demand_links<N: NodeId>(
    demands: &DemandMap<N>,
    links: &[(N, N)],
    flows: &DemandLinkFlows<N>,
    no_splitting: bool,
) -> BTreeMap<(N, N), LinkFlows<N>> {
    demands
        .iter()
        .map(|(demand, &volume)| {
            let zero = if no_splitting { f64::EPSILON } else { f64::EPSILON * volume };
            let used = links
                .iter()
                .filter_map(|link| {
                    let flow = flows.get(&(link.clone(), demand.clone())).copied()?;
                    (flow > zero).then(|| (link.clone(), flow))
                })
                .collect();
            (demand.clone(), used)
        })
        .collect()
}

/// Realises the flow of `demand` as simple paths whose loads add up to the demand's volume.
///
/// Paths are peeled off fewest-hops first. Flow left over once the target is unreachable can only
/// circulate and is dropped.
///
/// # Errors
///
/// Fails when a link carries negative flow, or when the flow does not leave the source and enter
/// the target in equal amounts with conservation at every other node.
#[instrument(skip(flows), fields(links = flows.len()))]
pub fn decompose_flow<N: NodeId>(demand: &(N, N), flows: &[((N, N), f64)]) -> Result<Vec<FlowPath<N>>> {
    let (source, target) = demand;
    let mut remaining: BTreeMap<(N, N), f64> = BTreeMap::new();
    for ((a, b), flow) in flows {
        ensure!(*flow >= 0.0, "negative flow {flow} on link {a:?} -> {b:?}");
        *remaining.entry((a.clone(), b.clone())).or_default() += flow;
    }
    if remaining.is_empty() {
        return Ok(Vec::new());
    }
    check_divergence(source, target, &remaining)?;

    let nodes: Vec<N> = remaining.keys().flat_map(|(a, b)| [a.clone(), b.clone()]).unique().collect();
    let index: HashMap<&N, usize> = nodes.iter().enumerate().map(|(i, n)| (n, i)).collect();
    let (Some(&s), Some(&t)) = (index.get(source), index.get(target)) else {
        bail!("flow for {source:?} -> {target:?} does not touch both endpoints");
    };

    let mut paths = Vec::new();
    loop {
        let graph: DiGraphMap<usize, ()> = remaining.keys().map(|(a, b)| (index[a], index[b])).collect();
        let Some((_, hops)) = astar(&graph, s, |n| n == t, |_| 1_u32, |_| 0) else {
            break;
        };

        let links: Vec<(N, N)> = hops.iter().tuple_windows().map(|(&a, &b)| (nodes[a].clone(), nodes[b].clone())).collect();
        let load = links.iter().map(|link| remaining[link]).fold(f64::INFINITY, f64::min);
        for link in &links {
            let flow = remaining[link];
            if (flow - load).abs() <= 10.0 * FLOW_EPSILON * (flow + load) {
                remaining.remove(link);
            } else if let Some(value) = remaining.get_mut(link) {
                *value -= load;
            }
        }

        let path: Vec<N> = hops.into_iter().map(|i| nodes[i].clone()).collect();
        debug!(?path, load, "peeled path from flow");
        paths.push(FlowPath { nodes: path, load });
    }

    if !remaining.is_empty() {
        debug!(links = remaining.len(), "dropping circulating flow");
    }
    Ok(paths)
}

/// Checks that `source` emits what `target` absorbs and every other node conserves flow.
fn check_divergence<N: NodeId>(source: &N, target: &N, flows: &BTreeMap<(N, N), f64>) -> Result<()> {
    let mut divergence: HashMap<&N, f64> = HashMap::new();
    for ((a, b), flow) in flows {
        *divergence.entry(a).or_default() += flow;
        *divergence.entry(b).or_default() -= flow;
    }

    let out = divergence.get(source).copied().unwrap_or_default();
    let zero = FLOW_EPSILON * out.abs();
    ensure!(out > 0.0, "no flow leaves {source:?}");
    let balance = out + divergence.get(target).copied().unwrap_or_default();
    ensure!(balance.abs() <= zero, "source and sink flows of {source:?} -> {target:?} differ by {balance}");

    for (node, div) in divergence {
        if node != source && node != target && div.abs() > zero {
            bail!("flow is not conserved at {node:?} (divergence {div})");
        }
    }
    Ok(())
}

/// Decomposes every demand's link flow and reports each path with its cost and, as capacity,
/// the load it carries.
///
/// # Errors
///
/// Fails when a flow cannot be decomposed or a resulting path cannot be priced.
pub fn flow_path_reports<N: NodeId>(
    network: &Network<N>,
    demand_flows: &BTreeMap<(N, N), LinkFlows<N>>,
    weight_key: &str,
) -> Result<Vec<PathReport<N>>> {
    let mut reports = Vec::new();
    for (demand, flows) in demand_flows {
        for FlowPath { nodes, load } in
            decompose_flow(demand, flows).with_context(|| format!("decomposing flow of demand {demand:?}"))?
        {
            let cost = path_cost(network, &nodes, weight_key)?;
            reports.push(PathReport { node_list: nodes, cost, capacity: Some(load) });
        }
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use assertables::*;
    use rstest::*;

    use super::*;
    use crate::network::{
        Link,
        DEFAULT_WEIGHT_KEY,
    };

    fn flow(links: &[(&'static str, &'static str, f64)]) -> LinkFlows<&'static str> {
        links.iter().map(|&(a, b, f)| ((a, b), f)).collect()
    }

    #[rstest]
    fn test_decompose_split_flow() {
        // 10 units from S to T: 6 over A, 4 over B, with 1 unit crossing from A to B.
        let flows = flow(&[("S", "A", 6.0), ("S", "B", 4.0), ("A", "T", 5.0), ("A", "B", 1.0), ("B", "T", 5.0)]);
        let mut paths = decompose_flow(&("S", "T"), &flows).unwrap();
        paths.sort_by(|a, b| a.nodes.cmp(&b.nodes));

        let total: f64 = paths.iter().map(|p| p.load).sum();
        assert_lt!((total - 10.0).abs(), 1e-9);
        assert_eq!(paths, vec![
            FlowPath { nodes: vec!["S", "A", "B", "T"], load: 1.0 },
            FlowPath { nodes: vec!["S", "A", "T"], load: 5.0 },
            FlowPath { nodes: vec!["S", "B", "T"], load: 4.0 },
        ]);
    }

    #[rstest]
    fn test_decompose_drops_circulation() {
        let flows = flow(&[("S", "T", 2.0), ("X", "Y", 1.0), ("Y", "X", 1.0)]);
        let paths = decompose_flow(&("S", "T"), &flows).unwrap();
        assert_eq!(paths, vec![FlowPath { nodes: vec!["S", "T"], load: 2.0 }]);
    }

    #[rstest]
    #[case::leaky(&[("S", "A", 3.0), ("A", "T", 2.0)])]
    #[case::wrong_sink(&[("S", "A", 3.0), ("A", "Q", 3.0)])]
    #[case::negative(&[("S", "T", -1.0)])]
    fn test_decompose_rejects_bad_flow(#[case] links: &[(&'static str, &'static str, f64)]) {
        assert!(decompose_flow(&("S", "T"), &flow(links)).is_err());
    }

    #[rstest]
    fn test_decompose_empty_flow() {
        assert!(decompose_flow(&("S", "T"), &[]).unwrap().is_empty());
    }

    #[rstest]
    fn test_demand_links_threshold() {
        let demands = DemandMap::from([(("S", "T"), 1e6), (("A", "T"), 1.0)]);
        let links = vec![("S", "A"), ("A", "T"), ("S", "T")];
        let flows = DemandLinkFlows::from([
            ((("S", "A"), ("S", "T")), 1e6),
            ((("A", "T"), ("S", "T")), 1e6),
            ((("S", "T"), ("S", "T")), 1e-12),
            ((("A", "T"), ("A", "T")), 1.0),
        ]);

        let used = demand_links(&demands, &links, &flows, false);
        assert_eq!(used[&("S", "T")], vec![(("S", "A"), 1e6), (("A", "T"), 1e6)]);
        assert_eq!(used[&("A", "T")], vec![(("A", "T"), 1.0)]);

        let strict = demand_links(&demands, &links, &flows, true);
        assert_eq!(strict[&("S", "T")].len(), 3);
    }

    #[rstest]
    fn test_flow_path_reports() {
        let mut network = Network::directed();
        network.add_link("S", "A", Link::weighted(1.0));
        network.add_link("A", "T", Link::weighted(2.0));
        network.add_link("S", "T", Link::weighted(5.0));

        let demand_flows = BTreeMap::from([(("S", "T"), flow(&[("S", "A", 3.0), ("A", "T", 3.0), ("S", "T", 1.0)]))]);
        let reports = flow_path_reports(&network, &demand_flows, DEFAULT_WEIGHT_KEY).unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!((reports[0].node_list.clone(), reports[0].cost, reports[0].capacity), (vec!["S", "T"], 5.0, Some(1.0)));
        assert_eq!((reports[1].node_list.clone(), reports[1].cost, reports[1].capacity), (vec!["S", "A", "T"], 3.0, Some(3.0)));
    }
}
