//! Helpers for setting up and reading back network design problems: pricing paths, generating
//! random capacities and demands, building candidate path sets and summarising solved designs.

use anyhow::Result;
use itertools::Itertools;
use kp_core::errors::{
    anyhow,
    ensure,
    Context,
    EmptyResult,
};
use rand::distributions::Distribution;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_distr::Uniform;
use tracing::{
    debug,
    info,
    instrument,
    warn,
};

use crate::model::{
    CandidatePaths,
    DemandMap,
    LinkLoad,
    PathLoads,
    PathReport,
    SolutionPathReport,
};
use crate::network::{
    Link,
    Network,
    NodeId,
};
use crate::paths::{
    PathError,
    SearchLimits,
    YenEngine,
};

/// A solution path is reported only when it carries more than this share of its demand.
pub const SOLUTION_LOAD_THRESHOLD: f64 = 0.001;

/// Settings for [`random_demands`].
#[derive(Clone, Debug, PartialEq)]
pub struct DemandConfig {
    /// Number of demand pairs wanted; capped at the number of distinct pairs available.
    pub pairs: usize,
    /// Smallest volume (inclusive).
    pub low: f64,
    /// Largest volume (exclusive).
    pub high: f64,
    /// Whether `(a, b)` and `(b, a)` count as different pairs.
    pub directed: bool,
}

/// Looks up the link joining `a` and `b` or fails with a message naming both.
fn hop<'a, N: NodeId>(network: &'a Network<N>, a: &N, b: &N) -> Result<&'a Link> {
    network.link(a, b).ok_or_else(|| anyhow!("bad path: no link {a:?} -> {b:?}"))
}

/// Sum of the `key` attribute along `path`.
///
/// # Errors
///
/// Fails when two consecutive nodes are not linked or a link lacks `key`.
pub fn path_cost<N: NodeId>(network: &Network<N>, path: &[N], key: &str) -> Result<f64> {
    path.iter().tuple_windows().try_fold(0.0, |cost, (a, b)| {
        let value = hop(network, a, b)?.get(key).ok_or_else(|| anyhow!("link {a:?} -> {b:?} has no {key}"))?;
        Ok(cost + value)
    })
}

/// Smallest `key` attribute along `path`; infinite for a single-node path.
///
/// # Errors
///
/// Fails when two consecutive nodes are not linked or a link lacks `key`.
pub fn path_capacity<N: NodeId>(network: &Network<N>, path: &[N], key: &str) -> Result<f64> {
    path.iter().tuple_windows().try_fold(f64::INFINITY, |capacity, (a, b)| {
        let value = hop(network, a, b)?.get(key).ok_or_else(|| anyhow!("link {a:?} -> {b:?} has no {key}"))?;
        Ok(capacity.min(value))
    })
}

/// Whether every consecutive pair of `path` is linked in `network`.
pub fn path_valid<N: NodeId>(network: &Network<N>, path: &[N]) -> bool {
    path.iter().tuple_windows().all(|(a, b)| network.link(a, b).is_some())
}

/// Whether `path` traverses the link `(a, b)` in either orientation.
pub fn link_in_path<N: PartialEq>((a, b): (&N, &N), path: &[N]) -> bool {
    path.iter().tuple_windows().any(|(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// Overwrites the `key` attribute of every link with a random integer in `[min, max)`.
///
/// # Errors
///
/// Fails when the range is empty.
#[instrument(skip(network, rng), fields(links = network.link_count()))]
pub fn randomize_capacity<N: NodeId, R: Rng + ?Sized>(
    network: &mut Network<N>,
    min: u32,
    max: u32,
    key: &str,
    rng: &mut R,
) -> EmptyResult {
    ensure!(min < max, "capacity range [{min}, {max}) is empty");
    for link in network.links_mut() {
        link.set(key, f64::from(rng.gen_range(min..max)));
    }
    Ok(())
}

/// Draws random demand pairs between distinct nodes with volumes uniform in `[low, high)`.
///
/// Undirected configurations never produce both `(a, b)` and `(b, a)`.
///
/// # Errors
///
/// Fails when the volume range is empty or not finite.
#[instrument(skip(nodes, rng), fields(nodes = nodes.len()))]
pub fn random_demands<N: NodeId, R: Rng + ?Sized>(
    nodes: &[N],
    config: &DemandConfig,
    rng: &mut R,
) -> Result<DemandMap<N>> {
    ensure!(
        config.low.is_finite() && config.high.is_finite() && config.low < config.high,
        "volume range [{}, {}) is empty",
        config.low,
        config.high
    );
    let volume = Uniform::new(config.low, config.high);

    let nodes: Vec<&N> = nodes.iter().unique().collect();
    let n = nodes.len();
    let available = if config.directed { n * n.saturating_sub(1) } else { n * n.saturating_sub(1) / 2 };
    let wanted = config.pairs.min(available);
    if wanted < config.pairs {
        warn!(wanted = config.pairs, available, "not enough node pairs, generating fewer demands");
    }

    let mut demands = DemandMap::new();
    while demands.len() < wanted {
        let (Some(&a), Some(&b)) = (nodes.choose(rng), nodes.choose(rng)) else {
            break;
        };
        if a == b {
            continue;
        }
        let pair = (a.clone(), b.clone());
        if demands.contains_key(&pair) || (!config.directed && demands.contains_key(&(b.clone(), a.clone()))) {
            continue;
        }
        demands.insert(pair, volume.sample(rng));
    }

    debug!(demands = demands.len(), "generated random demands");
    Ok(demands)
}

/// Up to `k` shortest loopless paths for every demand pair, weighted by `weight_key`.
///
/// A demand whose endpoints are disconnected gets an empty path list.
///
/// # Errors
///
/// Fails when a demand names an unknown node or the same node twice, when a link lacks
/// `weight_key`, or when the graph is inconsistent.
#[instrument(skip(network, demands), fields(demands = demands.len()))]
pub fn candidate_paths<N: NodeId>(
    network: &Network<N>,
    demands: &DemandMap<N>,
    k: usize,
    weight_key: &str,
) -> Result<CandidatePaths<N>> {
    let mut candidates = CandidatePaths::new();
    for (a, b) in demands.keys() {
        let engine = YenEngine::new(network, a.clone(), b.clone(), weight_key, None)
            .with_context(|| format!("demand {a:?} -> {b:?}"))?
            .with_limits(SearchLimits::max_paths(k));

        let mut found = Vec::new();
        for result in engine {
            match result {
                Ok(path) => found.push(path.into_nodes()),
                Err(PathError::NoPathFound { .. }) => {
                    warn!(source = ?a, target = ?b, "demand endpoints are disconnected, no candidates");
                    break;
                },
                Err(err) => return Err(err).with_context(|| format!("searching paths for demand {a:?} -> {b:?}")),
            }
        }
        debug!(source = ?a, target = ?b, paths = found.len(), "generated candidate paths");
        candidates.insert((a.clone(), b.clone()), found);
    }

    info!(demands = candidates.len(), paths = candidates.values().map(Vec::len).sum::<usize>(), "candidate paths ready");
    Ok(candidates)
}

/// Cost (and, with `capacity_key`, bottleneck capacity) of every candidate path.
///
/// # Errors
///
/// Fails when a path is not valid in `network` or a link lacks one of the attributes.
pub fn path_reports<N: NodeId>(
    network: &Network<N>,
    paths: &CandidatePaths<N>,
    weight_key: &str,
    capacity_key: Option<&str>,
) -> Result<Vec<PathReport<N>>> {
    paths
        .values()
        .flatten()
        .map(|path| -> Result<PathReport<N>> {
            Ok(PathReport {
                node_list: path.clone(),
                cost: path_cost(network, path, weight_key)?,
                capacity: capacity_key.map(|key| path_capacity(network, path, key)).transpose()?,
            })
        })
        .collect()
}

/// The candidate paths that carry traffic in a solved link-path design.
///
/// A path is kept when its load exceeds [`SOLUTION_LOAD_THRESHOLD`] times its demand volume.
///
/// # Errors
///
/// Fails when a load refers to an unknown demand or path index, or a path cannot be priced.
pub fn solution_path_reports<N: NodeId>(
    network: &Network<N>,
    paths: &CandidatePaths<N>,
    loads: &PathLoads<N>,
    demands: &DemandMap<N>,
    weight_key: &str,
) -> Result<Vec<SolutionPathReport<N>>> {
    let mut reports = Vec::new();
    for ((pair, index), &load) in loads {
        let volume = *demands.get(pair).with_context(|| format!("load for unknown demand {pair:?}"))?;
        if load <= SOLUTION_LOAD_THRESHOLD * volume {
            continue;
        }
        let path = paths
            .get(pair)
            .and_then(|p| p.get(*index))
            .with_context(|| format!("demand {pair:?} has no candidate path {index}"))?;
        reports.push(SolutionPathReport {
            node_list: path.clone(),
            load,
            cost: path_cost(network, path, weight_key)?,
            ratio: load / volume,
        });
    }
    Ok(reports)
}

/// Total load on every link of `network`, summed over the candidate paths that use it in either
/// orientation. Paths without an entry in `loads` carry nothing.
pub fn link_utilization<N: NodeId>(
    network: &Network<N>,
    paths: &CandidatePaths<N>,
    loads: &PathLoads<N>,
) -> Vec<LinkLoad<N>> {
    network
        .links()
        .map(|(a, b, _)| {
            let load = paths
                .iter()
                .flat_map(|(pair, paths)| paths.iter().enumerate().map(move |(index, path)| (pair, index, path)))
                .filter(|(_, _, path)| link_in_path((a, b), path))
                .map(|(pair, index, _)| loads.get(&(pair.clone(), index)).copied().unwrap_or(0.0))
                .sum();
            LinkLoad { source: a.clone(), target: b.clone(), load }
        })
        .collect()
}
