use std::collections::{
    BTreeSet,
    HashMap,
};

use itertools::Itertools;
use tracing::{
    instrument,
    trace,
};

use super::{
    GraphView,
    PathError,
};
use crate::network::NodeId;

/// A shortest path found by [`shortest_path`].
#[derive(Clone, Debug, PartialEq)]
pub struct Path<N> {
    /// Nodes from source to destination.
    pub nodes: Vec<N>,
    /// Sum of link weights along `nodes`, as seen by the searched view.
    pub cost: f64,
}

impl<N: Clone> Path<N> {
    /// The path as consecutive `(from, to)` links.
    #[must_use]
    pub fn links(&self) -> Vec<(N, N)> {
        self.nodes.iter().cloned().tuple_windows().collect()
    }
}

/// Distance labels and predecessors for one search.
struct Labels<N> {
    /// Best known distance from the source; absent means "infinity".
    distance: HashMap<N, f64>,
    /// Node each label was reached from.
    predecessor: HashMap<N, N>,
    /// Sentinel for unreached nodes.
    infinity: f64,
}

impl<N: NodeId> Labels<N> {
    /// Fresh labels with only the source at zero.
    fn new(source: &N, infinity: f64) -> Self {
        Self {
            distance: HashMap::from([(source.clone(), 0.0)]),
            predecessor: HashMap::new(),
            infinity,
        }
    }

    /// Current label of `node`.
    fn get(&self, node: &N) -> f64 {
        self.distance.get(node).copied().unwrap_or(self.infinity)
    }

    /// Lowers the label of `node` to `value` if that is a strict improvement.
    fn improve(&mut self, node: &N, value: f64, via: &N) -> bool {
        if value >= self.get(node) {
            return false;
        }
        self.distance.insert(node.clone(), value);
        self.predecessor.insert(node.clone(), via.clone());
        true
    }

    /// Active node with the smallest label; ties go to the smallest node.
    fn select_min(&self, active: &BTreeSet<N>) -> Option<N> {
        let mut best: Option<(&N, f64)> = None;
        for node in active {
            let label = self.get(node);
            if label < best.map_or(self.infinity, |(_, l)| l) {
                best = Some((node, label));
            }
        }
        best.map(|(node, _)| node.clone())
    }
}

/// Shortest path from `source` to `dest` over `view`, tolerating negative link weights as long
/// as no negative cycle is reachable from `source`.
///
/// This is a label-correcting search: nodes are picked by smallest label with a linear scan over
/// the active set, and a node whose label improves is put back into the active set even after it
/// was picked. On views without negative links the search stops as soon as `dest` is picked;
/// otherwise it runs until no label can improve.
///
/// # Errors
///
/// - [`PathError::InvalidEndpoints`] if `source == dest` or either is not in the view.
/// - [`PathError::NoPathFound`] if `dest` is unreachable.
/// - [`PathError::InconsistentGraph`] if a negative cycle is detected or predecessors do not lead
///   back to `source` within `|V|` steps.
#[instrument(level = "trace", skip(view), fields(nodes = view.node_count()))]
pub fn shortest_path<V: GraphView>(view: &V, source: &V::Node, dest: &V::Node) -> Result<Path<V::Node>, PathError> {
    if source == dest || !view.contains_node(source) || !view.contains_node(dest) {
        return Err(PathError::invalid_endpoints(source, dest));
    }

    let infinity = view.infinity();
    let mut labels = Labels::new(source, infinity);
    let mut active = BTreeSet::new();

    for (neighbor, weight) in view.links(source) {
        if labels.improve(&neighbor, weight, source) {
            active.insert(neighbor);
        }
    }

    // Without negative links a picked label is final, so the search may stop at `dest`.
    let stop_at_dest = !view.has_negative_weights();
    while let Some(current) = labels.select_min(&active) {
        active.remove(&current);
        if stop_at_dest && current == *dest {
            break;
        }

        let base = labels.get(&current);
        for (neighbor, weight) in view.links(&current) {
            let candidate = base + weight;
            if !labels.improve(&neighbor, candidate, &current) {
                continue;
            }
            // No walk without a negative cycle can cost less than -(sum of |w|).
            if candidate < -infinity {
                return Err(PathError::inconsistent(source, dest, "label dropped below -infinity"));
            }
            trace!(?neighbor, label = candidate, "label improved");
            active.insert(neighbor);
        }
    }

    if labels.get(dest) >= infinity {
        return Err(PathError::no_path(source, dest));
    }

    let nodes = reconstruct(&labels.predecessor, source, dest, view.node_count())?;
    Ok(Path { nodes, cost: labels.get(dest) })
}

/// Walks predecessors back from `dest` to `source`, giving up after `limit` nodes.
pub(super) fn reconstruct<N: NodeId>(
    predecessor: &HashMap<N, N>,
    source: &N,
    dest: &N,
    limit: usize,
) -> Result<Vec<N>, PathError> {
    let mut nodes = vec![dest.clone()];
    let mut current = dest;
    while current != source {
        if nodes.len() > limit {
            return Err(PathError::inconsistent(source, dest, "predecessor chain longer than the node count"));
        }
        let prev = predecessor
            .get(current)
            .ok_or_else(|| PathError::inconsistent(source, dest, "predecessor chain is broken"))?;
        nodes.push(prev.clone());
        current = prev;
    }
    nodes.reverse();
    Ok(nodes)
}
