use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use itertools::Itertools;
use ordered_float::OrderedFloat;

use super::{
    GraphView,
    PathError,
};
use crate::network::NodeId;

/// One loopless path handed out by the [`YenEngine`](super::YenEngine), with the bookkeeping
/// needed to deviate from it later.
///
/// Paths order by cost, then lexicographically by node sequence, so equal-cost candidates always
/// come out of the engine in the same order.
#[derive(Clone, Debug)]
pub struct WeightedPath<N> {
    /// Nodes from source to destination.
    nodes: Vec<N>,
    /// Sum of link weights in the unrestricted graph.
    cost: OrderedFloat<f64>,
    /// Smallest link capacity along the path, when capacities are tracked.
    capacity: Option<f64>,
    /// Node at which this path left its parent path.
    deflection_node: N,
    /// Links that were excluded to produce this path; inherited by paths deviating from it.
    deleted_links: BTreeSet<(N, N)>,
}

impl<N: NodeId> WeightedPath<N> {
    /// Prices `nodes` against `view` and wraps them.
    ///
    /// Capacity is the minimum capacity over the path's links when the view tracks capacities;
    /// links without a capacity do not constrain it.
    ///
    /// # Errors
    ///
    /// [`PathError::MissingEdge`] when two consecutive nodes are not linked in `view`.
    pub fn new<V: GraphView<Node = N>>(
        nodes: Vec<N>,
        view: &V,
        deflection_node: N,
        deleted_links: BTreeSet<(N, N)>,
    ) -> Result<Self, PathError> {
        let mut cost = 0.0;
        let mut capacity = f64::INFINITY;
        for (from, to) in nodes.iter().tuple_windows() {
            cost += view.weight(from, to).ok_or_else(|| PathError::missing_edge(from, to))?;
            if let Some(link_capacity) = view.capacity(from, to) {
                capacity = capacity.min(link_capacity);
            }
        }

        Ok(Self {
            nodes,
            cost: OrderedFloat(cost),
            capacity: view.has_capacity().then_some(capacity),
            deflection_node,
            deleted_links,
        })
    }

    /// Nodes from source to destination.
    #[must_use]
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    /// Consumes the path, keeping only its nodes.
    #[must_use]
    pub fn into_nodes(self) -> Vec<N> {
        self.nodes
    }

    /// Total link weight.
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.cost.into_inner()
    }

    /// Bottleneck capacity, if capacities are tracked.
    #[must_use]
    pub const fn capacity(&self) -> Option<f64> {
        self.capacity
    }

    /// Node at which this path deviates from the path it was derived from; the source for the
    /// first path.
    #[must_use]
    pub const fn deflection_node(&self) -> &N {
        &self.deflection_node
    }

    /// Links excluded while producing this path.
    #[must_use]
    pub const fn deleted_links(&self) -> &BTreeSet<(N, N)> {
        &self.deleted_links
    }

    /// Number of links on the path.
    #[must_use]
    pub fn hop_count(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// The path as consecutive `(from, to)` links.
    #[must_use]
    pub fn links(&self) -> Vec<(N, N)> {
        self.nodes.iter().cloned().tuple_windows().collect()
    }
}

impl<N: Ord> PartialEq for WeightedPath<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N: Ord> Eq for WeightedPath<N> {}

impl<N: Ord> Ord for WeightedPath<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost.cmp(&other.cost).then_with(|| self.nodes.cmp(&other.nodes))
    }
}

impl<N: Ord> PartialOrd for WeightedPath<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N: fmt::Debug> fmt::Display for WeightedPath<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = self.nodes.iter().map(|n| format!("{n:?}")).join(" -> ");
        write!(f, "{nodes} (cost {})", self.cost)?;
        if let Some(capacity) = self.capacity {
            write!(f, " (capacity {capacity})")?;
        }
        Ok(())
    }
}
