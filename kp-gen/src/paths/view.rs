use std::collections::{
    HashMap,
    HashSet,
};

use tracing::debug;

use super::PathError;
use crate::network::{
    Network,
    NodeId,
};

/// Read-only access to a weighted graph, as seen by the path search.
///
/// The search never mutates a view. Restrictions are expressed by layering a
/// [`RestrictedView`] over an existing view instead of copying it.
pub trait GraphView {
    /// Node identifier type.
    type Node: NodeId;

    /// Whether links only run one way.
    fn is_directed(&self) -> bool;

    /// Whether `node` is visible in this view.
    fn contains_node(&self, node: &Self::Node) -> bool;

    /// Number of visible nodes.
    fn node_count(&self) -> usize;

    /// Visible links leaving `node` (both orientations when undirected) as `(neighbour, weight)`,
    /// one entry per neighbour.
    fn links(&self, node: &Self::Node) -> Vec<(Self::Node, f64)>;

    /// Weight of the visible link `from -> to`.
    fn weight(&self, from: &Self::Node, to: &Self::Node) -> Option<f64>;

    /// Capacity of the link `from -> to`; `None` when it has none.
    fn capacity(&self, _from: &Self::Node, _to: &Self::Node) -> Option<f64> {
        None
    }

    /// Whether this view tracks link capacities at all.
    fn has_capacity(&self) -> bool {
        false
    }

    /// Finite stand-in for an unreachable label: the sum of absolute link weights plus one.
    fn infinity(&self) -> f64;

    /// Whether any link may carry a negative weight.
    fn has_negative_weights(&self) -> bool;
}

/// A [`Network`] seen through one weight attribute (and optionally one capacity attribute).
///
/// Adjacency is resolved once at construction, applying the first-inserted-link rule for parallel
/// links, so searches over the view do not touch the underlying `petgraph` storage.
#[derive(Clone, Debug)]
pub struct WeightedView<'a, N> {
    /// The network the view reads from.
    network: &'a Network<N>,
    /// Name of the capacity attribute, if capacities are tracked.
    capacity_key: Option<String>,
    /// Resolved out-links per node, in link insertion order.
    adjacency: HashMap<N, Vec<(N, f64)>>,
    /// Sentinel label for unreached nodes.
    infinity: f64,
    /// Whether some link weight is below zero.
    negative: bool,
}

impl<'a, N: NodeId> WeightedView<'a, N> {
    /// Builds a view over `network` using the `weight_key` attribute as link weight.
    ///
    /// # Errors
    ///
    /// [`PathError::MissingAttribute`] when any link lacks `weight_key`.
    pub fn new(network: &'a Network<N>, weight_key: &str) -> Result<Self, PathError> {
        let mut infinity = 0.0;
        let mut negative = false;
        for (a, b, link) in network.links() {
            let weight = link.get(weight_key).ok_or_else(|| PathError::missing_attribute(a, b, weight_key))?;
            infinity += weight.abs();
            negative |= weight < 0.0;
        }
        infinity += 1.0;

        let adjacency = network
            .nodes()
            .map(|node| {
                let links = network
                    .adjacent(node)
                    .into_iter()
                    .filter_map(|(other, link)| link.get(weight_key).map(|w| (other.clone(), w)))
                    .collect();
                (node.clone(), links)
            })
            .collect();

        debug!(nodes = network.node_count(), links = network.link_count(), infinity, weight_key, "built weighted view");
        Ok(Self { network, capacity_key: None, adjacency, infinity, negative })
    }

    /// Tracks `key` as the capacity attribute of every link.
    #[must_use]
    pub fn with_capacity(mut self, key: &str) -> Self {
        self.capacity_key = Some(key.to_owned());
        self
    }

    /// The underlying network.
    #[must_use]
    pub const fn network(&self) -> &'a Network<N> {
        self.network
    }
}

impl<N: NodeId> GraphView for WeightedView<'_, N> {
    type Node = N;

    fn is_directed(&self) -> bool {
        self.network.is_directed()
    }

    fn contains_node(&self, node: &N) -> bool {
        self.adjacency.contains_key(node)
    }

    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    fn links(&self, node: &N) -> Vec<(N, f64)> {
        self.adjacency.get(node).cloned().unwrap_or_default()
    }

    fn weight(&self, from: &N, to: &N) -> Option<f64> {
        self.adjacency.get(from)?.iter().find(|(other, _)| other == to).map(|(_, w)| *w)
    }

    fn capacity(&self, from: &N, to: &N) -> Option<f64> {
        let key = self.capacity_key.as_deref()?;
        self.network.link(from, to)?.get(key)
    }

    fn has_capacity(&self) -> bool {
        self.capacity_key.is_some()
    }

    fn infinity(&self) -> f64 {
        self.infinity
    }

    fn has_negative_weights(&self) -> bool {
        self.negative
    }
}

/// A view that hides some nodes and links of a base view.
///
/// Excluding a node hides every link touching it. On undirected bases, excluding `a -> b` also
/// hides `b -> a`.
#[derive(Debug)]
pub struct RestrictedView<'v, V: GraphView> {
    /// View being restricted.
    base: &'v V,
    /// Hidden nodes.
    excluded_nodes: HashSet<V::Node>,
    /// Hidden links, in the orientation they were excluded.
    excluded_links: HashSet<(V::Node, V::Node)>,
}

impl<'v, V: GraphView> RestrictedView<'v, V> {
    /// A restriction that hides nothing yet.
    #[must_use]
    pub fn new(base: &'v V) -> Self {
        Self { base, excluded_nodes: HashSet::new(), excluded_links: HashSet::new() }
    }

    /// Hides `node` and all its links.
    pub fn exclude_node(&mut self, node: V::Node) {
        self.excluded_nodes.insert(node);
    }

    /// Hides the link `from -> to` (and `to -> from` on undirected bases).
    pub fn exclude_link(&mut self, from: V::Node, to: V::Node) {
        self.excluded_links.insert((from, to));
    }

    /// Whether `from -> to` has been hidden explicitly.
    #[must_use]
    pub fn is_link_excluded(&self, from: &V::Node, to: &V::Node) -> bool {
        let pair = (from.clone(), to.clone());
        if self.excluded_links.contains(&pair) {
            return true;
        }
        !self.base.is_directed() && self.excluded_links.contains(&(pair.1, pair.0))
    }

    /// Whether the link is visible: neither endpoint nor the link itself is hidden.
    fn is_visible(&self, from: &V::Node, to: &V::Node) -> bool {
        !self.excluded_nodes.contains(from) && !self.excluded_nodes.contains(to) && !self.is_link_excluded(from, to)
    }
}

impl<V: GraphView> GraphView for RestrictedView<'_, V> {
    type Node = V::Node;

    fn is_directed(&self) -> bool {
        self.base.is_directed()
    }

    fn contains_node(&self, node: &V::Node) -> bool {
        self.base.contains_node(node) && !self.excluded_nodes.contains(node)
    }

    fn node_count(&self) -> usize {
        let hidden = self.excluded_nodes.iter().filter(|n| self.base.contains_node(n)).count();
        self.base.node_count() - hidden
    }

    fn links(&self, node: &V::Node) -> Vec<(V::Node, f64)> {
        if self.excluded_nodes.contains(node) {
            return Vec::new();
        }
        self.base
            .links(node)
            .into_iter()
            .filter(|(other, _)| self.is_visible(node, other))
            .collect()
    }

    fn weight(&self, from: &V::Node, to: &V::Node) -> Option<f64> {
        if !self.is_visible(from, to) {
            return None;
        }
        self.base.weight(from, to)
    }

    fn capacity(&self, from: &V::Node, to: &V::Node) -> Option<f64> {
        if !self.is_visible(from, to) {
            return None;
        }
        self.base.capacity(from, to)
    }

    fn has_capacity(&self) -> bool {
        self.base.has_capacity()
    }

    fn infinity(&self) -> f64 {
        self.base.infinity()
    }

    fn has_negative_weights(&self) -> bool {
        self.base.has_negative_weights()
    }
}
