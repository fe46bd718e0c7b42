//! Caller-owned network model: nodes, links and their named numeric attributes.
//!
//! The network is stored in a [`petgraph::Graph`] whose storage is always directed; undirected
//! networks are handled by reading both edge directions. When several links join the same node
//! pair, the first one inserted is the one every lookup returns.

use std::collections::{
    BTreeMap,
    HashMap,
    HashSet,
};
use std::fmt::Debug;
use std::hash::Hash;

use petgraph::graph::{
    EdgeIndex,
    NodeIndex,
};
use petgraph::visit::EdgeRef;
use petgraph::{
    Directed,
    Direction,
    Graph,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Attribute used for link weights unless told otherwise.
pub const DEFAULT_WEIGHT_KEY: &str = "weight";
/// Attribute used for link capacities unless told otherwise.
pub const DEFAULT_CAPACITY_KEY: &str = "capacity";

/// Bounds every node identifier has to satisfy: comparable, hashable and printable.
pub trait NodeId: Clone + Eq + Hash + Ord + Debug {}

impl<T: Clone + Eq + Hash + Ord + Debug> NodeId for T {}

/// Named numeric attributes attached to one link (`weight`, `capacity`, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Attribute values keyed by name.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, f64>,
}

impl Link {
    /// A link without attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A link carrying only a `weight` attribute.
    #[must_use]
    pub fn weighted(weight: f64) -> Self {
        Self::new().with(DEFAULT_WEIGHT_KEY, weight)
    }

    /// Returns the link with `key` set to `value`.
    #[must_use]
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.set(key, value);
        self
    }

    /// Reads an attribute.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.attributes.get(key).copied()
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set(&mut self, key: &str, value: f64) {
        self.attributes.insert(key.to_owned(), value);
    }
}

/// A directed or undirected network over node identifiers of type `N`.
#[derive(Clone, Debug)]
pub struct Network<N> {
    /// Link storage; undirected links are stored once, in insertion orientation.
    graph: Graph<N, Link, Directed>,
    /// Reverse lookup from node identifier to graph index.
    node_to_index: HashMap<N, NodeIndex>,
    /// Whether links only run from their first to their second endpoint.
    directed: bool,
}

impl<N: NodeId> Network<N> {
    /// Creates an empty network.
    #[must_use]
    pub fn new(directed: bool) -> Self {
        Self { graph: Graph::new(), node_to_index: HashMap::new(), directed }
    }

    /// Creates an empty directed network.
    #[must_use]
    pub fn directed() -> Self {
        Self::new(true)
    }

    /// Creates an empty undirected network.
    #[must_use]
    pub fn undirected() -> Self {
        Self::new(false)
    }

    /// Whether links only run from their first to their second endpoint.
    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.directed
    }

    /// Adds `node` if it is not present yet.
    pub fn add_node(&mut self, node: N) {
        self.index_or_insert(node);
    }

    /// Adds a link between `a` and `b`, adding either endpoint if needed.
    ///
    /// Parallel links are kept; lookups resolve to the earliest one.
    pub fn add_link(&mut self, a: N, b: N, link: Link) {
        let a_idx = self.index_or_insert(a);
        let b_idx = self.index_or_insert(b);
        self.graph.add_edge(a_idx, b_idx, link);
    }

    /// Whether `node` is part of the network.
    #[must_use]
    pub fn contains_node(&self, node: &N) -> bool {
        self.node_to_index.contains_key(node)
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of links, parallel links included.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.graph.node_weights()
    }

    /// All links in insertion order as `(a, b, attributes)`.
    pub fn links(&self) -> impl Iterator<Item = (&N, &N, &Link)> {
        self.graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()], e.weight()))
    }

    /// Mutable access to the attributes of every link.
    pub fn links_mut(&mut self) -> impl Iterator<Item = &mut Link> {
        self.graph.edge_weights_mut()
    }

    /// The link from `a` to `b` (either orientation if undirected); the earliest one wins when
    /// several exist.
    #[must_use]
    pub fn link(&self, a: &N, b: &N) -> Option<&Link> {
        self.find_link(a, b).map(|idx| &self.graph[idx])
    }

    /// Mutable version of [`Network::link`].
    pub fn link_mut(&mut self, a: &N, b: &N) -> Option<&mut Link> {
        self.find_link(a, b).and_then(|idx| self.graph.edge_weight_mut(idx))
    }

    /// Nodes reachable from `node` over one link, each paired with the link used to reach it.
    ///
    /// Undirected networks report links in both orientations. Each neighbour appears once, with
    /// the earliest link to it, and neighbours are ordered by that link's insertion order.
    #[must_use]
    pub fn adjacent(&self, node: &N) -> Vec<(&N, &Link)> {
        let Some(&idx) = self.node_to_index.get(node) else {
            return Vec::new();
        };

        let mut edges: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
            .collect();
        if !self.directed {
            edges.extend(self.graph.edges_directed(idx, Direction::Incoming).map(|e| (e.id(), e.source())));
        }
        edges.sort_unstable_by_key(|(id, _)| *id);

        let mut seen = HashSet::new();
        edges
            .into_iter()
            .filter(|(_, other)| seen.insert(*other))
            .map(|(id, other)| (&self.graph[other], &self.graph[id]))
            .collect()
    }

    /// Index of `node`, inserting it first if necessary.
    fn index_or_insert(&mut self, node: N) -> NodeIndex {
        if let Some(&idx) = self.node_to_index.get(&node) {
            return idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.node_to_index.insert(node, idx);
        idx
    }

    /// Earliest edge joining `a` and `b` under the network's directedness.
    fn find_link(&self, a: &N, b: &N) -> Option<EdgeIndex> {
        let a_idx = *self.node_to_index.get(a)?;
        let b_idx = *self.node_to_index.get(b)?;

        let forward = self.graph.edges_connecting(a_idx, b_idx).map(|e| e.id());
        if self.directed {
            return forward.min();
        }
        let backward = self.graph.edges_connecting(b_idx, a_idx).map(|e| e.id());
        forward.chain(backward).min()
    }
}

/// One link as it appears in a network file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord<N> {
    /// First endpoint.
    pub source: N,
    /// Second endpoint.
    pub target: N,
    /// Numeric attributes, stored inline next to the endpoints.
    #[serde(flatten)]
    pub link: Link,
}

/// On-disk form of a [`Network`]: `{"directed": .., "nodes": [..], "links": [..]}`.
///
/// Nodes that only appear as link endpoints may be left out of `nodes`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkFile<N> {
    /// Whether links are one-way.
    #[serde(default)]
    pub directed: bool,
    /// Node identifiers, including isolated nodes.
    #[serde(default = "Vec::new")]
    pub nodes: Vec<N>,
    /// Links with their attributes.
    #[serde(default = "Vec::new")]
    pub links: Vec<LinkRecord<N>>,
}

impl<N: NodeId> From<NetworkFile<N>> for Network<N> {
    fn from(file: NetworkFile<N>) -> Self {
        let mut network = Self::new(file.directed);
        for node in file.nodes {
            network.add_node(node);
        }
        for LinkRecord { source, target, link } in file.links {
            network.add_link(source, target, link);
        }
        network
    }
}

impl<N: NodeId> From<&Network<N>> for NetworkFile<N> {
    fn from(network: &Network<N>) -> Self {
        Self {
            directed: network.directed,
            nodes: network.nodes().cloned().collect(),
            links: network
                .links()
                .map(|(a, b, link)| LinkRecord { source: a.clone(), target: b.clone(), link: link.clone() })
                .collect(),
        }
    }
}
