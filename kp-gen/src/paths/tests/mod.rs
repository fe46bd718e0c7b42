use rstest::*;

use super::*;
use crate::network::{
    Link,
    Network,
    NetworkFile,
    DEFAULT_CAPACITY_KEY,
    DEFAULT_WEIGHT_KEY,
};

mod dijkstra_test;

/// Builds a network from `(a, b, weight)` triples.
pub fn network_of(directed: bool, links: &[(&'static str, &'static str, f64)]) -> Network<&'static str> {
    let mut network = Network::new(directed);
    for &(a, b, weight) in links {
        network.add_link(a, b, Link::weighted(weight));
    }
    network
}

/// Collects every path an engine produces, panicking on errors.
pub fn drain<V: GraphView>(engine: YenEngine<V>) -> Vec<(Vec<V::Node>, f64)> {
    engine
        .map(|res| res.map(|p| (p.nodes().to_vec(), p.cost())))
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[fixture]
pub fn diamond() -> Network<&'static str> {
    network_of(false, &[("A", "B", 1.0), ("A", "C", 5.0), ("B", "C", 1.0), ("B", "D", 4.0), ("C", "D", 1.0)])
}

#[fixture]
pub fn diamond_with_capacity() -> Network<&'static str> {
    let mut network = Network::undirected();
    for (a, b, weight, capacity) in [("A", "B", 1.0, 10.0), ("A", "C", 5.0, 2.0), ("B", "C", 1.0, 4.0), ("B", "D", 4.0, 8.0)] {
        network.add_link(a, b, Link::weighted(weight).with(DEFAULT_CAPACITY_KEY, capacity));
    }
    network.add_link("C", "D", Link::weighted(1.0));
    network
}

#[fixture]
pub fn two_way() -> Network<&'static str> {
    network_of(
        true,
        &[("1", "2", 1.0), ("1", "3", 2.0), ("2", "3", 1.0), ("3", "2", 1.0), ("2", "4", 3.0), ("3", "4", 1.0)],
    )
}

#[fixture]
pub fn negative_dag() -> Network<&'static str> {
    network_of(true, &[("S", "A", 2.0), ("S", "B", 5.0), ("B", "A", -4.0), ("A", "T", 1.0), ("B", "T", 1.0)])
}

/// Complete undirected graph on five nodes with uneven weights.
#[fixture]
pub fn k5() -> Network<&'static str> {
    let names = ["a", "b", "c", "d", "e"];
    let mut network = Network::undirected();
    for (i, a) in names.iter().enumerate() {
        for (j, b) in names.iter().enumerate().skip(i + 1) {
            #[allow(clippy::cast_precision_loss)]
            let weight = ((i * 7 + j * 3) % 5 + 1) as f64;
            network.add_link(*a, *b, Link::weighted(weight));
        }
    }
    network
}
