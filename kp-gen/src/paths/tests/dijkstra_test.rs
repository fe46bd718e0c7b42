use std::collections::HashMap;

use super::*;
use crate::paths::dijkstra::reconstruct;

#[rstest]
fn test_shortest_path_diamond(diamond: Network<&'static str>) {
    let view = WeightedView::new(&diamond, DEFAULT_WEIGHT_KEY).unwrap();
    let path = shortest_path(&view, &"A", &"D").unwrap();
    assert_eq!(path.nodes, vec!["A", "B", "C", "D"]);
    assert_eq!(path.cost, 3.0);
    assert_eq!(path.links(), vec![("A", "B"), ("B", "C"), ("C", "D")]);
}

#[rstest]
fn test_shortest_path_reverse_direction_undirected(diamond: Network<&'static str>) {
    let view = WeightedView::new(&diamond, DEFAULT_WEIGHT_KEY).unwrap();
    let path = shortest_path(&view, &"D", &"A").unwrap();
    assert_eq!(path.nodes, vec!["D", "C", "B", "A"]);
}

#[rstest]
#[case::same_node("A", "A")]
#[case::unknown_source("Z", "D")]
#[case::unknown_dest("A", "Z")]
fn test_shortest_path_invalid_endpoints(diamond: Network<&'static str>, #[case] from: &'static str, #[case] to: &'static str) {
    let view = WeightedView::new(&diamond, DEFAULT_WEIGHT_KEY).unwrap();
    let err = shortest_path(&view, &from, &to).unwrap_err();
    assert!(matches!(err, PathError::InvalidEndpoints { .. }), "{err}");
}

#[rstest]
fn test_shortest_path_disconnected() {
    let mut network = Network::undirected();
    network.add_node("X");
    network.add_node("Y");
    let view = WeightedView::new(&network, DEFAULT_WEIGHT_KEY).unwrap();
    assert!(matches!(shortest_path(&view, &"X", &"Y"), Err(PathError::NoPathFound { .. })));
}

#[rstest]
fn test_shortest_path_respects_direction() {
    let network = network_of(true, &[("A", "B", 1.0), ("C", "B", 1.0)]);
    let view = WeightedView::new(&network, DEFAULT_WEIGHT_KEY).unwrap();
    assert!(matches!(shortest_path(&view, &"A", &"C"), Err(PathError::NoPathFound { .. })));
}

#[rstest]
fn test_shortest_path_negative_weights(negative_dag: Network<&'static str>) {
    let view = WeightedView::new(&negative_dag, DEFAULT_WEIGHT_KEY).unwrap();
    assert!(view.has_negative_weights());
    let path = shortest_path(&view, &"S", &"T").unwrap();
    assert_eq!(path.nodes, vec!["S", "B", "A", "T"]);
    assert_eq!(path.cost, 2.0);
}

#[rstest]
fn test_shortest_path_negative_cycle() {
    let network = network_of(true, &[("A", "B", 1.0), ("B", "C", -3.0), ("C", "B", 1.0), ("C", "D", 1.0)]);
    let view = WeightedView::new(&network, DEFAULT_WEIGHT_KEY).unwrap();
    assert!(matches!(shortest_path(&view, &"A", &"D"), Err(PathError::InconsistentGraph { .. })));
}

#[rstest]
fn test_shortest_path_undirected_negative_link_is_a_cycle() {
    let network = network_of(false, &[("A", "B", -1.0), ("B", "C", 1.0)]);
    let view = WeightedView::new(&network, DEFAULT_WEIGHT_KEY).unwrap();
    assert!(matches!(shortest_path(&view, &"A", &"C"), Err(PathError::InconsistentGraph { .. })));
}

#[rstest]
fn test_shortest_path_uses_first_parallel_link() {
    let network = network_of(false, &[("A", "B", 5.0), ("A", "B", 1.0), ("B", "C", 1.0), ("A", "C", 10.0)]);
    let view = WeightedView::new(&network, DEFAULT_WEIGHT_KEY).unwrap();
    let path = shortest_path(&view, &"A", &"C").unwrap();
    assert_eq!(path.nodes, vec!["A", "B", "C"]);
    assert_eq!(path.cost, 6.0);
}

#[rstest]
fn test_shortest_path_ties_pick_smallest_node() {
    let network = network_of(false, &[("A", "C", 1.0), ("A", "B", 1.0), ("C", "D", 1.0), ("B", "D", 1.0)]);
    let view = WeightedView::new(&network, DEFAULT_WEIGHT_KEY).unwrap();
    assert_eq!(shortest_path(&view, &"A", &"D").unwrap().nodes, vec!["A", "B", "D"]);
}

#[rstest]
fn test_shortest_path_restricted_view(diamond: Network<&'static str>) {
    let view = WeightedView::new(&diamond, DEFAULT_WEIGHT_KEY).unwrap();
    let mut restricted = RestrictedView::new(&view);
    restricted.exclude_node("B");
    assert!(!restricted.contains_node(&"B"));
    assert_eq!(restricted.node_count(), 3);

    let path = shortest_path(&restricted, &"A", &"D").unwrap();
    assert_eq!(path.nodes, vec!["A", "C", "D"]);
    assert_eq!(path.cost, 6.0);
}

#[rstest]
fn test_restricted_view_hides_both_orientations(diamond: Network<&'static str>) {
    let view = WeightedView::new(&diamond, DEFAULT_WEIGHT_KEY).unwrap();
    let mut restricted = RestrictedView::new(&view);
    restricted.exclude_link("C", "B");
    assert!(restricted.is_link_excluded(&"B", &"C"));
    assert!(restricted.weight(&"B", &"C").is_none());
    assert_eq!(restricted.weight(&"B", &"D"), Some(4.0));

    let path = shortest_path(&restricted, &"A", &"D").unwrap();
    assert_eq!(path.nodes, vec!["A", "B", "D"]);
    assert_eq!(view.infinity(), restricted.infinity());
}

#[rstest]
fn test_missing_weight_attribute() {
    let mut network = Network::directed();
    network.add_link("A", "B", Link::new().with("delay", 3.0));
    let err = WeightedView::new(&network, DEFAULT_WEIGHT_KEY).unwrap_err();
    assert_eq!(err, PathError::MissingAttribute { from: "\"A\"".into(), to: "\"B\"".into(), key: "weight".into() });
    assert!(WeightedView::new(&network, "delay").is_ok());
}

#[rstest]
fn test_infinity_is_sum_of_absolute_weights(negative_dag: Network<&'static str>) {
    let view = WeightedView::new(&negative_dag, DEFAULT_WEIGHT_KEY).unwrap();
    assert_eq!(view.infinity(), 2.0 + 5.0 + 4.0 + 1.0 + 1.0 + 1.0);
}

#[rstest]
fn test_restricted_view_hides_capacity(diamond_with_capacity: Network<&'static str>) {
    let view = WeightedView::new(&diamond_with_capacity, DEFAULT_WEIGHT_KEY)
        .unwrap()
        .with_capacity(DEFAULT_CAPACITY_KEY);
    let mut restricted = RestrictedView::new(&view);
    restricted.exclude_link("B", "C");
    restricted.exclude_node("D");

    assert_eq!(view.capacity(&"C", &"B"), Some(4.0));
    assert!(restricted.capacity(&"C", &"B").is_none());
    assert!(restricted.capacity(&"B", &"D").is_none());
    assert_eq!(restricted.capacity(&"A", &"B"), Some(10.0));
}

#[rstest]
fn test_reconstruct_rejects_cyclic_predecessors() {
    let predecessor = HashMap::from([("C", "B"), ("B", "C")]);
    let err = reconstruct(&predecessor, &"A", &"C", 3).unwrap_err();
    assert!(matches!(err, PathError::InconsistentGraph { .. }), "{err}");
}

#[rstest]
fn test_reconstruct_rejects_broken_chain() {
    let predecessor = HashMap::from([("C", "B")]);
    let err = reconstruct(&predecessor, &"A", &"C", 3).unwrap_err();
    assert!(matches!(err, PathError::InconsistentGraph { .. }), "{err}");

    let complete = HashMap::from([("C", "B"), ("B", "A")]);
    assert_eq!(reconstruct(&complete, &"A", &"C", 3).unwrap(), vec!["A", "B", "C"]);
}
