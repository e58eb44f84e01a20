use std::collections::HashMap;

use proptest::prelude::*;
use quiver_core::prelude::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn network(vertices: usize, edges: &[(usize, usize, f64)]) -> (AdjacencyGraph, Vec<f64>) {
    let pairs: Vec<_> = edges.iter().map(|&(s, t, _)| (s, t)).collect();
    let graph = AdjacencyGraph::from_edges(vertices, &pairs).unwrap();
    (graph, edges.iter().map(|&(_, _, c)| c).collect())
}

/// Minimum capacity over every source/sink cut
fn brute_force_min_cut(vertices: usize, edges: &[(usize, usize, f64)], source: usize, sink: usize) -> f64 {
    (0u32..1 << vertices)
        .filter(|mask| mask & (1 << source) != 0 && mask & (1 << sink) == 0)
        .map(|mask| {
            edges
                .iter()
                .filter(|&&(s, t, _)| mask & (1 << s) != 0 && mask & (1 << t) == 0)
                .map(|&(_, _, c)| c)
                .sum::<f64>()
        })
        .fold(f64::INFINITY, f64::min)
}

#[test]
fn test_maximum_flow_with_antiparallel_edges() {
    init_logger();
    let edges = [
        (0, 1, 10.0),
        (0, 2, 5.0),
        (1, 2, 15.0),
        (2, 1, 4.0),
        (1, 3, 5.0),
        (2, 3, 10.0),
    ];
    let (mut graph, capacities) = network(4, &edges);

    let result = maximum_flow(&mut graph, VertexId(0), VertexId(3), |e: EdgeId| capacities[e.0]).unwrap();

    assert_eq!(result.value, 15.0);
    assert_eq!(result.value, brute_force_min_cut(4, &edges, 0, 3));
    assert_eq!(graph.edge_count(), edges.len());
    for (edge, flow) in &result.flows {
        assert!(*flow <= capacities[edge.0]);
    }
}

#[test]
fn test_result_serializes_to_json() {
    init_logger();
    let (mut graph, capacities) = network(2, &[(0, 1, 3.0)]);
    let result = maximum_flow(&mut graph, VertexId(0), VertexId(1), |e: EdgeId| capacities[e.0]).unwrap();

    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["value"], 3.0);
    assert_eq!(json["source_side"], serde_json::json!([0]));
}

proptest! {
    #[test]
    fn test_max_flow_equals_min_cut(
        (n, edges) in (2usize..6).prop_flat_map(|n| {
            let edge = (0..n, 0..n, 0u32..10).prop_map(|(s, t, c)| (s, t, c as f64));
            (Just(n), prop::collection::vec(edge, 0..14))
        })
    ) {
        let sink = n - 1;
        let (mut graph, capacities) = network(n, &edges);
        let edge_count = graph.edge_count();

        let result = maximum_flow(&mut graph, VertexId(0), VertexId(sink), |e: EdgeId| capacities[e.0])
            .unwrap();

        prop_assert_eq!(result.value, brute_force_min_cut(n, &edges, 0, sink));
        prop_assert_eq!(graph.edge_count(), edge_count);

        // The reported source side is a cut whose capacity equals the flow.
        let cut: f64 = graph
            .edges()
            .filter(|&e| {
                result.source_side.contains(&graph.source(e))
                    && !result.source_side.contains(&graph.target(e))
            })
            .map(|e| capacities[e.0])
            .sum();
        prop_assert_eq!(cut, result.value);
    }

    #[test]
    fn test_flow_is_conserved_and_bounded(
        (n, edges) in (3usize..7).prop_flat_map(|n| {
            let edge = (0..n, 0..n, 0u32..10).prop_map(|(s, t, c)| (s, t, c as f64));
            (Just(n), prop::collection::vec(edge, 0..18))
        })
    ) {
        let sink = n - 1;
        let (mut graph, capacities) = network(n, &edges);

        let result = maximum_flow(&mut graph, VertexId(0), VertexId(sink), |e: EdgeId| capacities[e.0])
            .unwrap();

        let mut balance: HashMap<usize, f64> = HashMap::new();
        for (&edge, &flow) in &result.flows {
            prop_assert!(flow >= 0.0);
            prop_assert!(flow <= capacities[edge.0]);
            *balance.entry(graph.target(edge).0).or_default() += flow;
            *balance.entry(graph.source(edge).0).or_default() -= flow;
        }
        for v in 1..sink {
            prop_assert_eq!(balance.get(&v).copied().unwrap_or(0.0), 0.0);
        }
        prop_assert_eq!(balance.get(&sink).copied().unwrap_or(0.0), result.value);
    }
}
