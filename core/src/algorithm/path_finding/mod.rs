//! Relaxation-based shortest path algorithms
//!
//! Dijkstra and A* drive the breadth-first engine with a decrease-key
//! priority frontier. Bellman-Ford relaxes every edge in passes and reports
//! negative cycles. DAG shortest path relaxes out-edges once, in topological
//! order. All four share [`relaxer::relax`] and a swappable
//! [`DistanceRelaxer`].
//!
//! Distances live in a dense table indexed by `vertex_index`.
//!
//! Copyright (c) 2025 Quiver Contributors

pub mod astar;
pub mod bellman_ford;
pub(crate) mod best_first;
pub mod dag;
pub mod dijkstra;
pub mod relaxer;

use std::collections::HashMap;
use std::rc::Rc;

use crate::algorithm::rooted::RootedAlgorithm;
use crate::algorithm::traits::AlgorithmError;
use crate::data_structures::graph::VertexListGraph;

pub use self::astar::AStarShortestPath;
pub use self::bellman_ford::BellmanFordShortestPath;
pub use self::dag::DagShortestPath;
pub use self::dijkstra::DijkstraShortestPath;
pub use self::relaxer::{
    relax, CriticalDistanceRelaxer, DistanceRelaxer, EdgeExtractDistanceRelaxer,
    ShortestDistanceRelaxer, StandardRelaxer,
};

/// Common surface of the shortest path algorithms
pub trait ShortestPathAlgorithm: RootedAlgorithm {
    fn relaxer(&self) -> Rc<dyn DistanceRelaxer>;

    fn set_relaxer(&mut self, relaxer: Rc<dyn DistanceRelaxer>);

    /// Distance of a reached vertex
    fn distance(&self, vertex: Self::Root) -> Option<f64>;

    /// Distances of every reached vertex
    fn distances(&self) -> HashMap<Self::Root, f64>;
}

/// Dense per-vertex distances
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    values: Vec<f64>,
    initial: f64,
}

impl DistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets every entry in `0..bound` to `initial`
    pub fn reset(&mut self, bound: usize, initial: f64) {
        self.values.clear();
        self.values.resize(bound, initial);
        self.initial = initial;
    }

    pub fn get(&self, index: usize) -> f64 {
        self.values.get(index).copied().unwrap_or(self.initial)
    }

    pub fn set(&mut self, index: usize, distance: f64) {
        self.values[index] = distance;
    }

    pub fn is_reached(&self, index: usize) -> bool {
        self.values.get(index).is_some_and(|&d| d != self.initial)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }

    pub fn distance_of<G: VertexListGraph>(&self, graph: &G, vertex: G::Vertex) -> Option<f64> {
        if !graph.contains_vertex(vertex) {
            return None;
        }
        let index = graph.vertex_index(vertex);
        self.is_reached(index).then(|| self.values[index])
    }

    pub fn collect<G: VertexListGraph>(&self, graph: &G) -> HashMap<G::Vertex, f64> {
        graph
            .vertices()
            .filter_map(|vertex| {
                let index = graph.vertex_index(vertex);
                self.is_reached(index).then(|| (vertex, self.values[index]))
            })
            .collect()
    }
}

/// Shared handling of the `relaxer` parameter
pub(crate) fn relaxer_parameter(value: &str) -> Result<Rc<dyn DistanceRelaxer>, AlgorithmError> {
    Ok(value.parse::<StandardRelaxer>()?.build())
}

/// Formats an edge for error reports
pub(crate) fn describe_edge<E: std::fmt::Debug>(edge: E) -> String {
    format!("{edge:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::graph::{AdjacencyGraph, VertexId};

    #[test]
    fn test_distance_table_tracks_reached_vertices() {
        let graph = AdjacencyGraph::with_vertices(3);
        let mut table = DistanceTable::new();
        table.reset(3, f64::INFINITY);
        table.set(0, 0.0);
        table.set(2, 7.5);

        assert_eq!(table.distance_of(&graph, VertexId(0)), Some(0.0));
        assert_eq!(table.distance_of(&graph, VertexId(1)), None);
        assert_eq!(table.distance_of(&graph, VertexId(9)), None);
        assert_eq!(table.collect(&graph).len(), 2);

        table.reset(3, f64::NEG_INFINITY);
        assert!(!table.is_reached(2));
        assert_eq!(table.get(2), f64::NEG_INFINITY);
    }

    #[test]
    fn test_relaxer_parameter() {
        assert_eq!(relaxer_parameter("critical").unwrap().name(), "critical");
        assert!(matches!(
            relaxer_parameter("fastest"),
            Err(AlgorithmError::InvalidParameter { .. })
        ));
    }
}
