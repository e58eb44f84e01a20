//! Kruskal's minimum spanning tree
//!
//! # Algorithmic Complexity
//! - Time: O(E log E) for the sort, near-linear union-find afterwards
//! - Space: O(V + E)
//!
//! Edges are considered in ascending weight order (stable, so equal weights
//! keep enumeration order) and kept when they join two different trees.
//! Edge direction is ignored. On a disconnected graph the result is a
//! spanning forest.

use log::debug;

use crate::algorithm::events::{EdgeArgs, SearchEvent, SearchEvents};
use crate::algorithm::observers::Observable;
use crate::algorithm::state::AlgorithmCore;
use crate::algorithm::traits::{Algorithm, AlgorithmError};
use crate::data_structures::graph::{EdgeListGraph, VertexListGraph};
use crate::data_structures::union_find::UnionFind;

pub struct KruskalMinimumSpanningTree<'g, G, W>
where
    G: VertexListGraph + EdgeListGraph,
    W: Fn(G::Edge) -> f64,
{
    core: AlgorithmCore,
    graph: &'g G,
    weights: W,
    events: SearchEvents<G::Vertex, G::Edge>,
    tree_edges: Vec<G::Edge>,
    total_weight: f64,
}

impl<'g, G, W> KruskalMinimumSpanningTree<'g, G, W>
where
    G: VertexListGraph + EdgeListGraph,
    W: Fn(G::Edge) -> f64,
{
    pub fn new(graph: &'g G, weights: W) -> Self {
        Self {
            core: AlgorithmCore::new(),
            graph,
            weights,
            events: SearchEvents::new(),
            tree_edges: Vec::new(),
            total_weight: 0.0,
        }
    }

    /// Spanning tree edges in the order they were accepted
    pub fn tree_edges(&self) -> &[G::Edge] {
        &self.tree_edges
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }
}

impl<'g, G, W> Algorithm for KruskalMinimumSpanningTree<'g, G, W>
where
    G: VertexListGraph + EdgeListGraph,
    W: Fn(G::Edge) -> f64,
{
    fn name(&self) -> &'static str {
        "Kruskal"
    }

    fn category(&self) -> &'static str {
        "spanning-tree"
    }

    fn core(&self) -> &AlgorithmCore {
        &self.core
    }

    fn initialize(&mut self) -> Result<(), AlgorithmError> {
        self.tree_edges.clear();
        self.total_weight = 0.0;
        Ok(())
    }

    fn internal_compute(&mut self) -> Result<(), AlgorithmError> {
        let mut edges: Vec<(G::Edge, f64)> = self
            .graph
            .edges()
            .map(|edge| (edge, (self.weights)(edge)))
            .collect();
        edges.sort_by(|a, b| a.1.total_cmp(&b.1));

        let mut forest = UnionFind::new(self.graph.vertex_bound());
        let wanted = self.graph.vertex_count().saturating_sub(1);

        for (edge, weight) in edges {
            if self.core.is_cancelling() || self.tree_edges.len() == wanted {
                break;
            }

            let args = EdgeArgs {
                edge,
                source: self.graph.source(edge),
                target: self.graph.target(edge),
            };
            self.events.raise(&SearchEvent::ExamineEdge(args));

            let joined = forest.union(
                self.graph.vertex_index(args.source),
                self.graph.vertex_index(args.target),
            );
            if joined {
                self.tree_edges.push(edge);
                self.total_weight += weight;
                self.events.raise(&SearchEvent::TreeEdge(args));
            } else {
                self.events.raise(&SearchEvent::NonTreeEdge(args));
            }
        }

        debug!(
            "Spanning forest with {} edges, weight {}",
            self.tree_edges.len(),
            self.total_weight
        );
        Ok(())
    }
}

impl<'g, G, W> Observable for KruskalMinimumSpanningTree<'g, G, W>
where
    G: VertexListGraph + EdgeListGraph,
    W: Fn(G::Edge) -> f64,
{
    type Vertex = G::Vertex;
    type Edge = G::Edge;

    fn search_events(&self) -> &SearchEvents<G::Vertex, G::Edge> {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::observers::EdgeRecorder;
    use crate::data_structures::graph::{AdjacencyGraph, EdgeId};

    #[test]
    fn test_spanning_tree_weight() {
        let graph = AdjacencyGraph::from_edges(
            4,
            &[(0, 1), (1, 2), (2, 3), (3, 0), (0, 2)],
        )
        .unwrap();
        let weights = [1.0, 2.0, 1.0, 4.0, 3.0];
        let mut kruskal = KruskalMinimumSpanningTree::new(&graph, |e: EdgeId| weights[e.0]);
        let tree = EdgeRecorder::new();
        let _t = kruskal.attach(&tree);

        kruskal.compute().unwrap();

        assert_eq!(kruskal.total_weight(), 4.0);
        assert_eq!(kruskal.tree_edges(), &[EdgeId(0), EdgeId(2), EdgeId(1)]);
        assert_eq!(*tree.edges(), kruskal.tree_edges());
    }

    #[test]
    fn test_disconnected_graph_yields_forest() {
        let graph = AdjacencyGraph::from_edges(5, &[(0, 1), (2, 3), (3, 4), (4, 2)]).unwrap();
        let mut kruskal = KruskalMinimumSpanningTree::new(&graph, |_| 1.0);

        kruskal.compute().unwrap();

        assert_eq!(kruskal.tree_edges().len(), 3);
        assert_eq!(kruskal.total_weight(), 3.0);
    }
}
