//! Graph traversal substrate
//!
//! [`breadth_first_visit`] is the engine behind breadth-first search and the
//! best-first shortest path algorithms. It is parameterized by a
//! [`Frontier`] (FIFO queue or decrease-key priority queue) and a
//! [`BfsVisitor`] that reacts to each traversal step.
//!
//! # Vertex colors
//! - `White`: not yet discovered
//! - `Gray`: discovered, waiting in the frontier
//! - `Black`: all out-edges examined
//!
//! Copyright (c) 2025 Quiver Contributors

pub mod bfs;
pub mod dfs;
pub mod topological;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::algorithm::cancellation::CancelManager;
use crate::algorithm::events::EdgeArgs;
use crate::algorithm::traits::AlgorithmError;
use crate::data_structures::graph::{IncidenceGraph, VertexListGraph};
use crate::data_structures::priority_queue::IndexedPriorityQueue;

pub use self::bfs::BreadthFirstSearch;
pub use self::dfs::DepthFirstSearch;
pub use self::topological::TopologicalSort;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VertexColor {
    #[default]
    White,
    Gray,
    Black,
}

/// How a traversal ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisitOutcome {
    /// Every reachable vertex was finished
    Completed,
    /// A cancellation request was observed at a safepoint
    Cancelled,
    /// The visitor asked to stop, typically at a goal vertex
    Stopped,
}

/// Order in which discovered vertices are expanded
///
/// `index` is the vertex's dense index; `priority` is only meaningful to
/// priority frontiers.
pub trait Frontier<V> {
    fn enqueue(&mut self, vertex: V, index: usize, priority: f64);

    fn dequeue(&mut self) -> Option<V>;

    /// Called when a queued vertex's priority improved
    fn update(&mut self, _vertex: V, _index: usize, _priority: f64) {}

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);
}

impl<V> Frontier<V> for VecDeque<V> {
    fn enqueue(&mut self, vertex: V, _index: usize, _priority: f64) {
        self.push_back(vertex);
    }

    fn dequeue(&mut self) -> Option<V> {
        self.pop_front()
    }

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn clear(&mut self) {
        VecDeque::clear(self);
    }
}

/// Min-priority frontier backed by the indexed heap
#[derive(Debug, Clone)]
pub struct PriorityFrontier<V> {
    queue: IndexedPriorityQueue<f64>,
    vertices: Vec<Option<V>>,
}

impl<V: Copy> PriorityFrontier<V> {
    pub fn new(vertex_bound: usize) -> Self {
        Self {
            queue: IndexedPriorityQueue::new(vertex_bound),
            vertices: vec![None; vertex_bound],
        }
    }

    pub fn queue(&self) -> &IndexedPriorityQueue<f64> {
        &self.queue
    }
}

impl<V: Copy> Frontier<V> for PriorityFrontier<V> {
    fn enqueue(&mut self, vertex: V, index: usize, priority: f64) {
        if index >= self.vertices.len() {
            self.vertices.resize(index + 1, None);
        }
        self.vertices[index] = Some(vertex);
        self.queue.push(index, priority);
    }

    fn dequeue(&mut self) -> Option<V> {
        let (index, _) = self.queue.pop()?;
        self.vertices.get(index).copied().flatten()
    }

    fn update(&mut self, vertex: V, index: usize, priority: f64) {
        self.enqueue(vertex, index, priority);
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn clear(&mut self) {
        self.queue.clear();
    }
}

/// Reactions to breadth-first traversal steps
///
/// Every hook may fail; the error aborts the traversal and propagates.
pub trait BfsVisitor<V, E> {
    fn start_vertex(&mut self, _vertex: V) -> Result<(), AlgorithmError> {
        Ok(())
    }

    fn discover_vertex(&mut self, _vertex: V) -> Result<(), AlgorithmError> {
        Ok(())
    }

    fn examine_vertex(&mut self, _vertex: V) -> Result<(), AlgorithmError> {
        Ok(())
    }

    fn examine_edge(&mut self, _args: EdgeArgs<V, E>) -> Result<(), AlgorithmError> {
        Ok(())
    }

    /// Edge towards a white vertex. `true` discovers the target, `false`
    /// leaves it white for a later edge.
    fn tree_edge(&mut self, _args: EdgeArgs<V, E>) -> Result<bool, AlgorithmError> {
        Ok(true)
    }

    fn non_tree_edge(&mut self, _args: EdgeArgs<V, E>) -> Result<(), AlgorithmError> {
        Ok(())
    }

    /// Edge towards a queued vertex. `true` re-keys the target in the frontier.
    fn gray_target(&mut self, _args: EdgeArgs<V, E>) -> Result<bool, AlgorithmError> {
        Ok(false)
    }

    /// Edge towards a finished vertex. `true` re-opens the target.
    fn black_target(&mut self, _args: EdgeArgs<V, E>) -> Result<bool, AlgorithmError> {
        Ok(false)
    }

    fn finish_vertex(&mut self, _vertex: V) -> Result<(), AlgorithmError> {
        Ok(())
    }

    /// Frontier priority of `vertex`, whose dense index is `index`
    fn priority(&self, _vertex: V, _index: usize) -> f64 {
        0.0
    }

    /// Checked after each finished vertex
    fn should_stop(&mut self, _vertex: V) -> bool {
        false
    }
}

/// Runs a breadth-first traversal from each white vertex of `starts`
///
/// Cancellation is polled before each vertex leaves the frontier and before
/// each restart.
pub fn breadth_first_visit<G, F, Vis>(
    graph: &G,
    starts: impl IntoIterator<Item = G::Vertex>,
    colors: &mut [VertexColor],
    frontier: &mut F,
    visitor: &mut Vis,
    cancel: &CancelManager,
) -> Result<VisitOutcome, AlgorithmError>
where
    G: IncidenceGraph + VertexListGraph,
    F: Frontier<G::Vertex>,
    Vis: BfsVisitor<G::Vertex, G::Edge>,
{
    for start in starts {
        if cancel.is_cancelling() {
            return Ok(VisitOutcome::Cancelled);
        }

        let start_index = graph.vertex_index(start);
        if colors[start_index] != VertexColor::White {
            continue;
        }

        visitor.start_vertex(start)?;
        colors[start_index] = VertexColor::Gray;
        visitor.discover_vertex(start)?;
        frontier.enqueue(start, start_index, visitor.priority(start, start_index));

        loop {
            if cancel.is_cancelling() {
                return Ok(VisitOutcome::Cancelled);
            }
            let Some(vertex) = frontier.dequeue() else {
                break;
            };

            visitor.examine_vertex(vertex)?;
            for edge in graph.out_edges(vertex) {
                let target = graph.target(edge);
                let target_index = graph.vertex_index(target);
                let args = EdgeArgs {
                    edge,
                    source: vertex,
                    target,
                };

                visitor.examine_edge(args)?;
                match colors[target_index] {
                    VertexColor::White => {
                        if !visitor.tree_edge(args)? {
                            continue;
                        }
                        colors[target_index] = VertexColor::Gray;
                        visitor.discover_vertex(target)?;
                        frontier.enqueue(target, target_index, visitor.priority(target, target_index));
                    }
                    VertexColor::Gray => {
                        visitor.non_tree_edge(args)?;
                        if visitor.gray_target(args)? {
                            frontier.update(target, target_index, visitor.priority(target, target_index));
                        }
                    }
                    VertexColor::Black => {
                        visitor.non_tree_edge(args)?;
                        if visitor.black_target(args)? {
                            colors[target_index] = VertexColor::Gray;
                            frontier.enqueue(target, target_index, visitor.priority(target, target_index));
                        }
                    }
                }
            }

            colors[graph.vertex_index(vertex)] = VertexColor::Black;
            visitor.finish_vertex(vertex)?;
            if visitor.should_stop(vertex) {
                frontier.clear();
                return Ok(VisitOutcome::Stopped);
            }
        }
    }

    Ok(VisitOutcome::Completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::graph::{AdjacencyGraph, VertexId};

    #[derive(Default)]
    struct Trace {
        discovered: Vec<usize>,
        finished: Vec<usize>,
        tree_edges: usize,
    }

    impl<E> BfsVisitor<VertexId, E> for Trace {
        fn discover_vertex(&mut self, vertex: VertexId) -> Result<(), AlgorithmError> {
            self.discovered.push(vertex.0);
            Ok(())
        }

        fn tree_edge(&mut self, _args: EdgeArgs<VertexId, E>) -> Result<bool, AlgorithmError> {
            self.tree_edges += 1;
            Ok(true)
        }

        fn finish_vertex(&mut self, vertex: VertexId) -> Result<(), AlgorithmError> {
            self.finished.push(vertex.0);
            Ok(())
        }
    }

    #[test]
    fn test_fifo_frontier_visits_by_layer() {
        let graph = AdjacencyGraph::from_edges(5, &[(0, 1), (0, 2), (1, 3), (2, 3), (3, 4)]).unwrap();
        let mut colors = vec![VertexColor::White; 5];
        let mut visitor = Trace::default();

        let outcome = breadth_first_visit(
            &graph,
            [VertexId(0)],
            &mut colors,
            &mut VecDeque::new(),
            &mut visitor,
            &CancelManager::new(),
        )
        .unwrap();

        assert_eq!(outcome, VisitOutcome::Completed);
        assert_eq!(visitor.discovered, vec![0, 1, 2, 3, 4]);
        assert_eq!(visitor.finished, vec![0, 1, 2, 3, 4]);
        assert_eq!(visitor.tree_edges, 4);
        assert!(colors.iter().all(|&color| color == VertexColor::Black));
    }

    #[test]
    fn test_forest_restarts_from_white_vertices() {
        let graph = AdjacencyGraph::from_edges(4, &[(2, 3), (0, 1)]).unwrap();
        let mut colors = vec![VertexColor::White; 4];
        let mut visitor = Trace::default();

        breadth_first_visit(
            &graph,
            (0..4).map(VertexId),
            &mut colors,
            &mut VecDeque::new(),
            &mut visitor,
            &CancelManager::new(),
        )
        .unwrap();

        assert_eq!(visitor.discovered, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_cancelled_before_first_vertex() {
        let graph = AdjacencyGraph::from_edges(2, &[(0, 1)]).unwrap();
        let cancel = CancelManager::new();
        cancel.cancel();
        let mut visitor = Trace::default();

        let outcome = breadth_first_visit(
            &graph,
            [VertexId(0)],
            &mut vec![VertexColor::White; 2],
            &mut VecDeque::new(),
            &mut visitor,
            &cancel,
        )
        .unwrap();

        assert_eq!(outcome, VisitOutcome::Cancelled);
        assert!(visitor.discovered.is_empty());
    }

    #[test]
    fn test_priority_frontier_orders_by_priority() {
        let mut frontier = PriorityFrontier::new(3);
        frontier.enqueue('a', 0, 5.0);
        frontier.enqueue('b', 1, 1.0);
        frontier.enqueue('c', 2, 3.0);
        frontier.update('a', 0, 0.5);

        assert_eq!(frontier.len(), 3);
        assert_eq!(frontier.dequeue(), Some('a'));
        assert_eq!(frontier.dequeue(), Some('b'));
        assert_eq!(frontier.dequeue(), Some('c'));
        assert!(frontier.is_empty());
    }
}
