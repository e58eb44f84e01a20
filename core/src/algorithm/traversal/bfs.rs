//! Breadth-first search
//!
//! Visits vertices layer by layer from the root, or from every white vertex
//! in enumeration order when no root is set. All traversal steps are raised
//! as [`SearchEvent`]s; results come from attached observers.

use std::collections::VecDeque;
use std::iter;

use log::debug;

use crate::algorithm::events::{EdgeArgs, SearchEvent, SearchEvents};
use crate::algorithm::observers::Observable;
use crate::algorithm::rooted::{RootedAlgorithm, SearchAlgorithm, SearchRoots};
use crate::algorithm::state::AlgorithmCore;
use crate::algorithm::traits::{Algorithm, AlgorithmError};
use crate::algorithm::traversal::{breadth_first_visit, BfsVisitor, VertexColor, VisitOutcome};
use crate::data_structures::graph::{IncidenceGraph, VertexListGraph};

pub struct BreadthFirstSearch<'g, G: IncidenceGraph + VertexListGraph> {
    core: AlgorithmCore,
    graph: &'g G,
    roots: SearchRoots<G::Vertex>,
    events: SearchEvents<G::Vertex, G::Edge>,
    colors: Vec<VertexColor>,
    outcome: Option<VisitOutcome>,
}

impl<'g, G: IncidenceGraph + VertexListGraph> BreadthFirstSearch<'g, G> {
    pub fn new(graph: &'g G) -> Self {
        Self::with_core(graph, AlgorithmCore::new())
    }

    /// Search sharing `host`'s services, so aborting the host cancels it
    pub fn with_host(graph: &'g G, host: &AlgorithmCore) -> Self {
        Self::with_core(graph, AlgorithmCore::with_host(host))
    }

    fn with_core(graph: &'g G, core: AlgorithmCore) -> Self {
        Self {
            core,
            graph,
            roots: SearchRoots::new(),
            events: SearchEvents::new(),
            colors: Vec::new(),
            outcome: None,
        }
    }

    pub fn graph(&self) -> &'g G {
        self.graph
    }

    /// How the last computation ended
    pub fn outcome(&self) -> Option<VisitOutcome> {
        self.outcome
    }
}

struct EventVisitor<'a, V, E> {
    events: &'a SearchEvents<V, E>,
    goal: Option<V>,
}

impl<'a, V, E> BfsVisitor<V, E> for EventVisitor<'a, V, E>
where
    V: Copy + PartialEq + 'static,
    E: Copy + 'static,
{
    fn start_vertex(&mut self, vertex: V) -> Result<(), AlgorithmError> {
        self.events.raise(&SearchEvent::StartVertex(vertex));
        Ok(())
    }

    fn discover_vertex(&mut self, vertex: V) -> Result<(), AlgorithmError> {
        self.events.raise(&SearchEvent::DiscoverVertex(vertex));
        Ok(())
    }

    fn examine_vertex(&mut self, vertex: V) -> Result<(), AlgorithmError> {
        self.events.raise(&SearchEvent::ExamineVertex(vertex));
        Ok(())
    }

    fn examine_edge(&mut self, args: EdgeArgs<V, E>) -> Result<(), AlgorithmError> {
        self.events.raise(&SearchEvent::ExamineEdge(args));
        Ok(())
    }

    fn tree_edge(&mut self, args: EdgeArgs<V, E>) -> Result<bool, AlgorithmError> {
        self.events.raise(&SearchEvent::TreeEdge(args));
        Ok(true)
    }

    fn non_tree_edge(&mut self, args: EdgeArgs<V, E>) -> Result<(), AlgorithmError> {
        self.events.raise(&SearchEvent::NonTreeEdge(args));
        Ok(())
    }

    fn gray_target(&mut self, args: EdgeArgs<V, E>) -> Result<bool, AlgorithmError> {
        self.events.raise(&SearchEvent::GrayTarget(args));
        Ok(false)
    }

    fn black_target(&mut self, args: EdgeArgs<V, E>) -> Result<bool, AlgorithmError> {
        self.events.raise(&SearchEvent::BlackTarget(args));
        Ok(false)
    }

    fn finish_vertex(&mut self, vertex: V) -> Result<(), AlgorithmError> {
        self.events.raise(&SearchEvent::FinishVertex(vertex));
        Ok(())
    }

    fn should_stop(&mut self, vertex: V) -> bool {
        if self.goal == Some(vertex) {
            self.events.raise(&SearchEvent::TargetReached(vertex));
            return true;
        }
        false
    }
}

impl<'g, G: IncidenceGraph + VertexListGraph> Algorithm for BreadthFirstSearch<'g, G> {
    fn name(&self) -> &'static str {
        "BreadthFirstSearch"
    }

    fn category(&self) -> &'static str {
        "traversal"
    }

    fn core(&self) -> &AlgorithmCore {
        &self.core
    }

    fn initialize(&mut self) -> Result<(), AlgorithmError> {
        if let Some(root) = self.roots.root() {
            if !self.graph.contains_vertex(root) {
                return Err(AlgorithmError::InvalidVertex(format!("{root:?}")));
            }
        }

        self.outcome = None;
        self.colors = vec![VertexColor::White; self.graph.vertex_bound()];
        for vertex in self.graph.vertices() {
            self.events.raise(&SearchEvent::InitializeVertex(vertex));
        }
        Ok(())
    }

    fn internal_compute(&mut self) -> Result<(), AlgorithmError> {
        let cancel = self.core.cancel_manager();
        let mut frontier = VecDeque::new();
        let mut visitor = EventVisitor {
            events: &self.events,
            goal: self.roots.goal(),
        };

        let outcome = match self.roots.root() {
            Some(root) => breadth_first_visit(
                self.graph,
                iter::once(root),
                &mut self.colors,
                &mut frontier,
                &mut visitor,
                &cancel,
            )?,
            None => breadth_first_visit(
                self.graph,
                self.graph.vertices(),
                &mut self.colors,
                &mut frontier,
                &mut visitor,
                &cancel,
            )?,
        };

        debug!("{} ended with {outcome:?}", self.name());
        self.outcome = Some(outcome);
        Ok(())
    }

    fn clean(&mut self) {
        self.colors = Vec::new();
    }
}

impl<'g, G: IncidenceGraph + VertexListGraph> RootedAlgorithm for BreadthFirstSearch<'g, G> {
    type Root = G::Vertex;

    fn roots(&self) -> &SearchRoots<G::Vertex> {
        &self.roots
    }

    fn roots_mut(&mut self) -> &mut SearchRoots<G::Vertex> {
        &mut self.roots
    }
}

impl<'g, G: IncidenceGraph + VertexListGraph> SearchAlgorithm for BreadthFirstSearch<'g, G> {}

impl<'g, G: IncidenceGraph + VertexListGraph> Observable for BreadthFirstSearch<'g, G> {
    type Vertex = G::Vertex;
    type Edge = G::Edge;

    fn search_events(&self) -> &SearchEvents<G::Vertex, G::Edge> {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::events::EventKind;
    use crate::algorithm::observers::{
        EdgeRecorder, VertexPredecessorRecorder, VertexRecorder, VertexTimeStamper,
    };
    use crate::algorithm::state::ComputationState;
    use crate::data_structures::graph::{AdjacencyGraph, VertexId};

    fn sample() -> AdjacencyGraph {
        AdjacencyGraph::from_edges(6, &[(0, 1), (0, 2), (1, 3), (2, 3), (3, 4), (5, 0)]).unwrap()
    }

    #[test]
    fn test_bfs_from_root_builds_tree() {
        let graph = sample();
        let mut bfs = BreadthFirstSearch::new(&graph);
        let predecessors = VertexPredecessorRecorder::new();
        let discovered = VertexRecorder::new();
        let _p = bfs.attach(&predecessors);
        let _d = bfs.attach(&discovered);

        bfs.compute_from(VertexId(0)).unwrap();

        assert_eq!(bfs.state(), ComputationState::Finished);
        assert_eq!(bfs.outcome(), Some(VisitOutcome::Completed));
        assert_eq!(
            *discovered.vertices(),
            vec![VertexId(0), VertexId(1), VertexId(2), VertexId(3), VertexId(4)]
        );
        let path = predecessors.path_to(&graph, VertexId(0), VertexId(4)).unwrap();
        assert_eq!(path.len(), 3);
        assert!(predecessors.predecessor(VertexId(5)).is_none());
    }

    #[test]
    fn test_bfs_forest_covers_all_vertices() {
        let graph = sample();
        let mut bfs = BreadthFirstSearch::new(&graph);
        let starts = VertexRecorder::for_kind(EventKind::StartVertex);
        let stamps = VertexTimeStamper::new();
        let _s = bfs.attach(&starts);
        let _t = bfs.attach(&stamps);

        bfs.compute().unwrap();

        assert_eq!(*starts.vertices(), vec![VertexId(0), VertexId(5)]);
        assert_eq!(stamps.finish_times().len(), 6);
    }

    #[test]
    fn test_bfs_stops_at_goal() {
        let graph = sample();
        let mut bfs = BreadthFirstSearch::new(&graph);
        let finished = VertexRecorder::for_kind(EventKind::FinishVertex);
        let reached = VertexRecorder::for_kind(EventKind::TargetReached);
        let _f = bfs.attach(&finished);
        let _r = bfs.attach(&reached);

        bfs.compute_between(VertexId(0), VertexId(2)).unwrap();

        assert_eq!(bfs.outcome(), Some(VisitOutcome::Stopped));
        assert_eq!(*finished.vertices(), vec![VertexId(0), VertexId(1), VertexId(2)]);
        assert_eq!(*reached.vertices(), vec![VertexId(2)]);
    }

    #[test]
    fn test_non_tree_edges_reported() {
        let graph = sample();
        let mut bfs = BreadthFirstSearch::new(&graph);
        let non_tree = EdgeRecorder::for_kind(EventKind::NonTreeEdge);
        let _n = bfs.attach(&non_tree);

        bfs.compute_from(VertexId(0)).unwrap();

        let expected = graph.find_edge(VertexId(2), VertexId(3)).unwrap();
        assert_eq!(*non_tree.edges(), vec![expected]);
    }

    #[test]
    fn test_unknown_root_is_rejected() {
        let graph = sample();
        let mut bfs = BreadthFirstSearch::new(&graph);
        let result = bfs.compute_from(VertexId(42));
        assert!(matches!(result, Err(AlgorithmError::InvalidVertex(_))));
        assert_eq!(bfs.state(), ComputationState::Finished);
    }
}
