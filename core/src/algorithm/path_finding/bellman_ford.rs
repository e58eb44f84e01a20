//! Bellman-Ford shortest paths
//!
//! # Algorithmic Complexity
//! - Time: O(V * E)
//! - Space: O(V)
//!
//! Accepts negative edge weights. Every edge is relaxed in passes until a
//! pass changes nothing (with `early_exit`) or `|V|` passes have run. A final
//! verification pass checks each edge once more: an edge that can still be
//! relaxed lies on, or is reachable from, a negative cycle. That outcome is
//! reported through [`BellmanFordShortestPath::has_negative_cycle`] and is
//! not an error.
//!
//! Without a root every vertex starts at the source distance, as if a
//! virtual source were connected to all of them.

use std::collections::HashMap;
use std::rc::Rc;

use log::{debug, trace, warn};

use crate::algorithm::events::{EdgeArgs, SearchEvent, SearchEvents};
use crate::algorithm::observers::Observable;
use crate::algorithm::path_finding::relaxer::{can_relax, relax, DistanceRelaxer, ShortestDistanceRelaxer};
use crate::algorithm::path_finding::{relaxer_parameter, DistanceTable, ShortestPathAlgorithm};
use crate::algorithm::rooted::{RootedAlgorithm, SearchRoots};
use crate::algorithm::state::AlgorithmCore;
use crate::algorithm::traits::{parse_parameter, Algorithm, AlgorithmError};
use crate::data_structures::graph::{EdgeListGraph, VertexListGraph};

pub struct BellmanFordShortestPath<'g, G, W>
where
    G: VertexListGraph + EdgeListGraph,
    W: Fn(G::Edge) -> f64,
{
    core: AlgorithmCore,
    graph: &'g G,
    weights: W,
    relaxer: Rc<dyn DistanceRelaxer>,
    roots: SearchRoots<G::Vertex>,
    events: SearchEvents<G::Vertex, G::Edge>,
    distances: DistanceTable,
    early_exit: bool,
    passes: usize,
    has_negative_cycle: bool,
}

impl<'g, G, W> BellmanFordShortestPath<'g, G, W>
where
    G: VertexListGraph + EdgeListGraph,
    W: Fn(G::Edge) -> f64,
{
    pub fn new(graph: &'g G, weights: W) -> Self {
        Self::with_relaxer(graph, weights, Rc::new(ShortestDistanceRelaxer))
    }

    pub fn with_relaxer(graph: &'g G, weights: W, relaxer: Rc<dyn DistanceRelaxer>) -> Self {
        Self {
            core: AlgorithmCore::new(),
            graph,
            weights,
            relaxer,
            roots: SearchRoots::new(),
            events: SearchEvents::new(),
            distances: DistanceTable::new(),
            early_exit: true,
            passes: 0,
            has_negative_cycle: false,
        }
    }

    /// Whether the last run found an edge that was still improvable after
    /// convergence
    pub fn has_negative_cycle(&self) -> bool {
        self.has_negative_cycle
    }

    pub fn early_exit(&self) -> bool {
        self.early_exit
    }

    pub fn set_early_exit(&mut self, early_exit: bool) {
        self.early_exit = early_exit;
    }

    /// Relaxation passes performed by the last run, excluding verification
    pub fn passes(&self) -> usize {
        self.passes
    }

    fn edge_args(&self, edge: G::Edge) -> EdgeArgs<G::Vertex, G::Edge> {
        EdgeArgs {
            edge,
            source: self.graph.source(edge),
            target: self.graph.target(edge),
        }
    }

    /// One sweep over every edge, returns whether any edge relaxed
    fn relaxation_pass(&mut self) -> bool {
        let mut changed = false;
        for edge in self.graph.edges() {
            let args = self.edge_args(edge);
            self.events.raise(&SearchEvent::ExamineEdge(args));

            let relaxed = relax(
                &*self.relaxer,
                self.distances.as_mut_slice(),
                self.graph.vertex_index(args.source),
                self.graph.vertex_index(args.target),
                (self.weights)(edge),
            );
            if relaxed {
                changed = true;
                self.events.raise(&SearchEvent::TreeEdge(args));
            } else {
                self.events.raise(&SearchEvent::EdgeNotRelaxed(args));
            }
        }
        changed
    }

    fn verification_pass(&mut self) -> bool {
        let mut negative_cycle = false;
        for edge in self.graph.edges() {
            let args = self.edge_args(edge);
            let improvable = can_relax(
                &*self.relaxer,
                self.distances.as_slice(),
                self.graph.vertex_index(args.source),
                self.graph.vertex_index(args.target),
                (self.weights)(edge),
            );
            if improvable {
                negative_cycle = true;
                self.events.raise(&SearchEvent::EdgeNotMinimized(args));
            } else {
                self.events.raise(&SearchEvent::EdgeMinimized(args));
            }
        }
        negative_cycle
    }
}

impl<'g, G, W> Algorithm for BellmanFordShortestPath<'g, G, W>
where
    G: VertexListGraph + EdgeListGraph,
    W: Fn(G::Edge) -> f64,
{
    fn name(&self) -> &'static str {
        "Bellman-Ford"
    }

    fn category(&self) -> &'static str {
        "shortest-path"
    }

    fn core(&self) -> &AlgorithmCore {
        &self.core
    }

    fn initialize(&mut self) -> Result<(), AlgorithmError> {
        let root = self.roots.root();
        if let Some(root) = root {
            if !self.graph.contains_vertex(root) {
                return Err(AlgorithmError::InvalidVertex(format!("{root:?}")));
            }
        }

        self.passes = 0;
        self.has_negative_cycle = false;
        self.distances
            .reset(self.graph.vertex_bound(), self.relaxer.initial_distance());

        for vertex in self.graph.vertices() {
            self.events.raise(&SearchEvent::InitializeVertex(vertex));
        }

        let source = self.relaxer.source_distance();
        let seeds: Vec<G::Vertex> = match root {
            Some(root) => vec![root],
            None => self.graph.vertices().collect(),
        };
        for vertex in seeds {
            self.distances.set(self.graph.vertex_index(vertex), source);
            self.events.raise(&SearchEvent::StartVertex(vertex));
        }
        Ok(())
    }

    fn internal_compute(&mut self) -> Result<(), AlgorithmError> {
        let rounds = self.graph.vertex_count();
        for _ in 0..rounds {
            if self.core.is_cancelling() {
                debug!("Bellman-Ford cancelled after {} passes", self.passes);
                return Ok(());
            }

            let changed = self.relaxation_pass();
            self.passes += 1;
            if !changed && self.early_exit {
                trace!("Bellman-Ford converged after {} passes", self.passes);
                break;
            }
        }

        if self.core.is_cancelling() {
            return Ok(());
        }
        self.has_negative_cycle = self.verification_pass();
        if self.has_negative_cycle {
            warn!("Bellman-Ford detected a negative cycle");
        }
        Ok(())
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        match name {
            "relaxer" => self.relaxer = relaxer_parameter(value)?,
            "early_exit" => self.early_exit = parse_parameter(name, value)?,
            _ => return Err(AlgorithmError::UnknownParameter(name.to_owned())),
        }
        Ok(())
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "relaxer" => Some(self.relaxer.name().to_owned()),
            "early_exit" => Some(self.early_exit.to_string()),
            _ => None,
        }
    }
}

impl<'g, G, W> RootedAlgorithm for BellmanFordShortestPath<'g, G, W>
where
    G: VertexListGraph + EdgeListGraph,
    W: Fn(G::Edge) -> f64,
{
    type Root = G::Vertex;

    fn roots(&self) -> &SearchRoots<G::Vertex> {
        &self.roots
    }

    fn roots_mut(&mut self) -> &mut SearchRoots<G::Vertex> {
        &mut self.roots
    }
}

impl<'g, G, W> ShortestPathAlgorithm for BellmanFordShortestPath<'g, G, W>
where
    G: VertexListGraph + EdgeListGraph,
    W: Fn(G::Edge) -> f64,
{
    fn relaxer(&self) -> Rc<dyn DistanceRelaxer> {
        Rc::clone(&self.relaxer)
    }

    fn set_relaxer(&mut self, relaxer: Rc<dyn DistanceRelaxer>) {
        self.relaxer = relaxer;
    }

    fn distance(&self, vertex: G::Vertex) -> Option<f64> {
        self.distances.distance_of(self.graph, vertex)
    }

    fn distances(&self) -> HashMap<G::Vertex, f64> {
        self.distances.collect(self.graph)
    }
}

impl<'g, G, W> Observable for BellmanFordShortestPath<'g, G, W>
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
    use crate::algorithm::events::EventKind;
    use crate::algorithm::observers::{
        EdgeRecorder, VertexDistanceRecorder, VertexPredecessorRecorder, VertexRecorder,
    };
    use crate::data_structures::graph::{AdjacencyGraph, EdgeId, VertexId};

    #[test]
    fn test_self_loop_with_negative_weight_is_a_cycle() {
        let graph = AdjacencyGraph::from_edges(2, &[(0, 0)]).unwrap();
        let mut bellman_ford = BellmanFordShortestPath::new(&graph, |_| -1.0);

        bellman_ford.compute_from(VertexId(0)).unwrap();

        assert!(bellman_ford.has_negative_cycle());
        assert_eq!(bellman_ford.distance(VertexId(1)), None);
    }

    #[test]
    fn test_negative_edges_without_cycle() {
        let graph = AdjacencyGraph::from_edges(4, &[(0, 1), (0, 2), (1, 2), (2, 3)]).unwrap();
        let weights = [4.0, 5.0, -3.0, 2.0];
        let mut bellman_ford = BellmanFordShortestPath::new(&graph, |e: EdgeId| weights[e.0]);
        let predecessors = VertexPredecessorRecorder::new();
        let _p = bellman_ford.attach(&predecessors);

        bellman_ford.compute_from(VertexId(0)).unwrap();

        assert!(!bellman_ford.has_negative_cycle());
        assert_eq!(bellman_ford.distance(VertexId(2)), Some(1.0));
        assert_eq!(bellman_ford.distance(VertexId(3)), Some(3.0));
        assert_eq!(predecessors.predecessor(VertexId(2)), Some(EdgeId(2)));
    }

    #[test]
    fn test_verification_reports_every_edge() {
        let graph = AdjacencyGraph::from_edges(3, &[(0, 1), (1, 2), (2, 1)]).unwrap();
        let weights = [1.0, 1.0, -3.0];
        let mut bellman_ford = BellmanFordShortestPath::new(&graph, |e: EdgeId| weights[e.0]);
        let minimized = EdgeRecorder::for_kind(EventKind::EdgeMinimized);
        let not_minimized = EdgeRecorder::for_kind(EventKind::EdgeNotMinimized);
        let _m = bellman_ford.attach(&minimized);
        let _n = bellman_ford.attach(&not_minimized);

        bellman_ford.compute_from(VertexId(0)).unwrap();

        assert!(bellman_ford.has_negative_cycle());
        assert_eq!(minimized.len() + not_minimized.len(), 3);
        assert!(!not_minimized.is_empty());
    }

    #[test]
    fn test_early_exit_stops_after_stable_pass() {
        let graph = AdjacencyGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        let mut bellman_ford = BellmanFordShortestPath::new(&graph, |_| 1.0);

        bellman_ford.compute_from(VertexId(0)).unwrap();
        assert_eq!(bellman_ford.passes(), 2);

        bellman_ford.set_parameter("early_exit", "false").unwrap();
        bellman_ford.compute().unwrap();
        assert_eq!(bellman_ford.passes(), 4);
        assert_eq!(bellman_ford.distance(VertexId(3)), Some(3.0));
    }

    #[test]
    fn test_without_root_every_vertex_is_a_source() {
        let graph = AdjacencyGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let weights = [-2.0, -1.0];
        let mut bellman_ford = BellmanFordShortestPath::new(&graph, |e: EdgeId| weights[e.0]);

        bellman_ford.compute().unwrap();

        let distances = bellman_ford.distances();
        assert_eq!(distances[&VertexId(0)], 0.0);
        assert_eq!(distances[&VertexId(1)], -2.0);
        assert_eq!(distances[&VertexId(2)], -3.0);
    }

    #[test]
    fn test_critical_relaxer_finds_longest_path() {
        let graph = AdjacencyGraph::from_edges(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap();
        let weights = [1.0, 5.0, 1.0, 1.0];
        let mut bellman_ford = BellmanFordShortestPath::new(&graph, |e: EdgeId| weights[e.0]);
        bellman_ford.set_parameter("relaxer", "critical").unwrap();

        bellman_ford.compute_from(VertexId(0)).unwrap();

        assert_eq!(bellman_ford.distance(VertexId(3)), Some(6.0));
        assert!(!bellman_ford.has_negative_cycle());
    }

    #[test]
    fn test_distance_recorder_matches_rooted_run() {
        let graph = AdjacencyGraph::from_edges(4, &[(0, 1), (1, 2), (0, 2), (2, 3)]).unwrap();
        let weights = [2.0, 3.0, 6.0, -1.0];
        let mut bellman_ford = BellmanFordShortestPath::new(&graph, |e: EdgeId| weights[e.0]);
        let recorder = VertexDistanceRecorder::new(Rc::new(ShortestDistanceRelaxer), move |e: EdgeId| {
            weights[e.0]
        });
        let _r = bellman_ford.attach(&recorder);

        bellman_ford.compute_from(VertexId(0)).unwrap();

        assert_eq!(recorder.distance(VertexId(2)), Some(5.0));
        assert_eq!(*recorder.distances(), bellman_ford.distances());
    }

    #[test]
    fn test_distance_recorder_matches_rootless_run() {
        let graph = AdjacencyGraph::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let weights = [-2.0, -1.0];
        let mut bellman_ford = BellmanFordShortestPath::new(&graph, |e: EdgeId| weights[e.0]);
        let recorder = VertexDistanceRecorder::new(Rc::new(ShortestDistanceRelaxer), move |e: EdgeId| {
            weights[e.0]
        });
        let starts = VertexRecorder::for_kind(EventKind::StartVertex);
        let _r = bellman_ford.attach(&recorder);
        let _s = bellman_ford.attach(&starts);

        bellman_ford.compute().unwrap();

        assert_eq!(starts.vertices().len(), 3);
        assert_eq!(recorder.distance(VertexId(2)), Some(-3.0));
        assert_eq!(*recorder.distances(), bellman_ford.distances());
    }

    #[test]
    fn test_unreachable_negative_cycle_is_not_reported() {
        let graph = AdjacencyGraph::from_edges(4, &[(0, 1), (2, 3), (3, 2)]).unwrap();
        let weights = [1.0, -2.0, 1.0];
        let mut bellman_ford = BellmanFordShortestPath::new(&graph, |e: EdgeId| weights[e.0]);

        bellman_ford.compute_from(VertexId(0)).unwrap();

        assert!(!bellman_ford.has_negative_cycle());
        assert_eq!(bellman_ford.distance(VertexId(1)), Some(1.0));
        assert_eq!(bellman_ford.distance(VertexId(2)), None);

        bellman_ford.compute_from(VertexId(2)).unwrap();
        assert!(bellman_ford.has_negative_cycle());
    }
}
