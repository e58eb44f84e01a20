//! A* shortest paths
//!
//! Dijkstra's search with the frontier keyed by `combine(d[v], h(v))`. With
//! an admissible, consistent heuristic the goal is finished with its exact
//! distance while expanding fewer vertices. An inconsistent heuristic can
//! finish a vertex too early; when `reopen_closed` is set (the default) such
//! a vertex is re-opened once a shorter distance is found.

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::algorithm::events::{SearchEvent, SearchEvents};
use crate::algorithm::observers::Observable;
use crate::algorithm::path_finding::best_first::BestFirstSearch;
use crate::algorithm::path_finding::relaxer::{DistanceRelaxer, ShortestDistanceRelaxer};
use crate::algorithm::path_finding::{relaxer_parameter, DistanceTable, ShortestPathAlgorithm};
use crate::algorithm::rooted::{RootedAlgorithm, SearchAlgorithm, SearchRoots};
use crate::algorithm::state::AlgorithmCore;
use crate::algorithm::traits::{parse_parameter, Algorithm, AlgorithmError};
use crate::algorithm::traversal::VisitOutcome;
use crate::data_structures::graph::{IncidenceGraph, VertexListGraph};

pub struct AStarShortestPath<'g, G, W, H>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
    H: Fn(G::Vertex) -> f64,
{
    core: AlgorithmCore,
    graph: &'g G,
    weights: W,
    heuristic: H,
    relaxer: Rc<dyn DistanceRelaxer>,
    roots: SearchRoots<G::Vertex>,
    events: SearchEvents<G::Vertex, G::Edge>,
    distances: DistanceTable,
    reopen_closed: bool,
    outcome: Option<VisitOutcome>,
}

impl<'g, G, W, H> AStarShortestPath<'g, G, W, H>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
    H: Fn(G::Vertex) -> f64,
{
    pub fn new(graph: &'g G, weights: W, heuristic: H) -> Self {
        Self {
            core: AlgorithmCore::new(),
            graph,
            weights,
            heuristic,
            relaxer: Rc::new(ShortestDistanceRelaxer),
            roots: SearchRoots::new(),
            events: SearchEvents::new(),
            distances: DistanceTable::new(),
            reopen_closed: true,
            outcome: None,
        }
    }

    pub fn reopen_closed(&self) -> bool {
        self.reopen_closed
    }

    pub fn set_reopen_closed(&mut self, reopen: bool) {
        self.reopen_closed = reopen;
    }

    /// Estimated total cost through `vertex`
    pub fn cost(&self, vertex: G::Vertex) -> Option<f64> {
        let distance = self.distance(vertex)?;
        Some(self.relaxer.combine(distance, (self.heuristic)(vertex)))
    }

    pub fn outcome(&self) -> Option<VisitOutcome> {
        self.outcome
    }
}

impl<'g, G, W, H> Algorithm for AStarShortestPath<'g, G, W, H>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
    H: Fn(G::Vertex) -> f64,
{
    fn name(&self) -> &'static str {
        "A*"
    }

    fn category(&self) -> &'static str {
        "shortest-path"
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
        self.distances
            .reset(self.graph.vertex_bound(), self.relaxer.initial_distance());
        for vertex in self.graph.vertices() {
            self.events.raise(&SearchEvent::InitializeVertex(vertex));
        }
        Ok(())
    }

    fn internal_compute(&mut self) -> Result<(), AlgorithmError> {
        let cancel = self.core.cancel_manager();
        let search = BestFirstSearch {
            graph: self.graph,
            weights: &self.weights,
            relaxer: &*self.relaxer,
            distances: self.distances.as_mut_slice(),
            heuristic: Some(&self.heuristic as &dyn Fn(G::Vertex) -> f64),
            reopen_closed: self.reopen_closed,
            events: &self.events,
            goal: self.roots.goal(),
        };

        let outcome = search.run(self.roots.root(), &cancel)?;
        debug!("A* ended with {outcome:?}");
        self.outcome = Some(outcome);
        Ok(())
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        match name {
            "relaxer" => self.relaxer = relaxer_parameter(value)?,
            "reopen_closed" => self.reopen_closed = parse_parameter(name, value)?,
            _ => return Err(AlgorithmError::UnknownParameter(name.to_owned())),
        }
        Ok(())
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "relaxer" => Some(self.relaxer.name().to_owned()),
            "reopen_closed" => Some(self.reopen_closed.to_string()),
            _ => None,
        }
    }
}

impl<'g, G, W, H> RootedAlgorithm for AStarShortestPath<'g, G, W, H>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
    H: Fn(G::Vertex) -> f64,
{
    type Root = G::Vertex;

    fn roots(&self) -> &SearchRoots<G::Vertex> {
        &self.roots
    }

    fn roots_mut(&mut self) -> &mut SearchRoots<G::Vertex> {
        &mut self.roots
    }
}

impl<'g, G, W, H> SearchAlgorithm for AStarShortestPath<'g, G, W, H>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
    H: Fn(G::Vertex) -> f64,
{
}

impl<'g, G, W, H> ShortestPathAlgorithm for AStarShortestPath<'g, G, W, H>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
    H: Fn(G::Vertex) -> f64,
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

impl<'g, G, W, H> Observable for AStarShortestPath<'g, G, W, H>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
    H: Fn(G::Vertex) -> f64,
{
    type Vertex = G::Vertex;
    type Edge = G::Edge;

    fn search_events(&self) -> &SearchEvents<G::Vertex, G::Edge> {
        &self.events
    }
}
