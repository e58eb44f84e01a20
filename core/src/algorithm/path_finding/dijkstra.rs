//! Dijkstra's single-source shortest paths
//!
//! # Algorithmic Complexity
//! - Time: O((V + E) log V) with the indexed binary heap
//! - Space: O(V)
//!
//! Requires non-negative edge weights; the first negative weight examined
//! fails the run with [`AlgorithmError::NegativeEdgeWeight`]. With no root
//! the search restarts from every unreached vertex, producing a forest.
//! Equal-distance ties keep the edge examined first.

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
use crate::algorithm::traits::{Algorithm, AlgorithmError};
use crate::algorithm::traversal::VisitOutcome;
use crate::data_structures::graph::{IncidenceGraph, VertexListGraph};

pub struct DijkstraShortestPath<'g, G, W>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
{
    core: AlgorithmCore,
    graph: &'g G,
    weights: W,
    relaxer: Rc<dyn DistanceRelaxer>,
    roots: SearchRoots<G::Vertex>,
    events: SearchEvents<G::Vertex, G::Edge>,
    distances: DistanceTable,
    outcome: Option<VisitOutcome>,
}

impl<'g, G, W> DijkstraShortestPath<'g, G, W>
where
    G: IncidenceGraph + VertexListGraph,
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
            outcome: None,
        }
    }

    pub fn graph(&self) -> &'g G {
        self.graph
    }

    pub fn weight(&self, edge: G::Edge) -> f64 {
        (self.weights)(edge)
    }

    pub fn outcome(&self) -> Option<VisitOutcome> {
        self.outcome
    }
}

impl<'g, G, W> Algorithm for DijkstraShortestPath<'g, G, W>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
{
    fn name(&self) -> &'static str {
        "Dijkstra"
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
            heuristic: None,
            reopen_closed: false,
            events: &self.events,
            goal: self.roots.goal(),
        };

        let outcome = search.run(self.roots.root(), &cancel)?;
        debug!("Dijkstra ended with {outcome:?}");
        self.outcome = Some(outcome);
        Ok(())
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        match name {
            "relaxer" => {
                self.relaxer = relaxer_parameter(value)?;
                Ok(())
            }
            _ => Err(AlgorithmError::UnknownParameter(name.to_owned())),
        }
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "relaxer" => Some(self.relaxer.name().to_owned()),
            _ => None,
        }
    }
}

impl<'g, G, W> RootedAlgorithm for DijkstraShortestPath<'g, G, W>
where
    G: IncidenceGraph + VertexListGraph,
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

impl<'g, G, W> SearchAlgorithm for DijkstraShortestPath<'g, G, W>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
{
}

impl<'g, G, W> ShortestPathAlgorithm for DijkstraShortestPath<'g, G, W>
where
    G: IncidenceGraph + VertexListGraph,
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

impl<'g, G, W> Observable for DijkstraShortestPath<'g, G, W>
where
    G: IncidenceGraph + VertexListGraph,
    W: Fn(G::Edge) -> f64,
{
    type Vertex = G::Vertex;
    type Edge = G::Edge;

    fn search_events(&self) -> &SearchEvents<G::Vertex, G::Edge> {
        &self.events
    }
}
